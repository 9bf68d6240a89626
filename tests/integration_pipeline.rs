mod common;

use std::fs::File;
use std::process::Command;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;
use transcript_normalizer::model::PageText;
use transcript_normalizer::{
    NormalizeOptions, PageTextSource, PdfDocument, TextPages, WarningCode, normalize_pdf,
    normalize_source, records_to_csv_string,
};

fn result_page(institution: &str, blocks: &[(&str, &str, &str)]) -> Vec<String> {
    let mut lines = common::result_header(institution);
    lines.push(common::table_header());
    for (serial, enrollment, name) in blocks {
        lines.extend(common::student_block(serial, enrollment, name));
    }
    lines
}

fn text_page(page_number: u32, lines: Vec<String>) -> PageText {
    PageText {
        page_number,
        text: lines.join("\n"),
    }
}

#[test]
fn pdf_pages_from_other_institutions_do_not_qualify() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("mixed.pdf");

    common::create_test_pdf(
        &input,
        &[
            result_page(common::INSTITUTION, &[("1", "1001", "ALPHA")]),
            result_page("SOME OTHER COLLEGE", &[("1", "2001", "OMEGA")]),
        ],
    )
    .expect("PDF fixture should be created");

    let normalized =
        normalize_pdf(&input, &NormalizeOptions::default()).expect("normalization should succeed");

    assert_eq!(
        normalized.report.qualifying_pages,
        vec![1],
        "report: {:?}",
        normalized.report
    );
    assert!(
        normalized
            .records
            .iter()
            .all(|record| record.enrollment_no.as_deref() != Some("2001"))
    );
}

#[test]
fn pdf_stream_is_reread_from_the_start_on_every_pass() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("two_pages.pdf");

    common::create_test_pdf(
        &input,
        &[
            result_page(common::INSTITUTION, &[]),
            result_page(common::INSTITUTION, &[]),
        ],
    )
    .expect("PDF fixture should be created");

    let mut file = File::open(&input).expect("fixture should open");
    let mut document = PdfDocument::new(&mut file);
    let first = document.page_texts().expect("first pass should read");
    let second = document.page_texts().expect("second pass should read");

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[test]
fn text_pages_normalize_into_the_nested_tree() {
    let mut source = TextPages::new(vec![
        text_page(
            1,
            result_page(common::INSTITUTION, &[("1", "1001", "ALPHA")]),
        ),
        text_page(
            2,
            result_page(common::INSTITUTION, &[("2", "1002", "BETA")]),
        ),
    ]);

    let normalized =
        normalize_source(&mut source, &NormalizeOptions::default()).expect("run should succeed");
    let tree: serde_json::Value = serde_json::from_str(
        &normalized
            .tree
            .to_json_pretty()
            .expect("tree should serialize"),
    )
    .expect("output should be valid JSON");

    let papers = json!([{
        "ID": "['CS101', 'CS102']",
        "Credits": "[4, 3]",
        "Int_Marks": "['20', '25']",
        "Ext_Marks": "['65', '70']",
        "Total": "[85, 95]"
    }]);
    assert_eq!(
        tree,
        json!({
            "2021": {
                "B.TECH": {
                    "03": {
                        "REGULAR": [
                            {"Enrollment": "1001", "Name": "ALPHA", "CGPA": 9.43, "Papers": papers},
                            {"Enrollment": "1002", "Name": "BETA", "CGPA": 9.43, "Papers": papers}
                        ]
                    }
                }
            }
        })
    );
    assert_eq!(normalized.report.table_count, 1);
    assert!(normalized.report.warnings.is_empty());

    let csv = records_to_csv_string(&normalized.records).expect("csv should render");
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.contains("2,2021,B.TECH,03,REGULAR,BETA,1002"), "csv: {csv}");
}

#[test]
fn run_without_qualifying_pages_reports_and_returns_empty_tree() {
    let mut source = TextPages::new(vec![text_page(
        1,
        result_page("SOME OTHER COLLEGE", &[("1", "1001", "ALPHA")]),
    )]);

    let normalized =
        normalize_source(&mut source, &NormalizeOptions::default()).expect("run should succeed");

    assert!(normalized.tree.is_empty());
    assert_eq!(normalized.tree.to_json().expect("tree should serialize"), "{}");
    assert_eq!(normalized.report.warnings[0].code, WarningCode::NoQualifyingPages);
}

#[test]
fn cli_exits_with_two_when_no_students_are_found() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("other.pdf");

    common::create_test_pdf(
        &input,
        &[result_page("SOME OTHER COLLEGE", &[("1", "1001", "ALPHA")])],
    )
    .expect("PDF fixture should be created");

    let output = Command::new(env!("CARGO_BIN_EXE_transcript2json"))
        .arg("normalize")
        .arg("--input")
        .arg(&input)
        .output()
        .expect("binary should run");

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "{}");
}

#[test]
fn cli_rejects_an_invalid_page_selection() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("any.pdf");

    common::create_test_pdf(&input, &[result_page(common::INSTITUTION, &[])])
        .expect("PDF fixture should be created");

    let output = Command::new(env!("CARGO_BIN_EXE_transcript2json"))
        .args(["normalize", "--pages", "0-2", "--input"])
        .arg(&input)
        .output()
        .expect("binary should run");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--pages"));
}
