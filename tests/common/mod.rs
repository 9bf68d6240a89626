use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

pub const INSTITUTION: &str = "BHAGWAN PARSHURAM INSTITUTE OF TECHNOLOGY";

/// Header lines of a result page issued by `institution`.
pub fn result_header(institution: &str) -> Vec<String> {
    vec![
        "Programme Name: B.TECH Sem./Year: 03 Batch: 2021 Examination: REGULAR DEC 2022"
            .to_string(),
        format!("Institution: {institution}  CS/Remarks"),
    ]
}

/// One five-row student block laid out under
/// `S.No. | Roll no./Name | Paper1 | Paper2 | CS/Remarks`.
pub fn student_block(serial: &str, enrollment: &str, name: &str) -> Vec<String> {
    let line = |cells: [&str; 5]| {
        format!(
            "{:<7}{:<15}{:<12}{:<12}{}",
            cells[0], cells[1], cells[2], cells[3], cells[4]
        )
    };
    vec![
        line(["", enrollment, "CS101(4)", "CS102(3)", ""]),
        line(["", name, "", "", "-"]),
        line(["", "", "20 65", "25 70", ""]),
        line(["", "", "", "", "PASS"]),
        line([serial, "", "85(A+)", "95(O)", ""]),
    ]
}

pub fn table_header() -> String {
    format!(
        "{:<7}{:<15}{:<12}{:<12}{}",
        "S.No.", "Roll no./Name", "Paper1", "Paper2", "CS/Remarks"
    )
}

pub fn create_test_pdf(
    path: &Path,
    pages: &[Vec<String>],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut page_ids = Vec::new();

    for lines in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 9.into()]),
            Operation::new("TL", vec![12.into()]),
            Operation::new("Td", vec![20.into(), 800.into()]),
        ];

        for (index, line) in lines.iter().enumerate() {
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(line.as_str())],
            ));
            if index + 1 < lines.len() {
                operations.push(Operation::new("T*", vec![]));
            }
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| (*id).into()).collect::<Vec<_>>(),
            "Count" => i64::try_from(page_ids.len())?,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 842.into(), 595.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    doc.save(path)?;
    Ok(())
}
