pub mod aggregate;
mod csv_out;
mod error;
pub mod fields;
pub mod grade;
pub mod merge;
pub mod metadata;
pub mod model;
mod options;
mod pdf_reader;
pub mod profile;
pub mod segment;
mod source;
mod table_parse;
mod warning;

use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::aggregate::AggregateTree;
use crate::fields::FieldParser;
use crate::merge::{merge_fragments, tag_fragments};
use crate::metadata::{MetadataExtractor, scan_pages};
use crate::model::{MergedTable, StudentRecord};
use crate::profile::FormatProfile;
use crate::segment::{Segment, SkipReason, Segmenter};

pub use csv_out::{RECORD_HEADERS, records_to_csv_string, write_records_csv};
pub use error::NormalizeError;
pub use options::{DEFAULT_REQUIRED_INSTITUTION, FormatKind, NormalizeOptions, PageSelection};
pub use pdf_reader::PdfDocument;
pub use source::{PageTextSource, TableSource, TextPages};
pub use table_parse::table_from_page_text;
pub use warning::{NormalizeWarning, WarningCode};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizationReport {
    pub qualifying_pages: Vec<u32>,
    /// Merged tables sealed after fragment merging.
    pub table_count: usize,
    pub student_count: usize,
    pub warnings: Vec<NormalizeWarning>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub tree: AggregateTree,
    pub records: Vec<StudentRecord>,
    pub report: NormalizationReport,
}

/// Segments, parses and grades every merged table, in order.
pub fn records_from_tables(
    tables: &[MergedTable],
    profile: &FormatProfile,
    warnings: &mut Vec<NormalizeWarning>,
) -> Vec<StudentRecord> {
    let mut records = Vec::new();

    for merged in tables {
        let parser = FieldParser::new(merged, profile, warnings);
        for segment in Segmenter::new(&merged.table, profile) {
            match segment {
                Segment::Block(block) => {
                    if let Some(mut record) = parser.parse(&block, warnings) {
                        grade::annotate(&mut record, warnings);
                        records.push(record);
                    }
                }
                Segment::Skipped { start, reason } => {
                    debug!(row = start, ?reason, "skipping student block");
                    let message = match reason {
                        SkipReason::Truncated => "trailing rows do not fill a whole block",
                        SkipReason::BlankName => "block has no student name",
                    };
                    let mut warning = NormalizeWarning::new(WarningCode::BlockSkipped, message)
                        .with_row(start);
                    if let Some(page) = merged.pages.first() {
                        warning = warning.with_page(*page);
                    }
                    warnings.push(warning);
                }
            }
        }
    }

    records
}

/// Runs the whole pipeline over any text and table source.
///
/// Only extraction failures are errors. A document without qualifying pages
/// yields an empty tree.
pub fn normalize_source_with_profile<S>(
    source: &mut S,
    profile: &FormatProfile,
    options: &NormalizeOptions,
) -> Result<Normalized, NormalizeError>
where
    S: PageTextSource + TableSource,
{
    let mut warnings = Vec::new();

    let page_texts = source.page_texts()?;
    let extractor = MetadataExtractor::new(profile);
    let qualifying = scan_pages(
        &page_texts,
        &extractor,
        &options.required_institution,
        options.pages.as_ref(),
    );

    if qualifying.is_empty() {
        warn!(
            institution = %options.required_institution,
            "no pages with the required institution found"
        );
        warnings.push(NormalizeWarning::new(
            WarningCode::NoQualifyingPages,
            format!(
                "no page names '{}' as its institution",
                options.required_institution
            ),
        ));
        return Ok(Normalized {
            report: NormalizationReport {
                warnings,
                ..NormalizationReport::default()
            },
            ..Normalized::default()
        });
    }

    let fragments = source.tables(&qualifying.pages)?;
    let tagged = tag_fragments(fragments, &qualifying, profile, &mut warnings);
    let merged = merge_fragments(tagged);
    let records = records_from_tables(&merged, profile, &mut warnings);
    let tree = records.iter().collect::<AggregateTree>();

    info!(
        format = profile.name,
        pages = qualifying.pages.len(),
        tables = merged.len(),
        students = records.len(),
        warnings = warnings.len(),
        "normalization completed"
    );

    Ok(Normalized {
        tree,
        report: NormalizationReport {
            qualifying_pages: qualifying.pages,
            table_count: merged.len(),
            student_count: records.len(),
            warnings,
        },
        records,
    })
}

pub fn normalize_source<S>(
    source: &mut S,
    options: &NormalizeOptions,
) -> Result<Normalized, NormalizeError>
where
    S: PageTextSource + TableSource,
{
    normalize_source_with_profile(source, options.format.profile(), options)
}

/// Normalizes a PDF from a caller-owned stream, rewinding it between passes.
pub fn normalize_pdf_reader<R: Read + Seek>(
    reader: &mut R,
    options: &NormalizeOptions,
) -> Result<Normalized, NormalizeError> {
    normalize_source(&mut PdfDocument::new(reader), options)
}

pub fn normalize_pdf_bytes(
    input_pdf: &[u8],
    options: &NormalizeOptions,
) -> Result<Normalized, NormalizeError> {
    normalize_pdf_reader(&mut Cursor::new(input_pdf), options)
}

pub fn normalize_pdf(
    input_pdf: &Path,
    options: &NormalizeOptions,
) -> Result<Normalized, NormalizeError> {
    let mut file = File::open(input_pdf)?;
    normalize_pdf_reader(&mut file, options)
}
