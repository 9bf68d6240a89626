use std::ops::Range;

use tracing::{debug, warn};

use crate::model::{MergedTable, PageMetadata, StudentRecord, TotalMark};
use crate::profile::{
    FormatProfile, PaperCreditEncoding, SemesterEncoding, SemesterSource, TotalCleaning,
};
use crate::segment::RawBlock;
use crate::warning::{NormalizeWarning, WarningCode};

const ORDINAL_CODES: [(&str, &str); 8] = [
    ("FIRST", "01"),
    ("SECOND", "02"),
    ("THIRD", "03"),
    ("FOURTH", "04"),
    ("FIFTH", "05"),
    ("SIXTH", "06"),
    ("SEVENTH", "07"),
    ("EIGHTH", "08"),
];

/// A numeric cell value, or the token that failed to parse.
pub type ParsedValue = Result<u32, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Papers {
    pub ids: Vec<String>,
    pub credits: Vec<ParsedValue>,
}

/// Column indices strictly between `anchor` and `terminal`.
#[must_use]
pub fn columns_between(columns: &[String], anchor: &str, terminal: &str) -> Option<Range<usize>> {
    let start = columns.iter().position(|column| column == anchor)?;
    let end = columns.iter().position(|column| column == terminal)?;
    (start < end).then_some(start + 1..end)
}

fn strip_brackets(run: &str) -> &str {
    run.trim_matches(|ch| ch == '[' || ch == ']')
}

/// Comma-joins the tokens and re-splits them, the way bracketed list text is
/// flattened before per-token parsing.
fn bracket_parts(tokens: &[&str]) -> Vec<String> {
    if tokens.is_empty() {
        return Vec::new();
    }
    strip_brackets(&tokens.join(","))
        .split(',')
        .map(str::to_string)
        .collect()
}

fn parenthesized(token: &str) -> Option<&str> {
    let (_, after) = token.split_once('(')?;
    after.split(')').next().map(str::trim)
}

fn parse_credit(token: &str) -> ParsedValue {
    parenthesized(token)
        .and_then(|credit| credit.parse::<u32>().ok())
        .ok_or_else(|| token.to_string())
}

#[must_use]
pub fn split_papers(run: &str, encoding: PaperCreditEncoding) -> Papers {
    let tokens = run.split_whitespace().collect::<Vec<_>>();

    match encoding {
        PaperCreditEncoding::SeparatorJoined => {
            let parts = bracket_parts(&tokens);
            Papers {
                ids: parts
                    .iter()
                    .map(|part| part.split('(').next().unwrap_or_default().trim().to_string())
                    .collect(),
                credits: parts.iter().map(|part| parse_credit(part)).collect(),
            }
        }
        PaperCreditEncoding::PositionalInterleaved => {
            let credit_tokens = tokens.iter().skip(1).step_by(2).copied().collect::<Vec<_>>();
            Papers {
                ids: tokens.iter().step_by(2).map(|id| (*id).to_string()).collect(),
                credits: bracket_parts(&credit_tokens)
                    .iter()
                    .map(|part| parse_credit(part))
                    .collect(),
            }
        }
    }
}

/// Even tokens are internal marks, odd tokens external marks.
#[must_use]
pub fn split_marks(run: &str) -> (Vec<String>, Vec<String>) {
    let tokens = run.split_whitespace().collect::<Vec<_>>();
    let internal = tokens.iter().step_by(2).map(|mark| (*mark).to_string()).collect();
    let external = tokens
        .iter()
        .skip(1)
        .step_by(2)
        .map(|mark| (*mark).to_string())
        .collect();
    (internal, external)
}

#[must_use]
pub fn clean_totals(
    run: &str,
    cleaning: TotalCleaning,
    absence_marker: &str,
) -> Vec<Result<TotalMark, String>> {
    let tokens = run.split_whitespace().collect::<Vec<_>>();

    match cleaning {
        TotalCleaning::KeepAll => bracket_parts(&tokens)
            .iter()
            .map(|part| part.split('(').next().unwrap_or_default().trim())
            .filter(|part| !part.is_empty())
            .map(|part| {
                Ok(part
                    .parse::<u32>()
                    .map_or_else(|_| TotalMark::Unscored(part.to_string()), TotalMark::Scored))
            })
            .collect(),
        TotalCleaning::DropAbsentAndOddPositions => tokens
            .iter()
            .step_by(2)
            .filter(|token| **token != absence_marker)
            .map(|token| {
                token
                    .replace('*', "")
                    .parse::<u32>()
                    .map(TotalMark::Scored)
                    .map_err(|_| (*token).to_string())
            })
            .collect(),
    }
}

/// Replaces a leading ordinal word with its two-digit code. An unknown word
/// has no code and is dropped; the rest of the label is kept.
#[must_use]
pub fn word_to_number(label: &str) -> Option<String> {
    let mut parts = label.split(' ');
    let word = parts.next().unwrap_or_default();
    let code = ORDINAL_CODES
        .iter()
        .find(|(ordinal, _)| *ordinal == word)
        .map(|(_, code)| *code);

    let joined = code.into_iter().chain(parts).collect::<Vec<_>>().join(" ");
    (!joined.is_empty()).then_some(joined)
}

/// First whitespace-delimited token, dropping trailing qualifiers.
#[must_use]
pub fn examination_type(examination: &str) -> &str {
    examination.split_whitespace().next().unwrap_or_default()
}

/// Parses the blocks of one merged table under one profile.
#[derive(Debug, Clone)]
pub struct FieldParser<'a> {
    profile: &'a FormatProfile,
    metadata: &'a PageMetadata,
    span: Range<usize>,
}

impl<'a> FieldParser<'a> {
    pub fn new(
        merged: &'a MergedTable,
        profile: &'a FormatProfile,
        warnings: &mut Vec<NormalizeWarning>,
    ) -> Self {
        let span = columns_between(
            merged.table.columns(),
            profile.anchor_column,
            profile.terminal_column,
        )
        .unwrap_or_else(|| {
            warn!(
                pages = ?merged.pages,
                terminal = profile.terminal_column,
                "no data columns between anchor and terminal column"
            );
            let mut warning = NormalizeWarning::new(
                WarningCode::MissingTerminalColumn,
                format!(
                    "no columns between '{}' and '{}'",
                    profile.anchor_column, profile.terminal_column
                ),
            );
            if let Some(page) = merged.pages.first() {
                warning = warning.with_page(*page);
            }
            warnings.push(warning);
            0..0
        });

        Self {
            profile,
            metadata: &merged.metadata,
            span,
        }
    }

    fn run(&self, block: &RawBlock<'_>, offset: usize) -> String {
        let Some(row) = block.row(offset) else {
            return String::new();
        };
        self.span
            .clone()
            .map(|column| block.table().cell(row, column).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn semester(&self, block: &RawBlock<'_>) -> Option<String> {
        let label = match self.profile.semester_source {
            SemesterSource::HeaderMetadata => self.metadata.semester_label.clone(),
            SemesterSource::RowCell(column) => block
                .cell(self.profile.offsets.semester, column)
                .map(str::to_string),
        }?;

        match self.profile.semester_encoding {
            SemesterEncoding::Literal => Some(label),
            SemesterEncoding::WordToNumber => word_to_number(&label),
        }
    }

    /// Builds the record for one block. CGPA is left unset.
    pub fn parse(
        &self,
        block: &RawBlock<'_>,
        warnings: &mut Vec<NormalizeWarning>,
    ) -> Option<StudentRecord> {
        let offsets = &self.profile.offsets;
        let anchor = self.profile.anchor_column;
        let name = block.cell(offsets.name, anchor)?.to_string();

        let papers = split_papers(
            &self.run(block, offsets.paper_ids),
            self.profile.paper_credit,
        );
        let (internal_marks, external_marks) = split_marks(&self.run(block, offsets.marks));
        let totals = clean_totals(
            &self.run(block, offsets.totals),
            self.profile.total_cleaning,
            self.profile.absence_marker,
        );

        let mut record_drop = |field: &'static str, offset: usize, token: String| {
            let row = block.start() + offset;
            debug!(row, field, token = %token, "dropping unparsable value");
            warnings.push(
                NormalizeWarning::new(
                    WarningCode::ValueDropped,
                    format!("'{token}' is not an integer"),
                )
                .with_row(row)
                .with_field(field)
                .with_token(token),
            );
        };

        let mut credits = Vec::with_capacity(papers.credits.len());
        for credit in papers.credits {
            match credit {
                Ok(value) => credits.push(value),
                Err(token) => record_drop("credits", offsets.paper_ids, token),
            }
        }

        let mut cleaned_totals = Vec::with_capacity(totals.len());
        for total in totals {
            match total {
                Ok(value) => cleaned_totals.push(value),
                Err(token) => record_drop("totals", offsets.totals, token),
            }
        }

        Some(StudentRecord {
            serial_no: block
                .cell(offsets.details, self.profile.serial_column)
                .map(str::to_string),
            batch: self.metadata.batch.clone(),
            programme_name: self.metadata.programme_name.clone(),
            semester: self.semester(block),
            examination: self
                .metadata
                .examination
                .as_deref()
                .map(|examination| examination_type(examination).to_string()),
            name,
            enrollment_no: block.cell(offsets.enrollment, anchor).map(str::to_string),
            paper_ids: papers.ids,
            credits,
            internal_marks,
            external_marks,
            totals: cleaned_totals,
            cgpa: None,
        })
    }
}
