//! Per-layout constants for the result sheets this crate understands.
//!
//! Every difference between the known layouts lives here as data; the
//! pipeline reads a [`FormatProfile`] and never branches on a layout name.

/// Row positions, relative to the first row of a stride, that hold each
/// student fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowOffsets {
    pub enrollment: usize,
    pub name: usize,
    pub paper_ids: usize,
    pub marks: usize,
    pub totals: usize,
    /// Row holding the serial number.
    pub details: usize,
    pub semester: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemesterSource {
    /// The page header's semester label.
    HeaderMetadata,
    /// A table cell in the named column at the semester row offset.
    RowCell(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemesterEncoding {
    Literal,
    /// Leading ordinal word (`FIRST`..`EIGHTH`) becomes a two-digit code.
    WordToNumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaperCreditEncoding {
    /// Each token is `ID(credit)`.
    SeparatorJoined,
    /// Even tokens are ids, odd tokens carry `(credit)`.
    PositionalInterleaved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalCleaning {
    /// Every token is a total; unparsable ones keep their slot as unscored.
    KeepAll,
    /// Only even tokens are totals; absence markers are removed entirely.
    DropAbsentAndOddPositions,
}

/// Header labels whose positions bound the metadata fields on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLabels {
    pub semester: &'static str,
    /// Label that ends the examination field on the same line, if any.
    pub examination_end: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatProfile {
    pub name: &'static str,
    pub row_stride: usize,
    pub anchor_column: &'static str,
    pub terminal_column: &'static str,
    pub serial_column: &'static str,
    pub offsets: RowOffsets,
    pub header: HeaderLabels,
    pub semester_source: SemesterSource,
    pub semester_encoding: SemesterEncoding,
    pub paper_credit: PaperCreditEncoding,
    pub total_cleaning: TotalCleaning,
    pub absence_marker: &'static str,
}

pub static FORMAT1: FormatProfile = FormatProfile {
    name: "format1",
    row_stride: 5,
    anchor_column: "Roll no./Name",
    terminal_column: "CS/Remarks",
    serial_column: "S.No.",
    offsets: RowOffsets {
        enrollment: 0,
        name: 1,
        paper_ids: 0,
        marks: 2,
        totals: 4,
        details: 4,
        semester: 4,
    },
    header: HeaderLabels {
        semester: "Sem./Year",
        examination_end: None,
    },
    semester_source: SemesterSource::HeaderMetadata,
    semester_encoding: SemesterEncoding::Literal,
    paper_credit: PaperCreditEncoding::SeparatorJoined,
    total_cleaning: TotalCleaning::KeepAll,
    absence_marker: "ABS",
};

pub static FORMAT2: FormatProfile = FormatProfile {
    name: "format2",
    row_stride: 6,
    anchor_column: "Unnamed: 0",
    terminal_column: "CS/Remarks",
    serial_column: "S.No.",
    offsets: RowOffsets {
        enrollment: 0,
        name: 2,
        paper_ids: 1,
        marks: 4,
        totals: 5,
        details: 4,
        semester: 2,
    },
    header: HeaderLabels {
        semester: "Sem./Year/EU",
        examination_end: Some("Result Declared Date"),
    },
    semester_source: SemesterSource::HeaderMetadata,
    semester_encoding: SemesterEncoding::WordToNumber,
    paper_credit: PaperCreditEncoding::PositionalInterleaved,
    total_cleaning: TotalCleaning::DropAbsentAndOddPositions,
    absence_marker: "ABS",
};

impl FormatProfile {
    /// Largest row offset used by a block; a stride must cover it.
    #[must_use]
    pub fn max_offset(&self) -> usize {
        let offsets = &self.offsets;
        [
            offsets.enrollment,
            offsets.name,
            offsets.paper_ids,
            offsets.marks,
            offsets.totals,
            offsets.details,
            offsets.semester,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}
