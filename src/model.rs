use std::fmt::{self, Display, Formatter};

pub type Cell = Option<String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page_number: u32,
    pub text: String,
}

/// Header facts read from one page. Absent fields did not match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub programme_name: Option<String>,
    pub semester_label: Option<String>,
    pub batch: Option<String>,
    pub examination: Option<String>,
    pub institution: Option<String>,
}

/// The metadata fields that decide whether adjacent fragments are one table.
/// Institution is not part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeKey {
    pub programme_name: Option<String>,
    pub semester_label: Option<String>,
    pub batch: Option<String>,
    pub examination: Option<String>,
}

impl PageMetadata {
    #[must_use]
    pub fn merge_key(&self) -> MergeKey {
        MergeKey {
            programme_name: self.programme_name.clone(),
            semester_label: self.semester_label.clone(),
            batch: self.batch.clone(),
            examination: self.examination.clone(),
        }
    }
}

/// A grid of optional text cells addressed by column name.
///
/// Blank column names become `Unnamed: <index>`, so a headerless first column
/// can still be addressed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        let columns = columns
            .into_iter()
            .enumerate()
            .map(|(index, name)| {
                let name = name.trim();
                if name.is_empty() {
                    format!("Unnamed: {index}")
                } else {
                    name.to_string()
                }
            })
            .collect();
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Appends a row, padding or truncating it to the table width.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Non-blank cell text, or `None` for null and whitespace-only cells.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .and_then(Option::as_deref)
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    #[must_use]
    pub fn named_cell(&self, row: usize, column: &str) -> Option<&str> {
        self.column_index(column)
            .and_then(|index| self.cell(row, index))
    }

    /// Concatenates `other` below this table, aligning columns by name.
    /// Columns only `other` has are added on the right; missing cells are null.
    pub fn append(&mut self, other: Self) {
        let mapping = other
            .columns
            .iter()
            .map(|name| match self.column_index(name) {
                Some(index) => index,
                None => {
                    self.columns.push(name.clone());
                    self.columns.len() - 1
                }
            })
            .collect::<Vec<_>>();

        let width = self.columns.len();
        for row in &mut self.rows {
            row.resize(width, None);
        }

        for row in other.rows {
            let mut aligned = vec![None; width];
            for (cell, &target) in row.into_iter().zip(&mapping) {
                aligned[target] = cell;
            }
            self.rows.push(aligned);
        }
    }
}

/// One table as the extraction collaborator produced it for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTableFragment {
    pub page: u32,
    pub table: RawTable,
}

/// A fragment tagged with the metadata of the page it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedFragment {
    pub page: u32,
    pub metadata: PageMetadata,
    pub table: RawTable,
}

/// Consecutive fragments that shared one merge key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedTable {
    pub metadata: PageMetadata,
    pub pages: Vec<u32>,
    pub table: RawTable,
}

/// A total-marks cell. Unscored cells keep their text (for example `ABS`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TotalMark {
    Scored(u32),
    Unscored(String),
}

impl TotalMark {
    #[must_use]
    pub fn score(&self) -> Option<u32> {
        match self {
            Self::Scored(value) => Some(*value),
            Self::Unscored(_) => None,
        }
    }
}

impl Display for TotalMark {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scored(value) => write!(f, "{value}"),
            Self::Unscored(text) => write!(f, "'{text}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    pub serial_no: Option<String>,
    pub batch: Option<String>,
    pub programme_name: Option<String>,
    pub semester: Option<String>,
    /// First whitespace-delimited token of the page's examination field.
    pub examination: Option<String>,
    pub name: String,
    pub enrollment_no: Option<String>,
    pub paper_ids: Vec<String>,
    pub credits: Vec<u32>,
    pub internal_marks: Vec<String>,
    pub external_marks: Vec<String>,
    pub totals: Vec<TotalMark>,
    pub cgpa: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::{PageMetadata, RawTable, TotalMark};

    fn cells(values: &[&str]) -> Vec<Option<String>> {
        values
            .iter()
            .map(|value| Some((*value).to_string()))
            .collect()
    }

    #[test]
    fn names_blank_columns_by_position() {
        let table = RawTable::new(vec![String::new(), "S.No.".to_string(), " ".to_string()]);
        assert_eq!(table.columns(), ["Unnamed: 0", "S.No.", "Unnamed: 2"]);
    }

    #[test]
    fn append_aligns_columns_by_name() {
        let mut first = RawTable::with_rows(
            vec!["a".to_string(), "b".to_string()],
            vec![cells(&["1", "2"])],
        );
        let second = RawTable::with_rows(
            vec!["b".to_string(), "c".to_string()],
            vec![cells(&["3", "4"])],
        );

        first.append(second);

        assert_eq!(first.columns(), ["a", "b", "c"]);
        assert_eq!(first.row_count(), 2);
        assert_eq!(first.named_cell(0, "c"), None);
        assert_eq!(first.named_cell(1, "a"), None);
        assert_eq!(first.named_cell(1, "b"), Some("3"));
        assert_eq!(first.named_cell(1, "c"), Some("4"));
    }

    #[test]
    fn blank_cells_read_as_null() {
        let table = RawTable::with_rows(vec!["a".to_string()], vec![cells(&["   "])]);
        assert_eq!(table.cell(0, 0), None);
        assert_eq!(table.cell(5, 0), None);
    }

    #[test]
    fn merge_key_ignores_institution() {
        let left = PageMetadata {
            batch: Some("2021".to_string()),
            institution: Some("A".to_string()),
            ..PageMetadata::default()
        };
        let right = PageMetadata {
            institution: Some("B".to_string()),
            ..left.clone()
        };
        assert_eq!(left.merge_key(), right.merge_key());
    }

    #[test]
    fn total_mark_renders_unscored_quoted() {
        assert_eq!(TotalMark::Scored(85).to_string(), "85");
        assert_eq!(TotalMark::Unscored("ABS".to_string()).to_string(), "'ABS'");
    }
}
