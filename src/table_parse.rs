//! Rebuilds a result grid from a page's text layout.
//!
//! The header line is the first one carrying the serial-number column. Its
//! cells fix the column names and their character start positions; every
//! later line is cut into cells and each cell is assigned to the column it
//! starts under.

use tracing::debug;

use crate::model::{Cell, PageText, RawTable, RawTableFragment};

pub(crate) const HEADER_MARKER: &str = "S.No.";

/// A cell may start this many characters left of a column start and still
/// belong to that column.
const ALIGNMENT_SLACK: usize = 2;

/// Cells separated by a tab or by two or more spaces, with the character
/// offset each cell starts at.
pub(crate) fn split_line_into_cells(line: &str) -> Vec<(usize, String)> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut current_start = 0_usize;
    let mut whitespace_run = 0_usize;

    let mut flush = |current: &mut String, start: usize| {
        let text = current.trim();
        if !text.is_empty() {
            cells.push((start, text.to_string()));
        }
        current.clear();
    };

    for (offset, ch) in line.chars().enumerate() {
        if ch == '\t' {
            flush(&mut current, current_start);
            whitespace_run = 0;
            continue;
        }

        if ch.is_whitespace() {
            whitespace_run += 1;
            if whitespace_run >= 2 {
                flush(&mut current, current_start);
            } else if !current.is_empty() {
                current.push(' ');
            }
            continue;
        }

        if current.is_empty() {
            current_start = offset;
        }
        whitespace_run = 0;
        current.push(ch);
    }
    flush(&mut current, current_start);

    cells
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnLayout {
    names: Vec<String>,
    starts: Vec<usize>,
}

impl ColumnLayout {
    fn from_header(cells: Vec<(usize, String)>) -> Self {
        let mut names = Vec::with_capacity(cells.len() + 1);
        let mut starts = Vec::with_capacity(cells.len() + 1);

        if cells.first().is_some_and(|(start, _)| *start > 0) {
            names.push(String::new());
            starts.push(0);
        }
        for (start, name) in cells {
            names.push(name);
            starts.push(start);
        }

        Self { names, starts }
    }

    fn column_for(&self, offset: usize) -> usize {
        self.starts
            .iter()
            .rposition(|start| *start <= offset + ALIGNMENT_SLACK)
            .unwrap_or(0)
    }

    /// A lone cell running across two or more column starts is text below the
    /// grid (a footer or signature line), not a row.
    fn spans_grid(&self, cells: &[(usize, String)]) -> bool {
        let [(start, text)] = cells else {
            return false;
        };
        let end = start + text.chars().count();
        self.starts
            .iter()
            .filter(|column_start| *start < **column_start && **column_start < end)
            .count()
            >= 2
    }

    fn row(&self, cells: Vec<(usize, String)>) -> Vec<Cell> {
        let mut row: Vec<Cell> = vec![None; self.names.len()];
        for (offset, text) in cells {
            let slot = &mut row[self.column_for(offset)];
            match slot {
                Some(existing) => {
                    existing.push(' ');
                    existing.push_str(&text);
                }
                None => *slot = Some(text),
            }
        }
        row
    }
}

fn is_header_line(line: &str) -> bool {
    split_line_into_cells(line)
        .iter()
        .any(|(_, cell)| cell == HEADER_MARKER)
}

/// The grid on one page, if the page has a header line and rows below it.
///
/// The grid ends at the first line that spans several columns as one cell;
/// nothing after it is read.
#[must_use]
pub fn table_from_page_text(page: &PageText) -> Option<RawTableFragment> {
    let mut lines = page.text.lines();
    let header = lines.by_ref().find(|line| is_header_line(line))?;
    let layout = ColumnLayout::from_header(split_line_into_cells(header));

    let mut table = RawTable::new(layout.names.clone());
    for line in lines.filter(|line| !line.trim().is_empty()) {
        let cells = split_line_into_cells(line);
        if layout.spans_grid(&cells) {
            debug!(page = page.page_number, line, "table ends above a grid-wide line");
            break;
        }
        table.push_row(layout.row(cells));
    }

    (!table.is_empty()).then_some(RawTableFragment {
        page: page.page_number,
        table,
    })
}

#[cfg(test)]
mod tests {
    use super::{split_line_into_cells, table_from_page_text};
    use crate::model::PageText;

    #[test]
    fn splits_double_space_separated_cells_with_offsets() {
        let cells = split_line_into_cells("Alice  30  98");
        assert_eq!(
            cells,
            vec![
                (0, "Alice".to_string()),
                (7, "30".to_string()),
                (11, "98".to_string())
            ]
        );
    }

    #[test]
    fn keeps_single_spaces_inside_a_cell() {
        let cells = split_line_into_cells("  A B\tC");
        assert_eq!(cells, vec![(2, "A B".to_string()), (6, "C".to_string())]);
    }

    #[test]
    fn builds_table_aligned_under_header() {
        let text = "\
Institution: X
S.No.  Roll no./Name  Paper1      Paper2      CS/Remarks
       123            CS101(4)    CS102(3)
       A B
1                     85          90          PASS";
        let fragment = table_from_page_text(&PageText {
            page_number: 4,
            text: text.to_string(),
        })
        .expect("table should be detected");

        let table = &fragment.table;
        assert_eq!(fragment.page, 4);
        assert_eq!(
            table.columns(),
            ["S.No.", "Roll no./Name", "Paper1", "Paper2", "CS/Remarks"]
        );
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.named_cell(0, "Roll no./Name"), Some("123"));
        assert_eq!(table.named_cell(0, "Paper2"), Some("CS102(3)"));
        assert_eq!(table.named_cell(1, "Roll no./Name"), Some("A B"));
        assert_eq!(table.named_cell(1, "Paper1"), None);
        assert_eq!(table.named_cell(2, "S.No."), Some("1"));
        assert_eq!(table.named_cell(2, "CS/Remarks"), Some("PASS"));
    }

    #[test]
    fn indented_header_gets_an_unnamed_first_column() {
        let text = "\
          S.No.  P1     CS/Remarks
4521      1      ES101";
        let fragment = table_from_page_text(&PageText {
            page_number: 1,
            text: text.to_string(),
        })
        .expect("table should be detected");

        assert_eq!(fragment.table.columns()[0], "Unnamed: 0");
        assert_eq!(fragment.table.named_cell(0, "Unnamed: 0"), Some("4521"));
        assert_eq!(fragment.table.named_cell(0, "P1"), Some("ES101"));
    }

    #[test]
    fn footer_below_the_grid_ends_the_table() {
        let text = "\
S.No.  Roll no./Name  Paper1      Paper2      CS/Remarks
       123            CS101(4)    CS102(3)
       A LONG STUDENT NAME
Controller of Examinations
       456            CS103(4)";
        let fragment = table_from_page_text(&PageText {
            page_number: 2,
            text: text.to_string(),
        })
        .expect("table should be detected");

        assert_eq!(fragment.table.row_count(), 2);
        assert_eq!(
            fragment.table.named_cell(1, "Roll no./Name"),
            Some("A LONG STUDENT NAME")
        );
    }

    #[test]
    fn page_without_header_has_no_table() {
        let page = PageText {
            page_number: 1,
            text: "Plain narrative text.".to_string(),
        };
        assert!(table_from_page_text(&page).is_none());
    }
}
