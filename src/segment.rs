use crate::model::RawTable;
use crate::profile::FormatProfile;

/// `row_stride` consecutive rows of a merged table holding one student.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBlock<'a> {
    table: &'a RawTable,
    start: usize,
    stride: usize,
}

impl<'a> RawBlock<'a> {
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    #[must_use]
    pub fn table(&self) -> &'a RawTable {
        self.table
    }

    /// Absolute row index of `offset`, or `None` outside the stride.
    #[must_use]
    pub fn row(&self, offset: usize) -> Option<usize> {
        (offset < self.stride).then_some(self.start + offset)
    }

    #[must_use]
    pub fn cell(&self, offset: usize, column: &str) -> Option<&'a str> {
        self.row(offset)
            .and_then(|row| self.table.named_cell(row, column))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer than a full stride of rows remain.
    Truncated,
    BlankName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Block(RawBlock<'a>),
    Skipped { start: usize, reason: SkipReason },
}

/// Walks a table one stride at a time. Skipped strides still advance the
/// cursor, so a blank separator group never shifts later blocks.
#[derive(Debug, Clone)]
pub struct Segmenter<'a> {
    table: &'a RawTable,
    profile: &'a FormatProfile,
    cursor: usize,
}

impl<'a> Segmenter<'a> {
    #[must_use]
    pub fn new(table: &'a RawTable, profile: &'a FormatProfile) -> Self {
        Self {
            table,
            profile,
            cursor: 0,
        }
    }

    /// Only the valid blocks, in table order.
    pub fn blocks(self) -> impl Iterator<Item = RawBlock<'a>> {
        self.filter_map(|segment| match segment {
            Segment::Block(block) => Some(block),
            Segment::Skipped { .. } => None,
        })
    }
}

impl<'a> Iterator for Segmenter<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let stride = self.profile.row_stride;
        let start = self.cursor;
        if stride == 0 || start >= self.table.row_count() {
            return None;
        }
        self.cursor += stride;

        if start + stride > self.table.row_count() {
            return Some(Segment::Skipped {
                start,
                reason: SkipReason::Truncated,
            });
        }

        let block = RawBlock {
            table: self.table,
            start,
            stride,
        };
        if block
            .cell(self.profile.offsets.name, self.profile.anchor_column)
            .is_none()
        {
            return Some(Segment::Skipped {
                start,
                reason: SkipReason::BlankName,
            });
        }

        Some(Segment::Block(block))
    }
}
