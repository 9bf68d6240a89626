//! Boundaries to the text and table extraction engines.
//!
//! The pipeline asks for every page's text once, then for the tables of the
//! qualifying pages only. Any engine that can answer both questions can
//! drive it.

use crate::error::NormalizeError;
use crate::model::{PageText, RawTableFragment};
use crate::table_parse::table_from_page_text;

pub trait PageTextSource {
    /// Plain text of every page, in page order.
    fn page_texts(&mut self) -> Result<Vec<PageText>, NormalizeError>;
}

pub trait TableSource {
    /// Tables found on the requested 1-based pages, in page order.
    fn tables(&mut self, pages: &[u32]) -> Result<Vec<RawTableFragment>, NormalizeError>;
}

pub(crate) fn layout_tables(page_texts: &[PageText], pages: &[u32]) -> Vec<RawTableFragment> {
    page_texts
        .iter()
        .filter(|page| pages.contains(&page.page_number))
        .filter_map(table_from_page_text)
        .collect()
}

/// Page texts already in memory. Tables are rebuilt from their layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextPages {
    pages: Vec<PageText>,
}

impl TextPages {
    #[must_use]
    pub fn new(pages: Vec<PageText>) -> Self {
        Self { pages }
    }
}

impl PageTextSource for TextPages {
    fn page_texts(&mut self) -> Result<Vec<PageText>, NormalizeError> {
        Ok(self.pages.clone())
    }
}

impl TableSource for TextPages {
    fn tables(&mut self, pages: &[u32]) -> Result<Vec<RawTableFragment>, NormalizeError> {
        Ok(layout_tables(&self.pages, pages))
    }
}
