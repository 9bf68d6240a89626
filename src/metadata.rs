use std::collections::BTreeMap;

use regex::Regex;
use tracing::debug;

use crate::model::{PageMetadata, PageText};
use crate::options::PageSelection;
use crate::profile::FormatProfile;

const PROGRAMME_LABEL: &str = "Programme Name";
const BATCH_LABEL: &str = "Batch";
const EXAMINATION_LABEL: &str = "Examination";
const INSTITUTION_LABEL: &str = "Institution";
const INSTITUTION_END: &str = "CS/Remarks";

#[derive(Debug, Clone)]
struct FieldPattern {
    value: Regex,
    end: Option<Regex>,
}

impl FieldPattern {
    fn new(label: &str, end_label: Option<&str>) -> Self {
        let value = Regex::new(&format!(r"(?i){}:\s*([^\n]*)", regex::escape(label)))
            .expect("escaped header label pattern is valid");
        let end = end_label.map(|end_label| {
            Regex::new(&format!("(?i){}", regex::escape(end_label)))
                .expect("escaped header label pattern is valid")
        });
        Self { value, end }
    }

    /// First match of the label, cut at the next known label or line end.
    fn find(&self, text: &str) -> Option<String> {
        let captured = self.value.captures(text)?.get(1)?.as_str();
        let bounded = self
            .end
            .as_ref()
            .and_then(|end| end.find(captured))
            .map_or(captured, |found| &captured[..found.start()]);
        Some(bounded.trim().to_string())
    }
}

/// Reads the page header fields for one layout.
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    programme_name: FieldPattern,
    semester_label: FieldPattern,
    batch: FieldPattern,
    examination: FieldPattern,
    institution: FieldPattern,
}

impl MetadataExtractor {
    #[must_use]
    pub fn new(profile: &FormatProfile) -> Self {
        let semester = profile.header.semester;
        Self {
            programme_name: FieldPattern::new(PROGRAMME_LABEL, Some(semester)),
            semester_label: FieldPattern::new(semester, Some(BATCH_LABEL)),
            batch: FieldPattern::new(BATCH_LABEL, Some(EXAMINATION_LABEL)),
            examination: FieldPattern::new(EXAMINATION_LABEL, profile.header.examination_end),
            institution: FieldPattern::new(INSTITUTION_LABEL, Some(INSTITUTION_END)),
        }
    }

    #[must_use]
    pub fn extract(&self, text: &str) -> PageMetadata {
        PageMetadata {
            programme_name: self.programme_name.find(text),
            semester_label: self.semester_label.find(text),
            batch: self.batch.find(text),
            examination: self.examination.find(text),
            institution: self.institution.find(text),
        }
    }
}

/// Exact, case-sensitive comparison against the required institution.
#[must_use]
pub fn qualifies(metadata: &PageMetadata, required_institution: &str) -> bool {
    metadata.institution.as_deref() == Some(required_institution)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualifyingPages {
    /// 1-based page numbers in document order.
    pub pages: Vec<u32>,
    pub metadata: BTreeMap<u32, PageMetadata>,
}

impl QualifyingPages {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

pub(crate) fn scan_pages(
    pages: &[PageText],
    extractor: &MetadataExtractor,
    required_institution: &str,
    selection: Option<&PageSelection>,
) -> QualifyingPages {
    let mut qualifying = QualifyingPages::default();

    for page in pages {
        if selection.is_some_and(|selection| !selection.contains(page.page_number)) {
            continue;
        }

        let metadata = extractor.extract(&page.text);
        if !qualifies(&metadata, required_institution) {
            debug!(
                page = page.page_number,
                institution = ?metadata.institution,
                "page does not qualify"
            );
            continue;
        }

        qualifying.pages.push(page.page_number);
        qualifying.metadata.insert(page.page_number, metadata);
    }

    qualifying
}
