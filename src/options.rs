use std::collections::BTreeSet;
use std::str::FromStr;

use crate::error::NormalizeError;
use crate::profile::{FORMAT1, FORMAT2, FormatProfile};

pub const DEFAULT_REQUIRED_INSTITUTION: &str = "BHAGWAN PARSHURAM INSTITUTE OF TECHNOLOGY";

/// Which built-in result-sheet layout to apply. Chosen by the caller, never
/// inferred from the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatKind {
    #[default]
    Format1,
    Format2,
}

impl FormatKind {
    #[must_use]
    pub fn profile(self) -> &'static FormatProfile {
        match self {
            Self::Format1 => &FORMAT1,
            Self::Format2 => &FORMAT2,
        }
    }
}

impl FromStr for FormatKind {
    type Err = NormalizeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "format1" | "1" => Ok(Self::Format1),
            "format2" | "2" => Ok(Self::Format2),
            _ => Err(NormalizeError::UnknownFormat(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    pages: BTreeSet<u32>,
}

impl PageSelection {
    #[must_use]
    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains(&page)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl FromStr for PageSelection {
    type Err = NormalizeError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let invalid = |message: String| NormalizeError::InvalidPageSelection(message);

        let mut pages = BTreeSet::new();
        for token in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if let Some((start, end)) = token.split_once('-') {
                let start: u32 = start
                    .trim()
                    .parse()
                    .map_err(|_| invalid(format!("invalid page range start: '{start}'")))?;
                let end: u32 = end
                    .trim()
                    .parse()
                    .map_err(|_| invalid(format!("invalid page range end: '{end}'")))?;
                if start == 0 || end == 0 {
                    return Err(invalid("pages are 1-based".to_string()));
                }
                if end < start {
                    return Err(invalid(format!(
                        "invalid range '{token}': end is smaller than start"
                    )));
                }
                pages.extend(start..=end);
            } else {
                let page: u32 = token
                    .parse()
                    .map_err(|_| invalid(format!("invalid page number: '{token}'")))?;
                if page == 0 {
                    return Err(invalid("pages are 1-based".to_string()));
                }
                pages.insert(page);
            }
        }

        if pages.is_empty() {
            return Err(invalid("page selection cannot be empty".to_string()));
        }

        Ok(Self { pages })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub format: FormatKind,
    /// Pages qualify only when their Institution field equals this exactly.
    pub required_institution: String,
    pub pages: Option<PageSelection>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            format: FormatKind::default(),
            required_institution: DEFAULT_REQUIRED_INSTITUTION.to_string(),
            pages: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FormatKind, PageSelection};
    use crate::error::NormalizeError;
    use std::str::FromStr;

    #[test]
    fn parse_page_selection_range_and_single() {
        let selection = PageSelection::from_str("1-3,5").expect("selection should parse");
        assert!(selection.contains(1));
        assert!(selection.contains(2));
        assert!(selection.contains(3));
        assert!(selection.contains(5));
        assert!(!selection.contains(4));
    }

    #[test]
    fn reject_invalid_page_selection() {
        let err = PageSelection::from_str("3-1").expect_err("invalid range should fail");
        assert!(err.to_string().contains("invalid range"));
    }

    #[test]
    fn reject_zero_page() {
        let err = PageSelection::from_str("0").expect_err("page 0 should fail");
        assert!(matches!(err, NormalizeError::InvalidPageSelection(_)));
    }

    #[test]
    fn parses_format_names_case_insensitively() {
        assert_eq!(
            FormatKind::from_str("Format2").expect("format2"),
            FormatKind::Format2
        );
        assert_eq!(FormatKind::from_str("1").expect("format1"), FormatKind::Format1);
        assert!(FormatKind::from_str("format3").is_err());
    }

    #[test]
    fn format_kind_resolves_profile_strides() {
        assert_eq!(FormatKind::Format1.profile().row_stride, 5);
        assert_eq!(FormatKind::Format2.profile().row_stride, 6);
    }
}
