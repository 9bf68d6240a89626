#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningCode {
    NoQualifyingPages,
    MissingAnchorColumn,
    MissingTerminalColumn,
    BlockSkipped,
    ValueDropped,
    CreditTotalMismatch,
    ZeroCreditFallback,
}

/// A degradation the pipeline absorbed instead of failing.
///
/// Nothing recorded here aborts a run; each warning names the smallest unit
/// (fragment, block, value) that was left out of the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeWarning {
    pub code: WarningCode,
    pub message: String,
    pub page: Option<u32>,
    pub row: Option<usize>,
    pub field: Option<&'static str>,
    pub token: Option<String>,
}

impl NormalizeWarning {
    #[must_use]
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            page: None,
            row: None,
            field: None,
            token: None,
        }
    }

    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}
