use std::io;
use std::string::FromUtf8Error;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to load PDF: {0}")]
    PdfLoad(#[from] lopdf::Error),

    #[error("invalid page selection: {0}")]
    InvalidPageSelection(String),

    #[error("output is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),

    #[error("unknown result format '{0}', expected format1 or format2")]
    UnknownFormat(String),

    #[error("PDF has no pages")]
    EmptyDocument,
}
