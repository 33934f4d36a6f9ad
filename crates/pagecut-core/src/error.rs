use serde::Serialize;
use thiserror::Error;

/// User-facing failure. Every error the page can show is one of these two kinds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageCutError {
    /// Wrong file type, oversized file, or an out-of-bounds/empty range
    #[error("{0}")]
    InvalidInput(String),

    /// The document library rejected the bytes or failed while copying/saving
    #[error("{0}")]
    ProcessingFailure(String),
}

/// Discriminant exposed to the rendering layer
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    ProcessingFailure,
}

impl PageCutError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::ProcessingFailure(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::ProcessingFailure(_) => ErrorKind::ProcessingFailure,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput(msg) | Self::ProcessingFailure(msg) => msg,
        }
    }
}

/// Failure inside a [`DocumentEngine`](crate::engine::DocumentEngine).
///
/// Never shown to the user directly; the loader and extractor log it and
/// report a generic [`PageCutError::ProcessingFailure`] instead.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("Page index {index} is out of range (document has {page_count} pages)")]
    PageOutOfRange { index: u32, page_count: u32 },

    #[error("PDF operation failed: {0}")]
    Operation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<lopdf::Error> for EngineError {
    fn from(err: lopdf::Error) -> Self {
        EngineError::Operation(err.to_string())
    }
}
