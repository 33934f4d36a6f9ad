//! Document loading
//!
//! Loading is split in two so the host can reject a file before reading it:
//! [`check_candidate`] looks only at the declared type and size, and
//! [`load_document`] opens the bytes once they have been read.

use crate::config::{Config, PDF_MEDIA_TYPE};
use crate::engine::DocumentEngine;
use crate::error::PageCutError;
use crate::format_bytes;
use crate::page_info::DocumentDetails;
use std::sync::Arc;
use tracing::{info, warn};

const OPEN_FAILED: &str =
    "Could not read this PDF. The file may be corrupted or password-protected.";

/// A file offered by the picker or a drop, before its bytes are read
#[derive(Debug, Clone, Copy)]
pub struct FileCandidate<'a> {
    pub name: &'a str,
    pub media_type: &'a str,
    pub size_bytes: u64,
}

/// The currently open source file
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    pub name: String,
    pub page_count: u32,
    pub size_bytes: usize,
    pub raw_bytes: Arc<[u8]>,
    pub details: Arc<DocumentDetails>,
}

/// True for `application/pdf`, ignoring case and any parameters
pub fn is_pdf_media_type(media_type: &str) -> bool {
    media_type
        .split(';')
        .next()
        .map(|essence| essence.trim().eq_ignore_ascii_case(PDF_MEDIA_TYPE))
        .unwrap_or(false)
}

/// Accept or reject a file from its declared type and size alone
pub fn check_candidate(candidate: &FileCandidate<'_>, config: &Config) -> Result<(), PageCutError> {
    if !is_pdf_media_type(candidate.media_type) {
        return Err(PageCutError::invalid("Please select a PDF file."));
    }
    if candidate.size_bytes == 0 {
        return Err(PageCutError::invalid("The selected file is empty."));
    }
    if candidate.size_bytes > config.max_file_size_bytes {
        return Err(PageCutError::invalid(format!(
            "File is too large ({}). The limit is {}.",
            format_bytes(candidate.size_bytes as usize),
            format_bytes(config.max_file_size_bytes as usize)
        )));
    }
    Ok(())
}

/// Open `bytes` and build the [`LoadedDocument`] for `name`
pub fn load_document<E: DocumentEngine>(
    engine: &E,
    name: &str,
    bytes: Vec<u8>,
) -> Result<LoadedDocument, PageCutError> {
    let source = engine.open(&bytes).map_err(|e| {
        warn!(file = name, error = %e, "failed to open document");
        PageCutError::processing(OPEN_FAILED)
    })?;

    let page_count = engine.page_count(&source);
    if page_count == 0 {
        warn!(file = name, "document has no pages");
        return Err(PageCutError::processing("This PDF has no pages."));
    }

    let details = engine.details(&source);
    info!(file = name, page_count, size_bytes = bytes.len(), "document loaded");

    Ok(LoadedDocument {
        name: name.to_string(),
        page_count,
        size_bytes: bytes.len(),
        raw_bytes: Arc::from(bytes),
        details: Arc::new(details),
    })
}
