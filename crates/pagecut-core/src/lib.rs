//! Client-side PDF page extraction
//!
//! Pick a contiguous page range from one PDF and produce a new PDF holding
//! just those pages. The crate is UI-agnostic: the browser bindings in
//! `pagecut-wasm` drive a [`SessionState`] and run the [`loader`] and
//! [`extract`] steps against a [`DocumentEngine`].
//!
//! ```
//! use pagecut_core::{extract_pages, load_document, LopdfEngine, PageRange};
//! # fn run(bytes: Vec<u8>) -> Result<(), pagecut_core::PageCutError> {
//! let engine = LopdfEngine::default();
//! let doc = load_document(&engine, "report.pdf", bytes)?;
//! let range = PageRange::new(3, 5, doc.page_count)?;
//! let out = extract_pages(&engine, &doc, &range)?;
//! assert_eq!(out.file_name, "report_pages_3-5.pdf");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod loader;
pub mod lopdf_engine;
pub mod page_info;
pub mod range;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use engine::DocumentEngine;
pub use error::{EngineError, ErrorKind, PageCutError};
pub use extract::{extract_pages, output_file_name, ExtractMetrics, ExtractedPdf};
pub use loader::{check_candidate, is_pdf_media_type, load_document, FileCandidate, LoadedDocument};
pub use lopdf_engine::LopdfEngine;
pub use page_info::{DocumentDetails, PageInfo, PageOrientation};
pub use range::{PageRange, PreviewTarget, QuickSelect, RangeSelection};
pub use session::{ExtractJob, Phase, SessionSnapshot, SessionState};

/// Format bytes as human-readable string
pub fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}
