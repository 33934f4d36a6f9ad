//! Page extraction
//!
//! Copies a validated [`PageRange`] out of the loaded document into a new PDF:
//! open source, create destination, copy the zero-indexed range, append each
//! page in order, serialize. Nothing is returned unless every step succeeds.

use crate::engine::DocumentEngine;
use crate::error::PageCutError;
use crate::loader::LoadedDocument;
use crate::range::PageRange;
use serde::Serialize;
use tracing::{debug, info, warn};

const EXTRACT_FAILED: &str = "Failed to extract pages. Please try again.";

/// Basename used when the source name is nothing but an extension
const FALLBACK_BASENAME: &str = "document";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExtractMetrics {
    pub input_size_bytes: usize,
    pub output_size_bytes: usize,
    pub page_count: u32,
}

/// A finished output document, ready to download
#[derive(Debug, Clone)]
pub struct ExtractedPdf {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub metrics: ExtractMetrics,
}

/// `<basename>_pages_<start>-<end>.pdf`
pub fn output_file_name(source_name: &str, range: &PageRange) -> String {
    let trimmed = source_name.trim();
    let base = match trimmed.len().checked_sub(4) {
        Some(cut)
            if trimmed.is_char_boundary(cut) && trimmed[cut..].eq_ignore_ascii_case(".pdf") =>
        {
            &trimmed[..cut]
        }
        _ => trimmed,
    };
    let base = if base.is_empty() {
        FALLBACK_BASENAME
    } else {
        base
    };
    format!("{}_pages_{}-{}.pdf", base, range.start(), range.end())
}

/// Build a PDF holding only `range` of `document`
pub fn extract_pages<E: DocumentEngine>(
    engine: &E,
    document: &LoadedDocument,
    range: &PageRange,
) -> Result<ExtractedPdf, PageCutError> {
    if range.end() > document.page_count {
        return Err(PageCutError::invalid(format!(
            "Page {} is out of range (1-{})",
            range.end(),
            document.page_count
        )));
    }

    let fail = |stage: &str, error: &dyn std::fmt::Display| {
        warn!(file = %document.name, range = %range, stage, error = %error, "extraction failed");
        PageCutError::processing(EXTRACT_FAILED)
    };

    let source = engine
        .open(&document.raw_bytes)
        .map_err(|e| fail("open", &e))?;
    let mut output = engine.create();

    let pages = engine
        .copy_pages(&source, &range.zero_indexed())
        .map_err(|e| fail("copy", &e))?;
    debug!(copied = pages.len(), "pages copied");

    for page in pages {
        engine
            .append_page(&mut output, page)
            .map_err(|e| fail("append", &e))?;
    }

    let bytes = engine.serialize(output).map_err(|e| fail("serialize", &e))?;

    let metrics = ExtractMetrics {
        input_size_bytes: document.size_bytes,
        output_size_bytes: bytes.len(),
        page_count: range.len(),
    };
    info!(
        file = %document.name,
        range = %range,
        output_size_bytes = metrics.output_size_bytes,
        "pages extracted"
    );

    Ok(ExtractedPdf {
        file_name: output_file_name(&document.name, range),
        bytes,
        metrics,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::loader::load_document;
    use crate::lopdf_engine::LopdfEngine;
    use crate::testing::{create_test_pdf, page_labels};
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        /// Property: extracting [s, e] yields pages s..=e in original order
        #[test]
        fn extracted_pages_match_source(page_count in 1u32..12, a in 1u32..12, b in 1u32..12) {
            let start = a.min(b).min(page_count);
            let end = a.max(b).min(page_count);
            let engine = LopdfEngine::new(false);
            let doc = load_document(&engine, "p.pdf", create_test_pdf(page_count)).unwrap();
            let range = PageRange::new(start, end, page_count).unwrap();

            let out = extract_pages(&engine, &doc, &range).unwrap();

            prop_assert_eq!(page_labels(&out.bytes), (start..=end).collect::<Vec<_>>());
        }
    }
}
