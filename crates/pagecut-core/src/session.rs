//! Interaction state for the page
//!
//! All UI state lives in one [`SessionState`] value that the event handlers
//! take by `&mut`. Slow work (reading the file, running the engine) happens
//! between a `begin_*` and its matching `finish_*` call; the phase in between
//! is what keeps a second load or extraction from starting.
//!
//! ```text
//! Empty --begin_load--> Loading --finish_load(ok)--> Ready
//!                          \--finish_load(err)--> Empty (+ error)
//! Ready --begin_extract--> Extracting --finish_extract--> Ready (+ error on failure)
//! ```

use crate::config::Config;
use crate::error::{ErrorKind, PageCutError};
use crate::extract::ExtractedPdf;
use crate::format_bytes;
use crate::loader::{check_candidate, FileCandidate, LoadedDocument};
use crate::range::{PageRange, PreviewTarget, QuickSelect, RangeSelection};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Empty,
    Loading,
    Ready,
    Extracting,
}

/// Work handed out by [`SessionState::begin_extract`]
#[derive(Debug, Clone)]
pub struct ExtractJob {
    pub document: LoadedDocument,
    pub range: PageRange,
}

#[derive(Debug, Default)]
pub struct SessionState {
    config: Config,
    phase: Phase,
    document: Option<LoadedDocument>,
    selection: Option<RangeSelection>,
    error: Option<PageCutError>,
    drag_over: bool,
    preview_url: Option<String>,
    released_urls: Vec<String>,
}

impl SessionState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn document(&self) -> Option<&LoadedDocument> {
        self.document.as_ref()
    }

    pub fn selection(&self) -> Option<RangeSelection> {
        self.selection
    }

    pub fn error(&self) -> Option<&PageCutError> {
        self.error.as_ref()
    }

    pub fn is_drag_over(&self) -> bool {
        self.drag_over
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Loading | Phase::Extracting)
    }

    fn page_count(&self) -> u32 {
        self.document.as_ref().map(|d| d.page_count).unwrap_or(0)
    }

    /// Validated current range, or why extraction is unavailable
    pub fn current_range(&self) -> Result<PageRange, PageCutError> {
        let selection = self
            .selection
            .ok_or_else(|| PageCutError::invalid("No document loaded"))?;
        selection.validate(self.page_count())
    }

    pub fn can_extract(&self) -> bool {
        self.phase == Phase::Ready && self.current_range().is_ok()
    }

    fn busy_error(&self) -> PageCutError {
        PageCutError::invalid("Please wait for the current operation to finish.")
    }

    fn fail(&mut self, error: PageCutError) -> PageCutError {
        debug!(kind = ?error.kind(), message = error.message(), "session error");
        self.error = Some(error.clone());
        error
    }

    /// Drop the current document and queue its preview URL for release
    fn discard_document(&mut self) {
        self.document = None;
        self.selection = None;
        if let Some(url) = self.preview_url.take() {
            self.released_urls.push(url);
        }
    }

    // --- drag and drop ---

    pub fn drag_enter(&mut self) {
        self.drag_over = true;
    }

    pub fn drag_leave(&mut self) {
        self.drag_over = false;
    }

    // --- loading ---

    /// Accept a candidate file and enter `Loading`.
    ///
    /// A rejected candidate leaves the current document and phase untouched.
    pub fn begin_load(&mut self, candidate: &FileCandidate<'_>) -> Result<(), PageCutError> {
        self.drag_over = false;
        if self.is_busy() {
            return Err(self.busy_error());
        }
        if let Err(err) = check_candidate(candidate, &self.config) {
            return Err(self.fail(err));
        }

        debug!(file = candidate.name, "load started");
        self.error = None;
        self.phase = Phase::Loading;
        Ok(())
    }

    /// Complete a load started with [`begin_load`](Self::begin_load).
    ///
    /// Success replaces the document and selects every page. Failure clears
    /// the previous document, since the user was replacing it.
    pub fn finish_load(
        &mut self,
        result: Result<LoadedDocument, PageCutError>,
    ) -> Result<(), PageCutError> {
        if self.phase != Phase::Loading {
            return Err(PageCutError::invalid("No load in progress"));
        }

        self.discard_document();
        match result {
            Ok(document) => {
                self.selection = Some(RangeSelection::full(document.page_count));
                self.document = Some(document);
                self.phase = Phase::Ready;
                Ok(())
            }
            Err(err) => {
                self.phase = Phase::Empty;
                Err(self.fail(err))
            }
        }
    }

    /// Remove the document and any error; back to `Empty`
    pub fn reset(&mut self) -> Result<(), PageCutError> {
        if self.is_busy() {
            return Err(self.busy_error());
        }
        self.discard_document();
        self.error = None;
        self.drag_over = false;
        self.phase = Phase::Empty;
        Ok(())
    }

    // --- preview resources ---

    /// Record the object URL created for the current document's preview.
    ///
    /// Any URL already attached is queued for release.
    pub fn attach_preview_url(&mut self, url: String) -> Result<(), PageCutError> {
        if self.document.is_none() {
            self.released_urls.push(url);
            return Err(PageCutError::invalid("No document loaded"));
        }
        if let Some(old) = self.preview_url.replace(url) {
            self.released_urls.push(old);
        }
        Ok(())
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.preview_url.as_deref()
    }

    /// URLs the host must revoke; drained on every call
    pub fn take_released_urls(&mut self) -> Vec<String> {
        std::mem::take(&mut self.released_urls)
    }

    // --- range editing ---

    /// Apply `edit` to a copy of the selection; on error the selection is
    /// kept and the error recorded
    fn edit_selection(
        &mut self,
        edit: impl FnOnce(&mut RangeSelection, u32) -> Result<(), PageCutError>,
    ) -> Result<(), PageCutError> {
        if self.phase != Phase::Ready {
            return Err(self.fail(PageCutError::invalid("No document ready")));
        }
        let page_count = self.page_count();
        let Some(mut selection) = self.selection else {
            return Err(self.fail(PageCutError::invalid("No document loaded")));
        };
        if let Err(err) = edit(&mut selection, page_count) {
            return Err(self.fail(err));
        }
        self.selection = Some(selection);
        self.error = None;
        Ok(())
    }

    pub fn set_start(&mut self, value: i64) -> Result<(), PageCutError> {
        self.edit_selection(|s, n| {
            s.set_start(value, n);
            Ok(())
        })
    }

    pub fn set_end(&mut self, value: i64) -> Result<(), PageCutError> {
        self.edit_selection(|s, n| {
            s.set_end(value, n);
            Ok(())
        })
    }

    /// Replace the selection with a typed range like `"3-5"`
    pub fn set_range_text(&mut self, text: &str) -> Result<(), PageCutError> {
        self.edit_selection(|s, n| {
            *s = RangeSelection::parse(text, n)?;
            Ok(())
        })
    }

    pub fn quick_select(&mut self, preset: QuickSelect) -> Result<(), PageCutError> {
        self.edit_selection(|s, n| s.apply(preset, n))
    }

    pub fn select_page(&mut self, target: PreviewTarget, page: i64) -> Result<(), PageCutError> {
        self.edit_selection(|s, n| {
            s.select_page(target, page, n);
            Ok(())
        })
    }

    // --- extraction ---

    /// Enter `Extracting` with a copy of what needs extracting
    pub fn begin_extract(&mut self) -> Result<ExtractJob, PageCutError> {
        if self.is_busy() {
            return Err(self.busy_error());
        }
        let ready = self.phase == Phase::Ready;
        let Some(document) = self.document.clone().filter(|_| ready) else {
            return Err(self.fail(PageCutError::invalid("No document loaded")));
        };
        let range = match self.current_range() {
            Ok(range) => range,
            Err(err) => return Err(self.fail(err)),
        };

        self.error = None;
        self.phase = Phase::Extracting;
        Ok(ExtractJob { document, range })
    }

    /// Return to `Ready`; the document survives a failed extraction
    pub fn finish_extract(
        &mut self,
        result: Result<ExtractedPdf, PageCutError>,
    ) -> Result<ExtractedPdf, PageCutError> {
        if self.phase != Phase::Extracting {
            return Err(PageCutError::invalid("No extraction in progress"));
        }
        self.phase = Phase::Ready;
        result.map_err(|err| self.fail(err))
    }

    // --- rendering ---

    pub fn snapshot(&self) -> SessionSnapshot {
        let page_count = self.page_count();
        SessionSnapshot {
            phase: self.phase,
            document: self.document.as_ref().map(|d| DocumentSummary {
                name: d.name.clone(),
                page_count: d.page_count,
                size_bytes: d.size_bytes,
                size_label: format_bytes(d.size_bytes),
            }),
            selection: self.selection,
            range_valid: self.current_range().is_ok(),
            range_error: match (&self.selection, self.current_range()) {
                (Some(_), Err(err)) => Some(err.message().to_string()),
                _ => None,
            },
            selected_count: self
                .selection
                .and_then(|s| s.selected_count(page_count)),
            quick_selects: QuickSelect::available(page_count),
            can_extract: self.can_extract(),
            error: self.error.as_ref().map(|e| e.message().to_string()),
            error_kind: self.error.as_ref().map(PageCutError::kind),
            drag_over: self.drag_over,
            busy: self.is_busy(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DocumentSummary {
    pub name: String,
    pub page_count: u32,
    pub size_bytes: usize,
    pub size_label: String,
}

/// Everything the rendering layer needs, in one serializable value
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub document: Option<DocumentSummary>,
    pub selection: Option<RangeSelection>,
    pub range_valid: bool,
    pub range_error: Option<String>,
    pub selected_count: Option<u32>,
    pub quick_selects: Vec<QuickSelect>,
    pub can_extract: bool,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub drag_over: bool,
    pub busy: bool,
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::loader::load_document;
    use crate::testing::FakeEngine;
    use proptest::prelude::*;

    proptest! {
        /// Property: a successful load always selects [1, page_count]
        #[test]
        fn load_selects_full_range(page_count in 1u32..10_000) {
            let mut session = SessionState::default();
            session
                .begin_load(&FileCandidate { name: "p.pdf", media_type: "application/pdf", size_bytes: 10 })
                .unwrap();
            session
                .finish_load(load_document(&FakeEngine::with_pages(page_count), "p.pdf", vec![0]))
                .unwrap();
            prop_assert_eq!(session.selection(), Some(RangeSelection { start: 1, end: page_count }));
            prop_assert!(session.can_extract());
        }
    }
}
