//! The `PageCutApp` class exported to JavaScript
//!
//! Every method returns a fresh [`SessionSnapshot`] (or a `Promise` of one)
//! so the page can re-render from a single value. User-level failures are
//! recorded in the snapshot's `error` field rather than thrown.

use crate::browser::{
    create_object_url, next_tick, read_file, revoke_object_url, trigger_download,
};
use pagecut_core::config::PDF_MEDIA_TYPE;
use pagecut_core::{
    extract_pages, load_document, Config, FileCandidate, LopdfEngine, PageCutError,
    PreviewTarget, QuickSelect, SessionSnapshot, SessionState,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::{DragEvent, File};

const READ_FAILED: &str = "Could not read the selected file.";
const DOWNLOAD_FAILED: &str = "Could not start the download.";

/// Convert a number typed into a page input; blanks and NaN count as page 1
pub fn js_number_to_page(value: f64) -> i64 {
    if value.is_finite() {
        value.trunc().clamp(i64::MIN as f64, i64::MAX as f64) as i64
    } else if value == f64::INFINITY {
        i64::MAX
    } else {
        1
    }
}

fn to_js(snapshot: &SessionSnapshot) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(snapshot)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn log_failure(context: &str, err: &PageCutError) {
    web_sys::console::warn_1(&format!("{}: {}", context, err).into());
}

/// Revoke every URL the session has let go of
fn release_urls(session: &mut SessionState) {
    for url in session.take_released_urls() {
        revoke_object_url(&url);
    }
}

#[wasm_bindgen]
pub struct PageCutApp {
    state: Rc<RefCell<SessionState>>,
    engine: LopdfEngine,
}

#[wasm_bindgen]
impl PageCutApp {
    /// Create the app. `config` is an optional plain object, e.g.
    /// `{ maxFileSizeBytes: 50_000_000, compressOutput: true }`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<PageCutApp, JsValue> {
        let config: Config = if config.is_undefined() || config.is_null() {
            Config::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
        };

        Ok(PageCutApp {
            engine: LopdfEngine::new(config.compress_output),
            state: Rc::new(RefCell::new(SessionState::new(config))),
        })
    }

    /// Current state for rendering
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_js(&self.state.borrow().snapshot())
    }

    /// Load a file chosen in the picker. Resolves to a snapshot.
    #[wasm_bindgen(js_name = loadFile)]
    pub fn load_file(&self, file: File) -> js_sys::Promise {
        let state = Rc::clone(&self.state);
        let engine = self.engine.clone();

        future_to_promise(async move {
            let name = file.name();
            let media_type = file.type_();
            let candidate = FileCandidate {
                name: &name,
                media_type: &media_type,
                size_bytes: file.size() as u64,
            };

            let begun = state.borrow_mut().begin_load(&candidate);
            if let Err(err) = begun {
                log_failure("Rejected file", &err);
                let snapshot = state.borrow().snapshot();
                return to_js(&snapshot);
            }

            let result = match read_file(&file).await {
                Ok(bytes) => load_document(&engine, &name, bytes),
                Err(e) => {
                    web_sys::console::warn_2(&READ_FAILED.into(), &e);
                    Err(PageCutError::processing(READ_FAILED))
                }
            };

            let mut session = state.borrow_mut();
            match session.finish_load(result) {
                Ok(()) => {
                    let url = session
                        .document()
                        .map(|doc| create_object_url(&doc.raw_bytes, PDF_MEDIA_TYPE));
                    match url {
                        Some(Ok(url)) => {
                            if let Err(err) = session.attach_preview_url(url) {
                                log_failure("Preview not attached", &err);
                            }
                        }
                        Some(Err(e)) => {
                            web_sys::console::warn_2(&"Preview unavailable".into(), &e);
                        }
                        None => {}
                    }
                }
                Err(err) => log_failure("Load failed", &err),
            }
            release_urls(&mut session);
            let snapshot = session.snapshot();
            to_js(&snapshot)
        })
    }

    /// Handle a `drop` on the drop zone; only the first file is used
    #[wasm_bindgen(js_name = handleDrop)]
    pub fn handle_drop(&self, event: DragEvent) -> js_sys::Promise {
        event.prevent_default();
        self.state.borrow_mut().drag_leave();

        let file = event
            .data_transfer()
            .and_then(|transfer| transfer.files())
            .and_then(|files| files.get(0));

        match file {
            Some(file) => self.load_file(file),
            None => self.resolved_snapshot(),
        }
    }

    #[wasm_bindgen(js_name = dragEnter)]
    pub fn drag_enter(&self) -> Result<JsValue, JsValue> {
        self.state.borrow_mut().drag_enter();
        self.snapshot()
    }

    #[wasm_bindgen(js_name = dragLeave)]
    pub fn drag_leave(&self) -> Result<JsValue, JsValue> {
        self.state.borrow_mut().drag_leave();
        self.snapshot()
    }

    #[wasm_bindgen(js_name = setStart)]
    pub fn set_start(&self, value: f64) -> Result<JsValue, JsValue> {
        self.edit(|session| session.set_start(js_number_to_page(value)))
    }

    #[wasm_bindgen(js_name = setEnd)]
    pub fn set_end(&self, value: f64) -> Result<JsValue, JsValue> {
        self.edit(|session| session.set_end(js_number_to_page(value)))
    }

    /// Set both bounds from text such as `"3-5"`
    #[wasm_bindgen(js_name = setRangeText)]
    pub fn set_range_text(&self, text: &str) -> Result<JsValue, JsValue> {
        self.edit(|session| session.set_range_text(text))
    }

    /// `name` is one of `all`, `first`, `last`, `first_half`
    #[wasm_bindgen(js_name = quickSelect)]
    pub fn quick_select(&self, name: &str) -> Result<JsValue, JsValue> {
        let preset: QuickSelect = name
            .parse()
            .map_err(|e: PageCutError| JsValue::from_str(e.message()))?;
        self.edit(|session| session.quick_select(preset))
    }

    /// A click on page `page` of the start (`"start"`) or end (`"end"`) preview
    #[wasm_bindgen(js_name = selectPage)]
    pub fn select_page(&self, target: &str, page: f64) -> Result<JsValue, JsValue> {
        let target: PreviewTarget = target
            .parse()
            .map_err(|e: PageCutError| JsValue::from_str(e.message()))?;
        self.edit(|session| session.select_page(target, js_number_to_page(page)))
    }

    /// Extract the current range and download it. Resolves to a snapshot.
    ///
    /// The session is already `extracting` when this returns, so a
    /// `snapshot()` taken right away shows the busy state.
    pub fn extract(&self) -> js_sys::Promise {
        let begun = self.state.borrow_mut().begin_extract();
        let job = match begun {
            Ok(job) => job,
            Err(err) => {
                log_failure("Extraction unavailable", &err);
                return self.resolved_snapshot();
            }
        };

        let state = Rc::clone(&self.state);
        let engine = self.engine.clone();

        future_to_promise(async move {
            if let Err(e) = next_tick().await {
                web_sys::console::warn_2(&"Could not yield before extracting".into(), &e);
            }

            let started = js_sys::Date::now();
            let result = extract_pages(&engine, &job.document, &job.range).and_then(|pdf| {
                trigger_download(&pdf.bytes, &pdf.file_name, PDF_MEDIA_TYPE)
                    .map(|()| pdf)
                    .map_err(|e| {
                        web_sys::console::warn_2(&DOWNLOAD_FAILED.into(), &e);
                        PageCutError::processing(DOWNLOAD_FAILED)
                    })
            });

            let mut session = state.borrow_mut();
            match session.finish_extract(result) {
                Ok(pdf) => web_sys::console::log_1(
                    &format!(
                        "Extracted {} page(s) to {} ({} in {:.0} ms)",
                        pdf.metrics.page_count,
                        pdf.file_name,
                        pagecut_core::format_bytes(pdf.metrics.output_size_bytes),
                        js_sys::Date::now() - started
                    )
                    .into(),
                ),
                Err(err) => log_failure("Extraction failed", &err),
            }
            let snapshot = session.snapshot();
            to_js(&snapshot)
        })
    }

    /// Remove the loaded document
    pub fn reset(&self) -> Result<JsValue, JsValue> {
        let mut session = self.state.borrow_mut();
        if let Err(err) = session.reset() {
            log_failure("Reset refused", &err);
        }
        release_urls(&mut session);
        to_js(&session.snapshot())
    }

    /// Object URL of the loaded file, for the preview renderer
    #[wasm_bindgen(js_name = previewUrl)]
    pub fn preview_url(&self) -> Option<String> {
        self.state.borrow().preview_url().map(str::to_string)
    }

    /// Version, metadata and per-page geometry of the loaded file
    #[wasm_bindgen(js_name = pageDetails)]
    pub fn page_details(&self) -> Result<JsValue, JsValue> {
        let session = self.state.borrow();
        let doc = session
            .document()
            .ok_or_else(|| JsValue::from_str("No document loaded"))?;

        serde_wasm_bindgen::to_value(doc.details.as_ref())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    fn resolved_snapshot(&self) -> js_sys::Promise {
        match self.snapshot() {
            Ok(snapshot) => js_sys::Promise::resolve(&snapshot),
            Err(e) => js_sys::Promise::reject(&e),
        }
    }

    fn edit(
        &self,
        action: impl FnOnce(&mut SessionState) -> Result<(), PageCutError>,
    ) -> Result<JsValue, JsValue> {
        let mut session = self.state.borrow_mut();
        if let Err(err) = action(&mut session) {
            log_failure("Selection unchanged", &err);
        }
        to_js(&session.snapshot())
    }
}
