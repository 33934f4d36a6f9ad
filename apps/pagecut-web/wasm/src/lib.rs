//! WASM bindings for PDF page extraction
//!
//! All state is held in Rust by [`PageCutApp`]; JavaScript only forwards DOM
//! events and renders the snapshot each call returns.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { PageCutApp } from './pkg/pagecut_wasm.js';
//!
//! await init();
//!
//! const app = new PageCutApp({ maxFileSizeBytes: 50 * 1024 * 1024 });
//! render(await app.loadFile(input.files[0]));
//! render(app.quickSelect("first_half"));
//! render(app.setEnd(5));
//! render(await app.extract()); // downloads <name>_pages_1-5.pdf
//! ```

pub mod app;
pub mod browser;

use wasm_bindgen::prelude::*;

pub use app::PageCutApp;

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&format!("PageCut WASM {} initialized", get_version()).into());
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Format bytes as human-readable string
#[wasm_bindgen]
pub fn format_bytes(bytes: usize) -> String {
    pagecut_core::format_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_version() {
        let version = get_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn test_format_bytes_matches_core() {
        assert_eq!(format_bytes(1536), "1.5 KB");
    }
}
