//! Thin wrappers over the browser APIs the page needs: reading a `File`,
//! object URLs, and the anchor-click download.

use js_sys::{Array, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, File, HtmlAnchorElement, Url};

/// Delay between the download click and revoking its URL
const DOWNLOAD_URL_TTL_MS: i32 = 1_000;

/// Resolve on a later macrotask, so the page can repaint first
pub async fn next_tick() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    let mut scheduled = Ok(0);
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        scheduled = window.set_timeout_with_callback(&resolve);
    });
    scheduled?;
    JsFuture::from(promise).await?;
    Ok(())
}

/// Read the whole file into memory
pub async fn read_file(file: &File) -> Result<Vec<u8>, JsValue> {
    let buffer = JsFuture::from(file.array_buffer()).await?;
    Ok(Uint8Array::new(&buffer).to_vec())
}

fn make_blob(bytes: &[u8], media_type: &str) -> Result<Blob, JsValue> {
    let array = Uint8Array::new_with_length(bytes.len() as u32);
    array.copy_from(bytes);

    let parts = Array::new();
    parts.push(&array);

    let options = BlobPropertyBag::new();
    options.set_type(media_type);
    Blob::new_with_u8_array_sequence_and_options(&parts, &options)
}

/// Create an object URL for `bytes`. The caller owns it and must revoke it.
pub fn create_object_url(bytes: &[u8], media_type: &str) -> Result<String, JsValue> {
    let blob = make_blob(bytes, media_type)?;
    Url::create_object_url_with_blob(&blob)
}

pub fn revoke_object_url(url: &str) {
    if let Err(e) = Url::revoke_object_url(url) {
        web_sys::console::warn_2(&"Failed to revoke object URL".into(), &e);
    }
}

/// Offer `bytes` to the user as a download named `file_name`
pub fn trigger_download(bytes: &[u8], file_name: &str, media_type: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;
    let body = document.body().ok_or("No body")?;

    let url = create_object_url(bytes, media_type)?;

    let result = (|| -> Result<(), JsValue> {
        let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
        anchor.set_href(&url);
        anchor.set_download(file_name);
        anchor.style().set_property("display", "none")?;
        body.append_child(&anchor)?;
        anchor.click();
        anchor.remove();
        Ok(())
    })();

    if result.is_err() {
        revoke_object_url(&url);
        return result;
    }

    let url_for_timer = url.clone();
    let revoke = Closure::once_into_js(move || revoke_object_url(&url_for_timer));
    if window
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            revoke.unchecked_ref(),
            DOWNLOAD_URL_TTL_MS,
        )
        .is_err()
    {
        revoke_object_url(&url);
    }
    Ok(())
}
