//! DOM and Web API helpers.
//!
//! Thin wrappers that swallow the `JsValue` errors the browser may throw and
//! report them through tracing instead.

use bucketfs_core::{OverwritePrompt, SelectedFile, UploadCandidate};
use js_sys::{Array, Uint8Array};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, File, FileList, HtmlAnchorElement, Url, Window};

/// Get the browser window object.
#[inline]
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Origin the page was served from (e.g., `http://localhost:8888`).
pub fn location_origin() -> Option<String> {
    window()?.location().origin().ok()
}

/// Modal message dialog.
pub fn alert(message: &str) {
    if let Some(window) = window()
        && let Err(e) = window.alert_with_message(message)
    {
        tracing::warn!("alert failed: {:?}", e);
    }
}

/// Modal yes/no dialog. Anything but an explicit "OK" counts as no.
pub fn confirm(message: &str) -> bool {
    window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

/// Modal text input. `None` when cancelled.
pub fn prompt(message: &str, default: &str) -> Option<String> {
    window()?
        .prompt_with_message_and_default(message, default)
        .ok()
        .flatten()
}

// =============================================================================
// Files
// =============================================================================

/// Read every file of an `<input type="file">` selection.
///
/// Files that cannot be read are logged and left out.
pub async fn read_selection(files: FileList) -> Vec<SelectedFile> {
    let mut selected = Vec::with_capacity(files.length() as usize);
    for index in 0..files.length() {
        let Some(file) = files.get(index) else {
            continue;
        };
        match read_file(&file).await {
            Ok(content) => selected.push(SelectedFile::new(file.name(), content)),
            Err(e) => tracing::warn!("could not read {}: {:?}", file.name(), e),
        }
    }
    selected
}

async fn read_file(file: &File) -> Result<Vec<u8>, wasm_bindgen::JsValue> {
    let buffer = JsFuture::from(file.array_buffer()).await?;
    Ok(Uint8Array::new(&buffer).to_vec())
}

/// Hand `bytes` to the browser as a download named `file_name`.
pub fn save_bytes(file_name: &str, bytes: &[u8]) {
    if let Err(e) = try_save_bytes(file_name, bytes) {
        tracing::warn!("download of {} failed: {:?}", file_name, e);
    }
}

fn try_save_bytes(file_name: &str, bytes: &[u8]) -> Result<(), wasm_bindgen::JsValue> {
    let window = window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    let parts = Array::of1(&Uint8Array::from(bytes));
    let options = BlobPropertyBag::new();
    options.set_type("application/octet-stream");
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    let href = Url::create_object_url_with_blob(&blob)?;

    let anchor = document
        .create_element("a")?
        .dyn_into::<HtmlAnchorElement>()?;
    anchor.set_href(&href);
    anchor.set_download(file_name);
    anchor.click();

    Url::revoke_object_url(&href)
}

// =============================================================================
// Overwrite confirmation
// =============================================================================

/// [`OverwritePrompt`] answered with `window.confirm`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConfirmPrompt;

impl OverwritePrompt for ConfirmPrompt {
    async fn confirm_overwrite(&self, candidate: &UploadCandidate) -> bool {
        confirm(&format!(
            "\"{}\" already exists in {}. Replace it?",
            candidate.destination_key, candidate.bucket
        ))
    }
}
