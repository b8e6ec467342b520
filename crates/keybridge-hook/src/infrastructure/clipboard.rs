//! System clipboard access.
//!
//! Only reading text is supported.  Any failure to open the clipboard or to
//! read text from it yields an empty string; the reason is logged at
//! `debug` level and never reaches the caller.

use arboard::Clipboard;
use tracing::debug;

use crate::application::consume::ClipboardReader;

/// Returns the current clipboard text, or `""` if none is available.
pub fn get_clipboard_text() -> String {
    text_or_empty(Clipboard::new().and_then(|mut clipboard| clipboard.get_text()))
}

/// Collapses every clipboard failure into "no text".
fn text_or_empty(result: Result<String, arboard::Error>) -> String {
    match result {
        Ok(text) => text,
        Err(e) => {
            debug!("Clipboard text unavailable: {}", e);
            String::new()
        }
    }
}

/// [`ClipboardReader`] backed by the real system clipboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl ClipboardReader for SystemClipboard {
    fn read_text(&self) -> String {
        get_clipboard_text()
    }
}
