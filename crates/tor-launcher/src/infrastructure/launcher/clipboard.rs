//! System clipboard adapter.
//!
//! A fresh `arboard::Clipboard` is opened for every write.  On X11 the
//! selection is handed to the clipboard manager when the handle closes, so
//! the copied URL survives a short-lived process only if a clipboard manager
//! is running.

use tracing::debug;

use crate::application::open_bookmark::Clipboard;

/// [`Clipboard`] backed by the desktop clipboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), String> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| format!("clipboard unavailable: {e}"))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| format!("clipboard write failed: {e}"))?;
        debug!(len = text.len(), "clipboard text set");
        Ok(())
    }
}
