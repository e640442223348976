//! Wayland clipboard reader using wl-paste
//!
//! wl-paste supplies the text and its `--list-types` output decides image
//! availability. Empty text output is indistinguishable from a tool failure,
//! so both fall through to the generic read primitive.

use std::time::Duration;

use tracing::debug;

use crate::application::ports::SnapshotReader;
use crate::domain::clipboard::ContentSnapshot;
use crate::domain::error::ReadError;

use super::generic::{snapshot_from_targets, GenericReader};
use super::tools::{CommandRunner, ToolRunner};

const WL_PASTE: &str = "wl-paste";

pub struct WaylandReader<T = ToolRunner, F = GenericReader> {
    tools: T,
    wl_paste_available: bool,
    fallback: F,
}

impl WaylandReader {
    pub fn new(tool_timeout: Duration) -> Self {
        Self::with_parts(ToolRunner::new(tool_timeout), GenericReader::new())
    }
}

impl<T: CommandRunner, F: SnapshotReader> WaylandReader<T, F> {
    /// Reader over an explicit tool runner and fallback read
    pub fn with_parts(tools: T, fallback: F) -> Self {
        let wl_paste_available = tools.is_available(WL_PASTE);
        if !wl_paste_available {
            debug!("wl-paste not found, Wayland reads use the generic primitive");
        }
        Self {
            tools,
            wl_paste_available,
            fallback,
        }
    }

    fn mime_types(&self) -> Result<Vec<String>, ReadError> {
        let out = self.tools.run(WL_PASTE, &["--list-types"])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    fn paste(&self, mime: &str) -> Result<String, ReadError> {
        self.tools.run(WL_PASTE, &["--no-newline", "--type", mime])
    }

    /// Read via wl-paste; `None` means fall through to the generic read
    fn read_with_tool(&self) -> Option<ContentSnapshot> {
        let text = match self.paste("text") {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => return None,
            Err(e) => {
                debug!(error = %e, "wl-paste text read failed");
                return None;
            }
        };

        let types = self.mime_types().unwrap_or_else(|e| {
            debug!(error = %e, "wl-paste --list-types failed");
            Vec::new()
        });
        Some(snapshot_from_targets(text, &types, |mime| self.paste(mime)))
    }
}

impl<T: CommandRunner, F: SnapshotReader> SnapshotReader for WaylandReader<T, F> {
    fn read(&self) -> ContentSnapshot {
        if self.wl_paste_available {
            if let Some(snapshot) = self.read_with_tool() {
                return snapshot;
            }
        }
        self.fallback.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clipboard::tools::scripted::{FixedReader, ScriptedTools};

    const TEXT: &str = "wl-paste --no-newline --type text";
    const TYPES: &str = "wl-paste --list-types";

    fn reader(tools: ScriptedTools) -> WaylandReader<ScriptedTools, FixedReader> {
        WaylandReader::with_parts(tools, FixedReader::text("from generic"))
    }

    #[test]
    fn text_comes_from_wl_paste() {
        let tools = ScriptedTools::installed(&[WL_PASTE])
            .output(TEXT, "hello")
            .output(TYPES, "text/plain;charset=utf-8\nUTF8_STRING\n");
        let snapshot = reader(tools).read();
        assert_eq!(snapshot.text(), Some("hello"));
        assert!(!snapshot.image_available());
        assert!(snapshot.html().is_none());
    }

    #[test]
    fn empty_text_falls_back_to_generic_read() {
        let tools = ScriptedTools::installed(&[WL_PASTE]).output(TEXT, "");
        assert_eq!(reader(tools).read().text(), Some("from generic"));
    }

    #[test]
    fn tool_error_falls_back_to_generic_read() {
        let tools = ScriptedTools::installed(&[WL_PASTE]).failure(TEXT);
        assert_eq!(reader(tools).read().text(), Some("from generic"));
    }

    #[test]
    fn advertised_png_sets_image_flag() {
        let tools = ScriptedTools::installed(&[WL_PASTE])
            .output(TEXT, "caption")
            .output(TYPES, "text/plain\nimage/png\n");
        let snapshot = reader(tools).read();
        assert_eq!(snapshot.text(), Some("caption"));
        assert!(snapshot.image_available());
    }

    #[test]
    fn advertised_html_and_uri_list_are_read() {
        let tools = ScriptedTools::installed(&[WL_PASTE])
            .output(TEXT, "hi")
            .output(TYPES, "text/plain\ntext/html\ntext/uri-list\n")
            .output("wl-paste --no-newline --type text/html", "<b>hi</b>")
            .output(
                "wl-paste --no-newline --type text/uri-list",
                "file:///tmp/a\r\nfile:///tmp/b\r\n",
            );
        let snapshot = reader(tools).read();
        assert_eq!(snapshot.html(), Some("<b>hi</b>"));
        assert_eq!(snapshot.files().map(|f| f.len()), Some(2));
    }

    #[test]
    fn failing_type_listing_keeps_text() {
        let tools = ScriptedTools::installed(&[WL_PASTE])
            .output(TEXT, "hello")
            .failure(TYPES);
        let snapshot = reader(tools).read();
        assert_eq!(snapshot.text(), Some("hello"));
        assert!(!snapshot.image_available());
    }

    #[test]
    fn missing_wl_paste_skips_the_tool() {
        let tools = ScriptedTools::installed(&[]).output(TEXT, "never read");
        let reader = reader(tools);
        assert_eq!(reader.read().text(), Some("from generic"));
        assert!(reader.tools.calls().is_empty());
    }
}
