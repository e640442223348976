//! Generic cross-platform clipboard read primitive
//!
//! Extracts up to five representations (text, HTML, RTF, file list, image
//! availability) from the OS clipboard. Each extraction is isolated: one
//! representation failing never prevents the others from being read.
//!
//! clipboard-rs is the primary source since it exposes every flavor;
//! arboard backs it up for text and images when a clipboard-rs context
//! cannot be created.

use std::cell::RefCell;

use clipboard_rs::{Clipboard as _, ClipboardContext, ContentFormat};
use percent_encoding::percent_decode_str;
use tracing::debug;

use crate::application::ports::SnapshotReader;
use crate::domain::clipboard::ContentSnapshot;
use crate::domain::error::ReadError;

/// Per-flavor access to a clipboard data-transfer object.
///
/// `Ok(None)` means the flavor is not on the clipboard; `Err` means it
/// claimed to be there but could not be transferred.
pub trait FlavorSource {
    fn text(&self) -> Result<Option<String>, ReadError>;
    fn html(&self) -> Result<Option<String>, ReadError>;
    fn rtf(&self) -> Result<Option<String>, ReadError>;
    fn files(&self) -> Result<Option<Vec<String>>, ReadError>;
    fn has_image(&self) -> Result<bool, ReadError>;
}

/// Build a snapshot from a flavor source, isolating each extraction
pub fn extract_snapshot(source: &dyn FlavorSource) -> ContentSnapshot {
    let files = isolate("files", source.files()).map(normalize_file_list);
    let image = isolate("image", source.has_image().map(Some)).unwrap_or(false);

    ContentSnapshot::builder()
        .maybe_text(isolate("text", source.text()))
        .maybe_html(isolate("html", source.html()))
        .maybe_rtf(isolate("rtf", source.rtf()))
        .maybe_files(files)
        .image_available(image)
        .build()
}

fn isolate<T>(flavor: &'static str, result: Result<Option<T>, ReadError>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            debug!(flavor, error = %e, "clipboard flavor unavailable for this read");
            None
        }
    }
}

/// Convert clipboard file entries to absolute paths, dropping blanks
pub fn normalize_file_list(entries: Vec<String>) -> Vec<String> {
    entries
        .iter()
        .filter_map(|entry| normalize_file_entry(entry))
        .collect()
}

/// Turn a `file://` URI or plain path into an absolute path string.
///
/// Returns `None` for blank lines and `text/uri-list` comments.
pub fn normalize_file_entry(entry: &str) -> Option<String> {
    let trimmed = entry.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let Some(rest) = trimmed.strip_prefix("file://") else {
        return Some(trimmed.to_string());
    };
    let rest = rest.strip_prefix("localhost").unwrap_or(rest);
    let decoded = percent_decode_str(rest).decode_utf8_lossy().into_owned();

    // file:///C:/dir -> C:/dir
    let bytes = decoded.as_bytes();
    if bytes.len() >= 3 && bytes[0] == b'/' && bytes[2] == b':' && bytes[1].is_ascii_alphabetic() {
        return Some(decoded[1..].to_string());
    }
    Some(decoded)
}

/// Parse a `text/uri-list` payload into absolute paths
pub fn parse_uri_list(payload: &str) -> Vec<String> {
    payload.lines().filter_map(normalize_file_entry).collect()
}

/// Build a snapshot from tool-supplied text plus whatever the advertised
/// MIME types (Wayland) or selection targets (X11) allow. Extra
/// representations are fetched through `fetch`; a failed fetch leaves that
/// field absent.
pub fn snapshot_from_targets<F>(text: String, targets: &[String], fetch: F) -> ContentSnapshot
where
    F: Fn(&str) -> Result<String, ReadError>,
{
    let advertises = |mime: &str| targets.iter().any(|t| t == mime);
    let image = targets.iter().any(|t| t.starts_with("image/"));

    let html = if advertises("text/html") {
        isolate("html", fetch("text/html").map(Some))
    } else {
        None
    };
    let files = if advertises("text/uri-list") {
        isolate("files", fetch("text/uri-list").map(Some)).map(|list| parse_uri_list(&list))
    } else {
        None
    };

    ContentSnapshot::builder()
        .text(text)
        .maybe_html(html)
        .maybe_files(files)
        .image_available(image)
        .build()
}

fn flavor_error(flavor: &'static str) -> impl Fn(Box<dyn std::error::Error + Send + Sync>) -> ReadError {
    move |e| ReadError::Flavor {
        flavor,
        message: e.to_string(),
    }
}

/// Flavor source over a clipboard-rs context
struct ClipboardRsSource {
    ctx: ClipboardContext,
}

impl FlavorSource for ClipboardRsSource {
    fn text(&self) -> Result<Option<String>, ReadError> {
        if !self.ctx.has(ContentFormat::Text) {
            return Ok(None);
        }
        self.ctx.get_text().map(Some).map_err(flavor_error("text"))
    }

    fn html(&self) -> Result<Option<String>, ReadError> {
        if !self.ctx.has(ContentFormat::Html) {
            return Ok(None);
        }
        self.ctx.get_html().map(Some).map_err(flavor_error("html"))
    }

    fn rtf(&self) -> Result<Option<String>, ReadError> {
        if !self.ctx.has(ContentFormat::Rtf) {
            return Ok(None);
        }
        self.ctx.get_rich_text().map(Some).map_err(flavor_error("rtf"))
    }

    fn files(&self) -> Result<Option<Vec<String>>, ReadError> {
        if !self.ctx.has(ContentFormat::Files) {
            return Ok(None);
        }
        self.ctx.get_files().map(Some).map_err(flavor_error("files"))
    }

    fn has_image(&self) -> Result<bool, ReadError> {
        Ok(self.ctx.has(ContentFormat::Image))
    }
}

/// Text and image only; used when clipboard-rs is unavailable
struct ArboardSource {
    clipboard: RefCell<arboard::Clipboard>,
}

impl FlavorSource for ArboardSource {
    fn text(&self) -> Result<Option<String>, ReadError> {
        match self.clipboard.borrow_mut().get_text() {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(ReadError::Flavor {
                flavor: "text",
                message: e.to_string(),
            }),
        }
    }

    fn html(&self) -> Result<Option<String>, ReadError> {
        Ok(None)
    }

    fn rtf(&self) -> Result<Option<String>, ReadError> {
        Ok(None)
    }

    fn files(&self) -> Result<Option<Vec<String>>, ReadError> {
        Ok(None)
    }

    fn has_image(&self) -> Result<bool, ReadError> {
        match self.clipboard.borrow_mut().get_image() {
            Ok(_) => Ok(true),
            Err(arboard::Error::ContentNotAvailable) => Ok(false),
            Err(e) => Err(ReadError::Flavor {
                flavor: "image",
                message: e.to_string(),
            }),
        }
    }
}

/// The generic read primitive shared by every backend
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericReader;

impl GenericReader {
    pub fn new() -> Self {
        Self
    }
}

impl SnapshotReader for GenericReader {
    fn read(&self) -> ContentSnapshot {
        match ClipboardContext::new() {
            Ok(ctx) => return extract_snapshot(&ClipboardRsSource { ctx }),
            Err(e) => debug!(error = %e, "clipboard-rs context unavailable, trying arboard"),
        }

        match arboard::Clipboard::new() {
            Ok(clipboard) => extract_snapshot(&ArboardSource {
                clipboard: RefCell::new(clipboard),
            }),
            Err(e) => {
                debug!(error = %e, "no clipboard access for this read");
                ContentSnapshot::empty()
            }
        }
    }
}
