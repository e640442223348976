//! Clipboard content snapshot value object

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// One observation of the system clipboard.
///
/// Native clipboards can expose any subset of representations at the same
/// time, so every payload field is independently optional. Only the image
/// flag and the capture timestamp are always present. Snapshots are never
/// mutated after construction; each read produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSnapshot {
    text: Option<String>,
    html: Option<String>,
    rtf: Option<String>,
    files: Option<Vec<String>>,
    image_available: bool,
    captured_at_millis: i64,
}

impl ContentSnapshot {
    /// Start building a snapshot stamped with the current wall-clock time
    pub fn builder() -> ContentSnapshotBuilder {
        ContentSnapshotBuilder::new(now_millis())
    }

    /// Start building a snapshot with an explicit capture time
    pub fn builder_at(captured_at_millis: i64) -> ContentSnapshotBuilder {
        ContentSnapshotBuilder::new(captured_at_millis)
    }

    /// Snapshot of a clipboard that exposed nothing readable
    pub fn empty() -> Self {
        Self::builder().build()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn html(&self) -> Option<&str> {
        self.html.as_deref()
    }

    pub fn rtf(&self) -> Option<&str> {
        self.rtf.as_deref()
    }

    /// Absolute file paths, in clipboard order
    pub fn files(&self) -> Option<&[String]> {
        self.files.as_deref()
    }

    pub fn image_available(&self) -> bool {
        self.image_available
    }

    pub fn captured_at_millis(&self) -> i64 {
        self.captured_at_millis
    }

    /// True when no representation at all was present
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.html.is_none()
            && self.rtf.is_none()
            && self.files.is_none()
            && !self.image_available
    }

    /// Short human-readable description of what the snapshot holds
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(text) = &self.text {
            parts.push(format!("text ({} chars)", text.chars().count()));
        }
        if self.html.is_some() {
            parts.push("html".to_string());
        }
        if self.rtf.is_some() {
            parts.push("rtf".to_string());
        }
        if let Some(files) = &self.files {
            parts.push(format!("{} file(s)", files.len()));
        }
        if self.image_available {
            parts.push("image".to_string());
        }

        if parts.is_empty() {
            "empty".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Builder for [`ContentSnapshot`].
///
/// Empty strings and empty file lists are stored as absent, since an empty
/// representation carries no content.
#[derive(Debug, Clone)]
pub struct ContentSnapshotBuilder {
    inner: ContentSnapshot,
}

impl ContentSnapshotBuilder {
    fn new(captured_at_millis: i64) -> Self {
        Self {
            inner: ContentSnapshot {
                text: None,
                html: None,
                rtf: None,
                files: None,
                image_available: false,
                captured_at_millis,
            },
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.inner.text = non_empty(text.into());
        self
    }

    pub fn maybe_text(self, text: Option<String>) -> Self {
        match text {
            Some(t) => self.text(t),
            None => self,
        }
    }

    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.inner.html = non_empty(html.into());
        self
    }

    pub fn maybe_html(self, html: Option<String>) -> Self {
        match html {
            Some(h) => self.html(h),
            None => self,
        }
    }

    pub fn rtf(mut self, rtf: impl Into<String>) -> Self {
        self.inner.rtf = non_empty(rtf.into());
        self
    }

    pub fn maybe_rtf(self, rtf: Option<String>) -> Self {
        match rtf {
            Some(r) => self.rtf(r),
            None => self,
        }
    }

    pub fn files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let files: Vec<String> = files.into_iter().map(Into::into).collect();
        self.inner.files = if files.is_empty() { None } else { Some(files) };
        self
    }

    pub fn maybe_files(self, files: Option<Vec<String>>) -> Self {
        match files {
            Some(f) => self.files(f),
            None => self,
        }
    }

    pub fn image_available(mut self, available: bool) -> Self {
        self.inner.image_available = available;
        self
    }

    pub fn build(self) -> ContentSnapshot {
        self.inner
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_has_only_flag_and_timestamp() {
        let snapshot = ContentSnapshot::empty();
        assert!(snapshot.text().is_none());
        assert!(snapshot.html().is_none());
        assert!(snapshot.rtf().is_none());
        assert!(snapshot.files().is_none());
        assert!(!snapshot.image_available());
        assert!(snapshot.captured_at_millis() > 0);
        assert!(snapshot.is_empty());
    }

    #[test]
    fn builder_sets_independent_fields() {
        let snapshot = ContentSnapshot::builder_at(42)
            .text("hello")
            .html("<b>hello</b>")
            .image_available(true)
            .build();

        assert_eq!(snapshot.text(), Some("hello"));
        assert_eq!(snapshot.html(), Some("<b>hello</b>"));
        assert!(snapshot.rtf().is_none());
        assert!(snapshot.image_available());
        assert_eq!(snapshot.captured_at_millis(), 42);
    }

    #[test]
    fn empty_payloads_are_absent() {
        let snapshot = ContentSnapshot::builder()
            .text("")
            .files(Vec::<String>::new())
            .build();
        assert!(snapshot.text().is_none());
        assert!(snapshot.files().is_none());
    }

    #[test]
    fn file_selection_without_text() {
        let snapshot = ContentSnapshot::builder()
            .files(["/tmp/a.txt", "/tmp/b.txt", "/tmp/c.txt"])
            .build();
        assert_eq!(snapshot.files().map(|f| f.len()), Some(3));
        assert!(snapshot.text().is_none());
    }

    #[test]
    fn summary_lists_representations() {
        let snapshot = ContentSnapshot::builder()
            .text("abc")
            .files(["/a"])
            .image_available(true)
            .build();
        assert_eq!(snapshot.summary(), "text (3 chars), 1 file(s), image");
        assert_eq!(ContentSnapshot::empty().summary(), "empty");
    }

    #[test]
    fn serializes_camel_case() {
        let snapshot = ContentSnapshot::builder_at(7).text("x").build();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"imageAvailable\":false"));
        assert!(json.contains("\"capturedAtMillis\":7"));
    }
}
