//! Cheap change-detection signature for clipboard snapshots

use std::fmt;

use super::snapshot::ContentSnapshot;

/// Default number of characters kept from each text-like field
pub const DEFAULT_PREVIEW_CHARS: usize = 64;

/// Default number of file entries included in the signature
pub const DEFAULT_FILE_PREVIEW_ENTRIES: usize = 8;

/// Controls how much of each field goes into a [`Signature`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureSettings {
    pub preview_chars: usize,
    pub file_preview_entries: usize,
}

impl Default for SignatureSettings {
    fn default() -> Self {
        Self {
            preview_chars: DEFAULT_PREVIEW_CHARS,
            file_preview_entries: DEFAULT_FILE_PREVIEW_ENTRIES,
        }
    }
}

/// Deterministic digest of a snapshot built from truncated previews.
///
/// Each text-like field contributes its full byte length followed by a
/// bounded character prefix, so length changes are always visible without
/// walking the whole payload. Content that
/// differs only past the preview window with an identical length is not
/// detected; this is a known limitation of preview signatures.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(String);

impl Signature {
    /// Compute the signature of a snapshot
    pub fn of(snapshot: &ContentSnapshot, settings: SignatureSettings) -> Self {
        let mut out = String::with_capacity(settings.preview_chars * 3 + 32);

        push_field(&mut out, 't', snapshot.text(), settings.preview_chars);
        push_field(&mut out, 'h', snapshot.html(), settings.preview_chars);
        push_field(&mut out, 'r', snapshot.rtf(), settings.preview_chars);

        out.push_str(if snapshot.image_available() { "i1" } else { "i0" });

        match snapshot.files() {
            Some(files) => {
                out.push_str(&format!("|f{}", files.len()));
                for file in files.iter().take(settings.file_preview_entries) {
                    out.push_str(&format!("|{}:{}", file.len(), file));
                }
            }
            None => out.push_str("|f-"),
        }

        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn push_field(out: &mut String, tag: char, value: Option<&str>, preview_chars: usize) {
    out.push(tag);
    match value {
        Some(v) => {
            out.push_str(&v.len().to_string());
            out.push(':');
            out.extend(v.chars().take(preview_chars));
        }
        None => out.push('-'),
    }
    out.push('|');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(snapshot: &ContentSnapshot) -> Signature {
        Signature::of(snapshot, SignatureSettings::default())
    }

    #[test]
    fn identical_content_yields_identical_signature() {
        let a = ContentSnapshot::builder_at(1).text("hello").build();
        let b = ContentSnapshot::builder_at(999).text("hello").build();
        assert_eq!(sig(&a), sig(&b));
    }

    #[test]
    fn different_text_differs() {
        let a = ContentSnapshot::builder().text("hello").build();
        let b = ContentSnapshot::builder().text("world").build();
        assert_ne!(sig(&a), sig(&b));
    }

    #[test]
    fn absent_and_present_fields_differ() {
        let a = ContentSnapshot::builder().text("x").build();
        let b = ContentSnapshot::builder().text("x").html("x").build();
        assert_ne!(sig(&a), sig(&b));
    }

    #[test]
    fn image_flag_is_significant() {
        let a = ContentSnapshot::builder().build();
        let b = ContentSnapshot::builder().image_available(true).build();
        assert_ne!(sig(&a), sig(&b));
    }

    #[test]
    fn change_beyond_preview_with_same_length_is_missed() {
        let base = "a".repeat(100);
        let mut changed = "a".repeat(99);
        changed.push('b');
        let a = ContentSnapshot::builder().text(base).build();
        let b = ContentSnapshot::builder().text(changed).build();
        assert_eq!(sig(&a), sig(&b));
    }

    #[test]
    fn length_change_beyond_preview_is_detected() {
        let a = ContentSnapshot::builder().text("a".repeat(100)).build();
        let b = ContentSnapshot::builder().text("a".repeat(101)).build();
        assert_ne!(sig(&a), sig(&b));
    }

    #[test]
    fn file_count_beyond_preview_is_detected() {
        let files: Vec<String> = (0..10).map(|i| format!("/tmp/{}", i)).collect();
        let a = ContentSnapshot::builder().files(files.clone()).build();
        let b = ContentSnapshot::builder().files(files[..9].to_vec()).build();
        assert_ne!(sig(&a), sig(&b));
    }

    #[test]
    fn preview_window_is_configurable() {
        let settings = SignatureSettings {
            preview_chars: 200,
            file_preview_entries: 8,
        };
        let mut changed = "a".repeat(99);
        changed.push('b');
        let a = ContentSnapshot::builder().text("a".repeat(100)).build();
        let b = ContentSnapshot::builder().text(changed).build();
        assert_ne!(Signature::of(&a, settings), Signature::of(&b, settings));
    }

    #[test]
    fn multibyte_text_is_truncated_on_char_boundary() {
        let text = "é".repeat(80);
        let snapshot = ContentSnapshot::builder().text(text).build();
        let signature = sig(&snapshot);
        let expected = format!("t160:{}|", "é".repeat(DEFAULT_PREVIEW_CHARS));
        assert!(signature.as_str().starts_with(&expected));
    }

    #[test]
    fn length_is_recorded_in_bytes() {
        let a = ContentSnapshot::builder().text("e").build();
        let b = ContentSnapshot::builder().text("é").build();
        assert!(sig(&a).as_str().starts_with("t1:e|"));
        assert!(sig(&b).as_str().starts_with("t2:é|"));
    }
}
