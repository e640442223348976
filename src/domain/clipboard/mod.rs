//! Clipboard content model

mod signature;
mod snapshot;

pub use signature::{
    Signature, SignatureSettings, DEFAULT_FILE_PREVIEW_ENTRIES, DEFAULT_PREVIEW_CHARS,
};
pub use snapshot::{now_millis, ContentSnapshot, ContentSnapshotBuilder};
