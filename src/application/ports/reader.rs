//! Snapshot reader port interface

use crate::domain::clipboard::ContentSnapshot;

/// Port for reading the current clipboard into a snapshot.
///
/// Reads are infallible by contract: a failure to extract one
/// representation leaves that field absent and never aborts the others.
pub trait SnapshotReader: Send + Sync {
    fn read(&self) -> ContentSnapshot;
}

impl<R: SnapshotReader + ?Sized> SnapshotReader for std::sync::Arc<R> {
    fn read(&self) -> ContentSnapshot {
        self.as_ref().read()
    }
}
