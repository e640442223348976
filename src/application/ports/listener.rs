//! Clipboard change listener port

use crate::domain::clipboard::ContentSnapshot;

/// Receives de-duplicated clipboard change notifications.
///
/// Called on the monitor's own thread. Implementations should return
/// quickly and must not perform blocking native clipboard calls of their
/// own; hand the snapshot off to another thread or channel instead.
/// A panic inside `on_change` is caught by the monitor and does not stop it.
pub trait ClipboardListener: Send + Sync {
    fn on_change(&self, snapshot: ContentSnapshot);
}

impl<F> ClipboardListener for F
where
    F: Fn(ContentSnapshot) + Send + Sync,
{
    fn on_change(&self, snapshot: ContentSnapshot) {
        self(snapshot)
    }
}
