//! Change de-duplication and guarded listener delivery
//!
//! Every backend funnels its reads through a [`ChangeDispatcher`] owned by
//! its worker thread. The dispatcher keeps the signature of the last
//! delivered snapshot and only calls the listener when a new read differs.
//! Only the worker thread touches it, so it needs no locking.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::ports::ClipboardListener;
use crate::domain::clipboard::{ContentSnapshot, Signature, SignatureSettings};

/// Result of offering a snapshot to the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Signature matched the last delivery; listener not called
    Unchanged,
    /// Listener was called and returned normally
    Delivered,
    /// Listener was called and panicked; the panic was contained
    ListenerPanicked,
}

pub struct ChangeDispatcher {
    listener: Arc<dyn ClipboardListener>,
    settings: SignatureSettings,
    last: Option<Signature>,
    delivered: u64,
}

impl ChangeDispatcher {
    pub fn new(listener: Arc<dyn ClipboardListener>, settings: SignatureSettings) -> Self {
        Self {
            listener,
            settings,
            last: None,
            delivered: 0,
        }
    }

    /// Record a baseline without notifying the listener
    pub fn prime(&mut self, snapshot: &ContentSnapshot) {
        self.last = Some(Signature::of(snapshot, self.settings));
    }

    /// Deliver `snapshot` if its signature differs from the last one.
    ///
    /// The stored signature is updated before the listener runs, so a
    /// listener that panics is not re-invoked for the same content.
    pub fn offer(&mut self, snapshot: ContentSnapshot) -> Dispatch {
        let signature = Signature::of(&snapshot, self.settings);
        if self.last.as_ref() == Some(&signature) {
            return Dispatch::Unchanged;
        }

        debug!(summary = %snapshot.summary(), "clipboard changed");
        self.last = Some(signature);
        self.delivered += 1;

        let listener = Arc::clone(&self.listener);
        match panic::catch_unwind(AssertUnwindSafe(move || listener.on_change(snapshot))) {
            Ok(()) => Dispatch::Delivered,
            Err(payload) => {
                warn!(
                    reason = %panic_message(payload.as_ref()),
                    "clipboard listener panicked; monitor keeps running"
                );
                Dispatch::ListenerPanicked
            }
        }
    }

    pub fn last_signature(&self) -> Option<&Signature> {
        self.last.as_ref()
    }

    /// Number of snapshots handed to the listener so far
    pub fn delivered(&self) -> u64 {
        self.delivered
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
