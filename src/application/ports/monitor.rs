//! Clipboard monitor port interface

use crate::domain::clipboard::ContentSnapshot;
use crate::domain::environment::{BackendKind, DetectionStrategy};
use crate::domain::error::MonitorError;

/// Result of a [`ClipboardMonitor::stop`] call.
///
/// A shutdown timeout is reported here rather than raised as an error;
/// the worker thread is detached and any native resources it still holds
/// may leak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The worker exited and was joined
    Stopped,
    /// The monitor was not running; nothing to do
    AlreadyStopped,
    /// The worker did not exit within the join timeout
    TimedOut,
}

/// Port for a clipboard change monitor.
///
/// `start` and `stop` take `&mut self`, so calls on one instance are
/// serialized by ownership. Both are idempotent.
pub trait ClipboardMonitor: Send {
    /// Which backend implementation this is
    fn backend(&self) -> BackendKind;

    /// Spawn the worker thread and block until it is listening.
    ///
    /// Returns `Ok(())` immediately if already running. Setup failures are
    /// returned as errors and leave the monitor stopped.
    fn start(&mut self) -> Result<(), MonitorError>;

    /// Signal the worker to exit and wait for it, bounded by a timeout
    fn stop(&mut self) -> StopOutcome;

    fn is_running(&self) -> bool;

    /// Detection strategy currently in use, `None` while stopped
    fn strategy(&self) -> Option<DetectionStrategy>;

    /// One-off synchronous read, valid whether or not the monitor runs
    fn current_snapshot(&self) -> ContentSnapshot;
}

impl<M: ClipboardMonitor + ?Sized> ClipboardMonitor for Box<M> {
    fn backend(&self) -> BackendKind {
        self.as_ref().backend()
    }

    fn start(&mut self) -> Result<(), MonitorError> {
        self.as_mut().start()
    }

    fn stop(&mut self) -> StopOutcome {
        self.as_mut().stop()
    }

    fn is_running(&self) -> bool {
        self.as_ref().is_running()
    }

    fn strategy(&self) -> Option<DetectionStrategy> {
        self.as_ref().strategy()
    }

    fn current_snapshot(&self) -> ContentSnapshot {
        self.as_ref().current_snapshot()
    }
}
