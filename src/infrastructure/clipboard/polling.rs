//! Polling monitor
//!
//! Re-reads the clipboard on a fixed delay and delivers a snapshot when its
//! signature changes. Backs the generic (macOS, inconclusive Linux) and
//! Wayland monitors, which differ only in the reader they poll.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::application::ports::{ClipboardListener, ClipboardMonitor, SnapshotReader, StopOutcome};
use crate::application::ChangeDispatcher;
use crate::domain::clipboard::ContentSnapshot;
use crate::domain::config::MonitorOptions;
use crate::domain::environment::{BackendKind, DetectionStrategy};
use crate::domain::error::MonitorError;

use super::generic::GenericReader;
use super::wayland::WaylandReader;
use super::worker::WorkerSlot;

/// Fixed-delay polling monitor over any [`SnapshotReader`]
pub struct PollingMonitor<R: SnapshotReader + 'static> {
    kind: BackendKind,
    reader: Arc<R>,
    listener: Arc<dyn ClipboardListener>,
    options: MonitorOptions,
    slot: WorkerSlot,
}

impl PollingMonitor<GenericReader> {
    /// Generic polling backend (macOS, unknown Linux sessions)
    pub fn generic(listener: Arc<dyn ClipboardListener>, options: MonitorOptions) -> Self {
        Self::with_reader(BackendKind::Polling, GenericReader::new(), listener, options)
    }
}

impl PollingMonitor<WaylandReader> {
    /// Wayland backend: polls through wl-paste, falling back to the
    /// generic read primitive
    pub fn wayland(listener: Arc<dyn ClipboardListener>, options: MonitorOptions) -> Self {
        let reader = WaylandReader::new(options.tool_timeout);
        Self::with_reader(BackendKind::Wayland, reader, listener, options)
    }
}

impl<R: SnapshotReader + 'static> PollingMonitor<R> {
    pub fn with_reader(
        kind: BackendKind,
        reader: R,
        listener: Arc<dyn ClipboardListener>,
        options: MonitorOptions,
    ) -> Self {
        Self {
            kind,
            reader: Arc::new(reader),
            listener,
            options,
            slot: WorkerSlot::new(format!("clipwatch-{}", kind)),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.options.poll_interval
    }
}

impl<R: SnapshotReader + 'static> ClipboardMonitor for PollingMonitor<R> {
    fn backend(&self) -> BackendKind {
        self.kind
    }

    fn start(&mut self) -> Result<(), MonitorError> {
        if self.slot.is_started() {
            return Ok(());
        }

        let reader = Arc::clone(&self.reader);
        let mut dispatcher = ChangeDispatcher::new(Arc::clone(&self.listener), self.options.signature);
        let interval = self.options.poll_interval;

        self.slot.start(
            self.options.start_timeout,
            self.options.stop_timeout,
            || {},
            move |gate, token| {
                dispatcher.prime(&reader.read());
                gate.ready(DetectionStrategy::Polling);

                while !token.wait(interval) {
                    dispatcher.offer(reader.read());
                }
                debug!(delivered = dispatcher.delivered(), "polling loop exited");
            },
        )?;

        info!(
            backend = %self.kind,
            interval_ms = interval.as_millis() as u64,
            "clipboard monitor started"
        );
        Ok(())
    }

    fn stop(&mut self) -> StopOutcome {
        let outcome = self.slot.stop(self.options.stop_timeout, || {});
        if outcome != StopOutcome::AlreadyStopped {
            info!(backend = %self.kind, ?outcome, "clipboard monitor stopped");
        }
        outcome
    }

    fn is_running(&self) -> bool {
        self.slot.state().is_running()
    }

    fn strategy(&self) -> Option<DetectionStrategy> {
        self.slot.state().strategy()
    }

    fn current_snapshot(&self) -> ContentSnapshot {
        self.reader.read()
    }
}

impl<R: SnapshotReader + 'static> Drop for PollingMonitor<R> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FixedReader(ContentSnapshot);

    impl SnapshotReader for FixedReader {
        fn read(&self) -> ContentSnapshot {
            self.0.clone()
        }
    }

    fn options() -> MonitorOptions {
        MonitorOptions {
            poll_interval: Duration::from_millis(10),
            ..MonitorOptions::default()
        }
    }

    fn monitor(text: &str) -> (PollingMonitor<FixedReader>, Arc<Mutex<u32>>) {
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let listener = move |_snapshot: ContentSnapshot| *counter.lock().unwrap() += 1;
        let reader = FixedReader(ContentSnapshot::builder().text(text).build());
        let monitor =
            PollingMonitor::with_reader(BackendKind::Polling, reader, Arc::new(listener), options());
        (monitor, calls)
    }

    #[test]
    fn start_reports_polling_strategy() {
        let (mut monitor, _) = monitor("hello");
        assert_eq!(monitor.strategy(), None);
        monitor.start().unwrap();
        assert!(monitor.is_running());
        assert_eq!(monitor.strategy(), Some(DetectionStrategy::Polling));
        assert_eq!(monitor.stop(), StopOutcome::Stopped);
        assert!(!monitor.is_running());
        assert_eq!(monitor.strategy(), None);
    }

    #[test]
    fn unchanged_clipboard_is_never_delivered() {
        let (mut monitor, calls) = monitor("hello");
        monitor.start().unwrap();
        std::thread::sleep(Duration::from_millis(80));
        monitor.stop();
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn stop_without_start_is_noop() {
        let (mut monitor, _) = monitor("hello");
        assert_eq!(monitor.stop(), StopOutcome::AlreadyStopped);
    }

    #[test]
    fn restart_after_stop() {
        let (mut monitor, _) = monitor("hello");
        monitor.start().unwrap();
        monitor.stop();
        monitor.start().unwrap();
        assert!(monitor.is_running());
        assert_eq!(monitor.stop(), StopOutcome::Stopped);
    }

    #[test]
    fn backend_kind_is_reported() {
        let (monitor, _) = monitor("hello");
        assert_eq!(monitor.backend(), BackendKind::Polling);
        assert_eq!(monitor.current_snapshot().text(), Some("hello"));
    }
}
