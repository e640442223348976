//! X11 backend using XFixes selection-ownership notifications
//!
//! The worker thread owns its own display connection and an unmapped 1x1
//! window subscribed to CLIPBOARD and PRIMARY ownership changes. If any
//! setup step fails the thread keeps running as a fixed-interval poller.
//! `stop()` wakes the blocking event wait by sending a client message to
//! the watch window from a throwaway connection.

use std::fmt::Display;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use x11rb::connection::Connection;
use x11rb::protocol::xfixes::{ConnectionExt as _, SelectionEventMask};
use x11rb::protocol::xproto::{
    AtomEnum, ClientMessageEvent, ConnectionExt as _, CreateWindowAux, EventMask, Window,
    WindowClass,
};
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

use crate::application::ports::{ClipboardListener, ClipboardMonitor, SnapshotReader, StopOutcome};
use crate::application::ChangeDispatcher;
use crate::domain::clipboard::ContentSnapshot;
use crate::domain::config::MonitorOptions;
use crate::domain::environment::{BackendKind, DetectionStrategy};
use crate::domain::error::{MonitorError, ReadError};

use super::generic::{snapshot_from_targets, GenericReader};
use super::tools::{CommandRunner, ToolRunner};
use super::worker::{StopToken, WorkerSlot};

/// Minimum XFixes major version with selection notifications
const XFIXES_MIN_MAJOR: u32 = 1;

const XCLIP: &str = "xclip";
const XSEL: &str = "xsel";

/// Reads the CLIPBOARD selection via xclip, then xsel, then the generic
/// primitive
pub struct X11Reader<T = ToolRunner, F = GenericReader> {
    tools: T,
    xclip: bool,
    xsel: bool,
    fallback: F,
}

impl X11Reader {
    pub fn new(tool_timeout: Duration) -> Self {
        Self::with_parts(ToolRunner::new(tool_timeout), GenericReader::new())
    }
}

impl<T: CommandRunner, F: SnapshotReader> X11Reader<T, F> {
    /// Reader over an explicit tool runner and fallback read
    pub fn with_parts(tools: T, fallback: F) -> Self {
        let xclip = tools.is_available(XCLIP);
        let xsel = tools.is_available(XSEL);
        debug!(xclip, xsel, "X11 clipboard tools");
        Self {
            tools,
            xclip,
            xsel,
            fallback,
        }
    }

    fn xclip_target(&self, target: &str) -> Result<String, ReadError> {
        self.tools
            .run(XCLIP, &["-selection", "clipboard", "-t", target, "-o"])
    }

    fn read_xclip(&self) -> Option<ContentSnapshot> {
        let text = self
            .tools
            .run(XCLIP, &["-selection", "clipboard", "-o"])
            .map_err(|e| debug!(error = %e, "xclip read failed"))
            .ok()
            .filter(|t| !t.is_empty())?;

        let targets: Vec<String> = self
            .xclip_target("TARGETS")
            .map(|out| out.lines().map(|l| l.trim().to_string()).collect())
            .unwrap_or_default();
        Some(snapshot_from_targets(text, &targets, |t| self.xclip_target(t)))
    }

    fn read_xsel(&self) -> Option<ContentSnapshot> {
        let text = self
            .tools
            .run(XSEL, &["--clipboard", "--output"])
            .map_err(|e| debug!(error = %e, "xsel read failed"))
            .ok()
            .filter(|t| !t.is_empty())?;
        // xsel cannot list targets, so the image flag stays false
        Some(ContentSnapshot::builder().text(text).build())
    }
}

impl<T: CommandRunner, F: SnapshotReader> SnapshotReader for X11Reader<T, F> {
    fn read(&self) -> ContentSnapshot {
        if self.xclip {
            if let Some(snapshot) = self.read_xclip() {
                return snapshot;
            }
        }
        if self.xsel {
            if let Some(snapshot) = self.read_xsel() {
                return snapshot;
            }
        }
        self.fallback.read()
    }
}

fn describe(e: impl Display) -> String {
    e.to_string()
}

/// Display connection and watch window owned by the worker thread
struct SelectionWatch {
    conn: RustConnection,
    window: Window,
}

impl SelectionWatch {
    /// Connect to `display` (`$DISPLAY` when `None`) and subscribe
    fn open(display: Option<&str>) -> Result<Self, String> {
        let (conn, screen_num) = x11rb::connect(display).map_err(describe)?;

        let version = conn
            .xfixes_query_version(5, 0)
            .map_err(describe)?
            .reply()
            .map_err(describe)?;
        if version.major_version < XFIXES_MIN_MAJOR {
            return Err(format!(
                "XFixes {}.{} is too old",
                version.major_version, version.minor_version
            ));
        }

        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .map(|screen| screen.root)
            .ok_or_else(|| format!("screen {} not found", screen_num))?;

        let window = conn.generate_id().map_err(describe)?;
        conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            window,
            root,
            0,
            0,
            1,
            1,
            0,
            WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &CreateWindowAux::new(),
        )
        .map_err(describe)?;
        let watch = Self { conn, window };

        let clipboard = watch
            .conn
            .intern_atom(false, b"CLIPBOARD")
            .map_err(describe)?
            .reply()
            .map_err(describe)?
            .atom;

        let mask = SelectionEventMask::SET_SELECTION_OWNER
            | SelectionEventMask::SELECTION_WINDOW_DESTROY
            | SelectionEventMask::SELECTION_CLIENT_CLOSE;
        for selection in [clipboard, AtomEnum::PRIMARY.into()] {
            watch
                .conn
                .xfixes_select_selection_input(watch.window, selection, mask)
                .map_err(describe)?;
        }
        watch.conn.flush().map_err(describe)?;

        Ok(watch)
    }

    /// Block for events until a stop is requested or the connection dies.
    /// Returns false if the connection failed.
    fn run(&self, token: &StopToken, mut on_change: impl FnMut()) -> bool {
        loop {
            match self.conn.wait_for_event() {
                Ok(Event::XfixesSelectionNotify(_)) => {
                    if token.is_stopped() {
                        return true;
                    }
                    on_change();
                }
                Ok(_) => {
                    if token.is_stopped() {
                        return true;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "X11 connection lost");
                    return false;
                }
            }
        }
    }
}

impl Drop for SelectionWatch {
    fn drop(&mut self) {
        let _ = self.conn.destroy_window(self.window);
        let _ = self.conn.flush();
    }
}

/// Unblock a worker waiting in `wait_for_event`
fn wake_watch_window(display: Option<&str>, window: Window) -> Result<(), String> {
    let (conn, _) = x11rb::connect(display).map_err(describe)?;
    let event = ClientMessageEvent::new(32, window, AtomEnum::NONE, [0u32; 5]);
    conn.send_event(false, window, EventMask::NO_EVENT, event)
        .map_err(describe)?;
    conn.flush().map_err(describe)?;
    Ok(())
}

/// Wake the published watch window, if the worker has one open
fn wake_published(display: Option<&str>, published: &AtomicU32) {
    let window = published.load(Ordering::SeqCst);
    if window == 0 {
        return;
    }
    if let Err(message) = wake_watch_window(display, window) {
        debug!(%message, "could not wake X11 watch window");
    }
}

/// Native push monitor for X11 sessions
pub struct X11Monitor<R: SnapshotReader + 'static = X11Reader> {
    reader: Arc<R>,
    listener: Arc<dyn ClipboardListener>,
    options: MonitorOptions,
    display: Option<String>,
    window: Arc<AtomicU32>,
    slot: WorkerSlot,
}

impl X11Monitor {
    pub fn new(listener: Arc<dyn ClipboardListener>, options: MonitorOptions) -> Self {
        let reader = X11Reader::new(options.tool_timeout);
        Self::with_parts(reader, None, listener, options)
    }
}

impl<R: SnapshotReader + 'static> X11Monitor<R> {
    /// Monitor over an explicit reader and display name (`None` uses
    /// `$DISPLAY`)
    pub fn with_parts(
        reader: R,
        display: Option<String>,
        listener: Arc<dyn ClipboardListener>,
        options: MonitorOptions,
    ) -> Self {
        Self {
            reader: Arc::new(reader),
            listener,
            options,
            display,
            window: Arc::new(AtomicU32::new(0)),
            slot: WorkerSlot::new("clipwatch-x11"),
        }
    }
}

impl<R: SnapshotReader + 'static> ClipboardMonitor for X11Monitor<R> {
    fn backend(&self) -> BackendKind {
        BackendKind::X11
    }

    fn start(&mut self) -> Result<(), MonitorError> {
        if self.slot.is_started() {
            return Ok(());
        }

        let reader = Arc::clone(&self.reader);
        let mut dispatcher =
            ChangeDispatcher::new(Arc::clone(&self.listener), self.options.signature);
        let fallback_interval = self.options.x11_fallback_interval;
        let display = self.display.clone();
        let published = Arc::clone(&self.window);

        self.slot.start(
            self.options.start_timeout,
            self.options.stop_timeout,
            || wake_published(self.display.as_deref(), &self.window),
            move |gate, token| {
                dispatcher.prime(&reader.read());

                match SelectionWatch::open(display.as_deref()) {
                    Ok(watch) => {
                        published.store(watch.window, Ordering::SeqCst);
                        let state = gate.ready(DetectionStrategy::NativePush);
                        let healthy = watch.run(&token, || {
                            dispatcher.offer(reader.read());
                        });
                        published.store(0, Ordering::SeqCst);
                        drop(watch);
                        if healthy {
                            return;
                        }
                        state.set_strategy(DetectionStrategy::Polling);
                    }
                    Err(message) => {
                        warn!(%message, "XFixes selection watch unavailable, polling instead");
                        gate.ready(DetectionStrategy::Polling);
                    }
                }

                while !token.wait(fallback_interval) {
                    dispatcher.offer(reader.read());
                }
            },
        )?;

        info!(strategy = ?self.strategy(), "X11 clipboard monitor started");
        Ok(())
    }

    fn stop(&mut self) -> StopOutcome {
        let outcome = self.slot.stop(self.options.stop_timeout, || {
            wake_published(self.display.as_deref(), &self.window)
        });
        if outcome != StopOutcome::AlreadyStopped {
            info!(?outcome, "X11 clipboard monitor stopped");
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

impl<R: SnapshotReader + 'static> Drop for X11Monitor<R> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use crate::infrastructure::clipboard::tools::scripted::{FixedReader, ScriptedTools};

    const XCLIP_TEXT: &str = "xclip -selection clipboard -o";
    const XCLIP_TARGETS: &str = "xclip -selection clipboard -t TARGETS -o";
    const XSEL_TEXT: &str = "xsel --clipboard --output";

    fn reader(tools: ScriptedTools) -> X11Reader<ScriptedTools, FixedReader> {
        X11Reader::with_parts(tools, FixedReader::text("from generic"))
    }

    #[test]
    fn xclip_supplies_text_and_targets() {
        let tools = ScriptedTools::installed(&[XCLIP, XSEL])
            .output(XCLIP_TEXT, "hello")
            .output(XCLIP_TARGETS, "TARGETS\nUTF8_STRING\nimage/png\n");
        let reader = reader(tools);
        let snapshot = reader.read();
        assert_eq!(snapshot.text(), Some("hello"));
        assert!(snapshot.image_available());
        assert!(!reader.tools.calls().iter().any(|c| c.starts_with(XSEL)));
    }

    #[test]
    fn failing_xclip_falls_back_to_xsel() {
        let tools = ScriptedTools::installed(&[XCLIP, XSEL])
            .failure(XCLIP_TEXT)
            .output(XSEL_TEXT, "from xsel");
        let snapshot = reader(tools).read();
        assert_eq!(snapshot.text(), Some("from xsel"));
        assert!(!snapshot.image_available());
    }

    #[test]
    fn empty_xclip_output_falls_back_to_xsel() {
        let tools = ScriptedTools::installed(&[XCLIP, XSEL])
            .output(XCLIP_TEXT, "")
            .output(XSEL_TEXT, "from xsel");
        assert_eq!(reader(tools).read().text(), Some("from xsel"));
    }

    #[test]
    fn both_tools_failing_uses_generic_read() {
        let tools = ScriptedTools::installed(&[XCLIP, XSEL])
            .failure(XCLIP_TEXT)
            .failure(XSEL_TEXT);
        assert_eq!(reader(tools).read().text(), Some("from generic"));
    }

    #[test]
    fn missing_tools_use_generic_read() {
        let reader = reader(ScriptedTools::installed(&[]));
        assert_eq!(reader.read().text(), Some("from generic"));
        assert!(reader.tools.calls().is_empty());
    }

    #[test]
    fn unreachable_display_falls_back_to_polling() {
        let options = MonitorOptions {
            x11_fallback_interval: Duration::from_millis(10),
            ..MonitorOptions::default()
        };
        let listener: Arc<dyn ClipboardListener> = Arc::new(|_: ContentSnapshot| {});
        let mut monitor = X11Monitor::with_parts(
            FixedReader::text("hello"),
            Some("not-a-display".to_string()),
            listener,
            options,
        );

        monitor.start().unwrap();
        assert!(monitor.is_running());
        assert_eq!(monitor.strategy(), Some(DetectionStrategy::Polling));

        thread::sleep(Duration::from_millis(30));
        assert!(monitor.is_running());
        assert_eq!(monitor.stop(), StopOutcome::Stopped);
        assert_eq!(monitor.strategy(), None);
    }
}
