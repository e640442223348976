//! Windows backend using a message-only clipboard format listener
//!
//! The worker thread registers a hidden message-only window, subscribes it
//! with `AddClipboardFormatListener`, and blocks in `GetMessageW`.
//! `WM_CLIPBOARDUPDATE` triggers a read through the generic primitive.
//! `stop()` posts `WM_CLOSE` to the window; the window procedure tears down
//! the listener and posts the quit message that ends the loop.

use std::cell::RefCell;
use std::iter;
use std::mem;
use std::ptr;
use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};
use windows_sys::Win32::Foundation::{
    GetLastError, ERROR_CLASS_ALREADY_EXISTS, HINSTANCE, HWND, LPARAM, LRESULT, WPARAM,
};
use windows_sys::Win32::System::DataExchange::{
    AddClipboardFormatListener, RemoveClipboardFormatListener,
};
use windows_sys::Win32::System::LibraryLoader::GetModuleHandleW;
use windows_sys::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW, IsWindow,
    PostMessageW, PostQuitMessage, RegisterClassExW, TranslateMessage, UnregisterClassW,
    HWND_MESSAGE, MSG, WM_CLIPBOARDUPDATE, WM_CLOSE, WM_DESTROY, WNDCLASSEXW,
};

use crate::application::ports::{ClipboardListener, ClipboardMonitor, SnapshotReader, StopOutcome};
use crate::application::ChangeDispatcher;
use crate::domain::clipboard::ContentSnapshot;
use crate::domain::config::MonitorOptions;
use crate::domain::environment::{BackendKind, DetectionStrategy};
use crate::domain::error::MonitorError;

use super::generic::GenericReader;
use super::worker::WorkerSlot;

const CLASS_NAME: &str = "ClipwatchMessageWindow";

thread_local! {
    /// Change handler for the message window owned by this thread
    static ON_UPDATE: RefCell<Option<Box<dyn FnMut()>>> = RefCell::new(None);
}

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(iter::once(0)).collect()
}

fn setup_failed(step: &str) -> MonitorError {
    // SAFETY: reads the calling thread's last-error value
    let code = unsafe { GetLastError() };
    MonitorError::SetupFailed {
        backend: BackendKind::Windows,
        message: format!("{} failed (error {})", step, code),
    }
}

unsafe extern "system" fn wnd_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match msg {
        WM_CLIPBOARDUPDATE => {
            ON_UPDATE.with(|slot| {
                // A re-entrant update while a read is in flight is coalesced
                if let Ok(mut handler) = slot.try_borrow_mut() {
                    if let Some(handler) = handler.as_mut() {
                        handler();
                    }
                }
            });
            0
        }
        WM_CLOSE => {
            DestroyWindow(hwnd);
            0
        }
        WM_DESTROY => {
            RemoveClipboardFormatListener(hwnd);
            PostQuitMessage(0);
            0
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

/// Message-only window registered as a clipboard format listener.
/// Lives on, and is destroyed by, the worker thread.
struct MessageWindow {
    hwnd: HWND,
    class: Vec<u16>,
    instance: HINSTANCE,
}

impl MessageWindow {
    fn create() -> Result<Self, MonitorError> {
        let class = wide(CLASS_NAME);

        // SAFETY: plain Win32 calls with pointers that outlive each call
        unsafe {
            let instance = GetModuleHandleW(ptr::null());

            let wc = WNDCLASSEXW {
                cbSize: mem::size_of::<WNDCLASSEXW>() as u32,
                lpfnWndProc: Some(wnd_proc),
                hInstance: instance,
                lpszClassName: class.as_ptr(),
                ..mem::zeroed()
            };
            if RegisterClassExW(&wc) == 0 && GetLastError() != ERROR_CLASS_ALREADY_EXISTS {
                return Err(setup_failed("RegisterClassExW"));
            }

            let hwnd = CreateWindowExW(
                0,
                class.as_ptr(),
                class.as_ptr(),
                0,
                0,
                0,
                0,
                0,
                HWND_MESSAGE,
                ptr::null_mut(),
                instance,
                ptr::null(),
            );
            if hwnd.is_null() {
                let err = setup_failed("CreateWindowExW");
                UnregisterClassW(class.as_ptr(), instance);
                return Err(err);
            }

            let window = Self {
                hwnd,
                class,
                instance,
            };
            if AddClipboardFormatListener(hwnd) == 0 {
                return Err(setup_failed("AddClipboardFormatListener"));
            }
            Ok(window)
        }
    }

    /// Pump messages until the quit message arrives
    fn run_message_loop(&self) {
        // SAFETY: MSG is plain data and is only used on this thread
        unsafe {
            let mut msg: MSG = mem::zeroed();
            loop {
                let ret = GetMessageW(&mut msg, ptr::null_mut(), 0, 0);
                if ret == 0 || ret == -1 {
                    break;
                }
                TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }
}

impl Drop for MessageWindow {
    fn drop(&mut self) {
        // SAFETY: the window and class were created by this thread
        unsafe {
            if IsWindow(self.hwnd) != 0 {
                RemoveClipboardFormatListener(self.hwnd);
                DestroyWindow(self.hwnd);
            }
            UnregisterClassW(self.class.as_ptr(), self.instance);
        }
    }
}

/// Ask the worker's window to close; safe from any thread
fn post_close(hwnd: isize) {
    if hwnd == 0 {
        return;
    }
    // SAFETY: PostMessageW only queues a message; a stale handle fails cleanly
    let posted = unsafe { PostMessageW(hwnd as HWND, WM_CLOSE, 0, 0) };
    if posted == 0 {
        debug!("WM_CLOSE could not be posted to the clipboard window");
    }
}

/// Native push monitor for Windows
pub struct WindowsMonitor {
    reader: Arc<GenericReader>,
    listener: Arc<dyn ClipboardListener>,
    options: MonitorOptions,
    hwnd: Arc<AtomicIsize>,
    slot: WorkerSlot,
}

impl WindowsMonitor {
    pub fn new(listener: Arc<dyn ClipboardListener>, options: MonitorOptions) -> Self {
        Self {
            reader: Arc::new(GenericReader::new()),
            listener,
            options,
            hwnd: Arc::new(AtomicIsize::new(0)),
            slot: WorkerSlot::new("clipwatch-windows"),
        }
    }
}

impl ClipboardMonitor for WindowsMonitor {
    fn backend(&self) -> BackendKind {
        BackendKind::Windows
    }

    fn start(&mut self) -> Result<(), MonitorError> {
        if self.slot.is_started() {
            return Ok(());
        }

        let reader = Arc::clone(&self.reader);
        let mut dispatcher =
            ChangeDispatcher::new(Arc::clone(&self.listener), self.options.signature);
        let published = Arc::clone(&self.hwnd);

        self.slot.start(
            self.options.start_timeout,
            self.options.stop_timeout,
            || post_close(self.hwnd.load(Ordering::SeqCst)),
            move |gate, token| {
                dispatcher.prime(&reader.read());

                let window = match MessageWindow::create() {
                    Ok(window) => window,
                    Err(e) => {
                        gate.fail(e);
                        return;
                    }
                };

                ON_UPDATE.with(|slot| {
                    *slot.borrow_mut() = Some(Box::new(move || {
                        dispatcher.offer(reader.read());
                    }));
                });
                published.store(window.hwnd as isize, Ordering::SeqCst);
                gate.ready(DetectionStrategy::NativePush);

                if !token.is_stopped() {
                    window.run_message_loop();
                }

                published.store(0, Ordering::SeqCst);
                ON_UPDATE.with(|slot| slot.borrow_mut().take());
                drop(window);
            },
        )?;

        info!("Windows clipboard monitor started");
        Ok(())
    }

    fn stop(&mut self) -> StopOutcome {
        let outcome = self.slot.stop(self.options.stop_timeout, || {
            post_close(self.hwnd.load(Ordering::SeqCst))
        });
        match outcome {
            StopOutcome::AlreadyStopped => {}
            StopOutcome::TimedOut => {
                warn!("Windows clipboard thread did not exit; its window may leak")
            }
            StopOutcome::Stopped => info!("Windows clipboard monitor stopped"),
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

impl Drop for WindowsMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
