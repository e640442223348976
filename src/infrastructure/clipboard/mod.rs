//! Clipboard monitoring backends
//!
//! One backend per OS/display-server mechanism, all sharing the generic
//! read primitive and the worker-thread lifecycle.

pub mod generic;
pub mod polling;
pub mod tools;
pub mod wayland;
pub mod worker;
#[cfg(windows)]
pub mod windows;
#[cfg(target_os = "linux")]
pub mod x11;

pub use generic::GenericReader;
pub use polling::PollingMonitor;
pub use tools::{detect_clipboard_tools, CommandRunner, ToolRunner};
pub use wayland::WaylandReader;
#[cfg(windows)]
pub use windows::WindowsMonitor;
#[cfg(target_os = "linux")]
pub use x11::{X11Monitor, X11Reader};
