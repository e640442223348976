//! clipwatch - cross-platform clipboard change monitoring
//!
//! Detects clipboard changes through the best mechanism the host offers
//! (Win32 clipboard format listener, X11 XFixes selection events, wl-paste
//! polling, or generic polling), normalizes every read into a
//! [`ContentSnapshot`](domain::ContentSnapshot), and delivers de-duplicated
//! change notifications to a single listener.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Snapshots, signatures, environment identifiers, config, errors
//! - **Application**: Port interfaces (traits) and the change dispatcher
//! - **Infrastructure**: Backends, read primitives, probe, factory, config store
//! - **CLI**: Command-line interface, argument parsing, and signal handling
//!
//! ```no_run
//! use std::sync::Arc;
//! use clipwatch::application::ports::ClipboardMonitor;
//! use clipwatch::domain::{ContentSnapshot, MonitorOptions};
//! use clipwatch::infrastructure::create_monitor;
//!
//! let listener = Arc::new(|snapshot: ContentSnapshot| println!("{}", snapshot.summary()));
//! let mut monitor = create_monitor(listener, MonitorOptions::default()).unwrap();
//! monitor.start().unwrap();
//! // ...
//! monitor.stop();
//! ```

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
