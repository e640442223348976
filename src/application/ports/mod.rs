//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod config;
pub mod listener;
pub mod monitor;
pub mod reader;

// Re-export common types
pub use config::ConfigStore;
pub use listener::ClipboardListener;
pub use monitor::{ClipboardMonitor, StopOutcome};
pub use reader::SnapshotReader;
