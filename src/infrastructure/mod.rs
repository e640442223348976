//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with native clipboards, CLI tools, and the filesystem.

pub mod clipboard;
pub mod config;
pub mod factory;
pub mod probe;

// Re-export adapters
pub use clipboard::{GenericReader, PollingMonitor};
pub use config::XdgConfigStore;
pub use factory::{create_monitor, select_backend, MonitorFactory};
pub use probe::EnvironmentProbe;
