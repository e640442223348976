//! Domain layer - Core clipboard model
//!
//! Contains value objects, identifiers, and domain errors.
//! This layer has no dependencies on external systems.

pub mod clipboard;
pub mod config;
pub mod environment;
pub mod error;

// Re-export common types
pub use clipboard::{ContentSnapshot, Signature, SignatureSettings};
pub use config::{AppConfig, MonitorOptions};
pub use environment::{
    BackendKind, BackendPreference, DetectionStrategy, EnvironmentClassification, HostOs,
};
pub use error::*;
