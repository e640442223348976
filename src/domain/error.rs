//! Domain error types

use thiserror::Error;

use super::environment::BackendKind;

/// Errors raised while creating or starting a clipboard monitor
#[derive(Debug, Clone, Error)]
pub enum MonitorError {
    #[error("Clipboard monitoring is not supported on this platform ({0})")]
    UnsupportedPlatform(String),

    #[error("The {0} backend is not available in this build or environment")]
    BackendUnavailable(BackendKind),

    #[error("Failed to set up the {backend} backend: {message}")]
    SetupFailed {
        backend: BackendKind,
        message: String,
    },

    #[error("Monitor did not become ready within {0} ms")]
    StartTimeout(u64),

    #[error("Failed to spawn monitor thread: {0}")]
    ThreadSpawn(String),

    #[error("Monitor thread exited before it became ready")]
    WorkerExited,

    #[error("A previous monitor thread has not exited yet")]
    StillStopping,
}

/// Errors from a single clipboard read attempt.
///
/// These never leave a backend; they only decide which representations
/// end up absent from a snapshot.
#[derive(Debug, Clone, Error)]
pub enum ReadError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to read {flavor} from clipboard: {message}")]
    Flavor {
        flavor: &'static str,
        message: String,
    },

    #[error("{0} not found")]
    ToolNotFound(String),

    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },

    #[error("{0} did not finish in time")]
    ToolTimeout(String),
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitor_error_messages() {
        let err = MonitorError::UnsupportedPlatform("haiku".to_string());
        assert!(err.to_string().contains("haiku"));

        let err = MonitorError::SetupFailed {
            backend: BackendKind::Windows,
            message: "RegisterClassExW failed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to set up the windows backend: RegisterClassExW failed"
        );
    }

    #[test]
    fn read_error_messages() {
        let err = ReadError::Flavor {
            flavor: "html",
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to read html from clipboard: boom");
        assert_eq!(
            ReadError::ToolTimeout("wl-paste".to_string()).to_string(),
            "wl-paste did not finish in time"
        );
    }
}
