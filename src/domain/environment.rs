//! Runtime environment and backend identifiers

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Display-server classification, computed once when a monitor is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentClassification {
    NativeWin32,
    X11,
    Wayland,
    Generic,
}

impl fmt::Display for EnvironmentClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NativeWin32 => write!(f, "win32"),
            Self::X11 => write!(f, "x11"),
            Self::Wayland => write!(f, "wayland"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

/// Host operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Windows,
    MacOs,
    Linux,
    Other(&'static str),
}

impl HostOs {
    /// The OS this binary was compiled for
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value to a host family
    pub fn from_os_name(name: &'static str) -> Self {
        match name {
            "windows" => Self::Windows,
            "macos" => Self::MacOs,
            "linux" => Self::Linux,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => write!(f, "windows"),
            Self::MacOs => write!(f, "macos"),
            Self::Linux => write!(f, "linux"),
            Self::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Concrete monitor implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Win32 clipboard format listener on a message-only window
    Windows,
    /// XFixes selection-owner notifications
    X11,
    /// wl-paste polling
    Wayland,
    /// Cross-platform polling through the generic read primitive
    Polling,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => write!(f, "windows"),
            Self::X11 => write!(f, "x11"),
            Self::Wayland => write!(f, "wayland"),
            Self::Polling => write!(f, "polling"),
        }
    }
}

/// How a running monitor is actually detecting changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionStrategy {
    /// The OS notifies the monitor on every change
    NativePush,
    /// The monitor re-reads the clipboard on an interval
    Polling,
}

impl fmt::Display for DetectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NativePush => write!(f, "native push"),
            Self::Polling => write!(f, "polling"),
        }
    }
}

/// User preference for backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendPreference {
    /// Pick from the host OS and display server (default)
    #[default]
    Auto,
    Polling,
    X11,
    Wayland,
    Windows,
}

impl fmt::Display for BackendPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Polling => write!(f, "polling"),
            Self::X11 => write!(f, "x11"),
            Self::Wayland => write!(f, "wayland"),
            Self::Windows => write!(f, "windows"),
        }
    }
}

/// Valid backend preference values
pub const VALID_BACKENDS: &[&str] = &["auto", "polling", "x11", "wayland", "windows"];

/// Error type for parsing a backend preference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBackendError {
    pub value: String,
}

impl fmt::Display for ParseBackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid backend '{}'. Valid options: {}",
            self.value,
            VALID_BACKENDS.join(", ")
        )
    }
}

impl std::error::Error for ParseBackendError {}

impl FromStr for BackendPreference {
    type Err = ParseBackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "polling" | "generic" => Ok(Self::Polling),
            "x11" => Ok(Self::X11),
            "wayland" => Ok(Self::Wayland),
            "windows" | "win32" => Ok(Self::Windows),
            _ => Err(ParseBackendError {
                value: s.to_string(),
            }),
        }
    }
}
