//! Application configuration value object

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::clipboard::{
    SignatureSettings, DEFAULT_FILE_PREVIEW_ENTRIES, DEFAULT_PREVIEW_CHARS,
};
use crate::domain::environment::BackendPreference;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 200;
pub const MIN_POLL_INTERVAL_MS: u64 = 50;
pub const MAX_POLL_INTERVAL_MS: u64 = 10_000;
pub const DEFAULT_X11_FALLBACK_INTERVAL_MS: u64 = 250;
pub const DEFAULT_STOP_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_START_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_TOOL_TIMEOUT_MS: u64 = 1_000;

/// Linux-specific configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinuxConfig {
    pub x11_fallback_interval_ms: Option<u64>,
    pub tool_timeout_ms: Option<u64>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub stop_timeout_ms: Option<u64>,
    pub start_timeout_ms: Option<u64>,
    pub preview_chars: Option<usize>,
    pub file_preview_entries: Option<usize>,
    pub json: Option<bool>,
    pub linux: Option<LinuxConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            backend: Some("auto".to_string()),
            poll_interval_ms: Some(DEFAULT_POLL_INTERVAL_MS),
            stop_timeout_ms: Some(DEFAULT_STOP_TIMEOUT_MS),
            start_timeout_ms: Some(DEFAULT_START_TIMEOUT_MS),
            preview_chars: Some(DEFAULT_PREVIEW_CHARS),
            file_preview_entries: Some(DEFAULT_FILE_PREVIEW_ENTRIES),
            json: Some(false),
            linux: Some(LinuxConfig {
                x11_fallback_interval_ms: Some(DEFAULT_X11_FALLBACK_INTERVAL_MS),
                tool_timeout_ms: Some(DEFAULT_TOOL_TIMEOUT_MS),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            backend: other.backend.or(self.backend),
            poll_interval_ms: other.poll_interval_ms.or(self.poll_interval_ms),
            stop_timeout_ms: other.stop_timeout_ms.or(self.stop_timeout_ms),
            start_timeout_ms: other.start_timeout_ms.or(self.start_timeout_ms),
            preview_chars: other.preview_chars.or(self.preview_chars),
            file_preview_entries: other.file_preview_entries.or(self.file_preview_entries),
            json: other.json.or(self.json),
            linux: Self::merge_linux_config(self.linux, other.linux),
        }
    }

    /// Merge Linux config sections
    fn merge_linux_config(
        base: Option<LinuxConfig>,
        other: Option<LinuxConfig>,
    ) -> Option<LinuxConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(LinuxConfig {
                x11_fallback_interval_ms: o.x11_fallback_interval_ms.or(b.x11_fallback_interval_ms),
                tool_timeout_ms: o.tool_timeout_ms.or(b.tool_timeout_ms),
            }),
        }
    }

    /// Get backend preference, or Auto if not set/invalid
    pub fn backend_or_default(&self) -> BackendPreference {
        self.backend
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Get poll interval, clamped to the supported range
    pub fn poll_interval_or_default(&self) -> Duration {
        let ms = self
            .poll_interval_ms
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS)
            .clamp(MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS);
        Duration::from_millis(ms)
    }

    pub fn stop_timeout_or_default(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms.unwrap_or(DEFAULT_STOP_TIMEOUT_MS))
    }

    pub fn start_timeout_or_default(&self) -> Duration {
        Duration::from_millis(self.start_timeout_ms.unwrap_or(DEFAULT_START_TIMEOUT_MS))
    }

    /// Get signature settings; zero values fall back to defaults
    pub fn signature_settings_or_default(&self) -> SignatureSettings {
        SignatureSettings {
            preview_chars: self
                .preview_chars
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_PREVIEW_CHARS),
            file_preview_entries: self
                .file_preview_entries
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_FILE_PREVIEW_ENTRIES),
        }
    }

    /// Get json output setting, or false if not set
    pub fn json_or_default(&self) -> bool {
        self.json.unwrap_or(false)
    }

    /// Get the X11 fallback polling interval
    pub fn x11_fallback_interval_or_default(&self) -> Duration {
        let ms = self
            .linux
            .as_ref()
            .and_then(|l| l.x11_fallback_interval_ms)
            .unwrap_or(DEFAULT_X11_FALLBACK_INTERVAL_MS)
            .clamp(MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS);
        Duration::from_millis(ms)
    }

    /// Get the per-invocation timeout for clipboard CLI tools
    pub fn tool_timeout_or_default(&self) -> Duration {
        Duration::from_millis(
            self.linux
                .as_ref()
                .and_then(|l| l.tool_timeout_ms)
                .unwrap_or(DEFAULT_TOOL_TIMEOUT_MS),
        )
    }

    /// Resolve into the typed options consumed by the monitor factory
    pub fn monitor_options(&self) -> MonitorOptions {
        MonitorOptions {
            backend: self.backend_or_default(),
            poll_interval: self.poll_interval_or_default(),
            x11_fallback_interval: self.x11_fallback_interval_or_default(),
            stop_timeout: self.stop_timeout_or_default(),
            start_timeout: self.start_timeout_or_default(),
            tool_timeout: self.tool_timeout_or_default(),
            signature: self.signature_settings_or_default(),
        }
    }
}

/// Fully resolved monitor settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorOptions {
    pub backend: BackendPreference,
    pub poll_interval: Duration,
    pub x11_fallback_interval: Duration,
    pub stop_timeout: Duration,
    pub start_timeout: Duration,
    pub tool_timeout: Duration,
    pub signature: SignatureSettings,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        AppConfig::defaults().monitor_options()
    }
}
