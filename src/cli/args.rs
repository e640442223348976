//! CLI argument definitions using Clap

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::environment::BackendPreference;

/// clipwatch - watch the system clipboard for changes
#[derive(Parser, Debug)]
#[command(name = "clipwatch")]
#[command(version)]
#[command(about = "Print clipboard changes as they happen")]
#[command(long_about = None)]
pub struct Cli {
    /// Monitoring backend (auto picks from the OS and display server)
    #[arg(
        short = 'b',
        long,
        value_name = "BACKEND",
        env = "CLIPWATCH_BACKEND",
        global = true
    )]
    pub backend: Option<BackendArg>,

    /// Polling interval in milliseconds (polling backends only)
    #[arg(
        short = 'i',
        long,
        value_name = "MS",
        env = "CLIPWATCH_POLL_INTERVAL_MS",
        global = true
    )]
    pub interval: Option<u64>,

    /// Emit snapshots as JSON lines
    #[arg(short = 'j', long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read the clipboard once and print it
    Snapshot,
    /// Show the detected environment and the backend that would be used
    Probe,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Backend argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Auto,
    Polling,
    X11,
    Wayland,
    Windows,
}

impl From<BackendArg> for BackendPreference {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Auto => BackendPreference::Auto,
            BackendArg::Polling => BackendPreference::Polling,
            BackendArg::X11 => BackendPreference::X11,
            BackendArg::Wayland => BackendPreference::Wayland,
            BackendArg::Windows => BackendPreference::Windows,
        }
    }
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "backend",
    "poll_interval_ms",
    "stop_timeout_ms",
    "start_timeout_ms",
    "preview_chars",
    "file_preview_entries",
    "json",
    "linux.x11_fallback_interval_ms",
    "linux.tool_timeout_ms",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
