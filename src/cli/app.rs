//! Command runners: watch, snapshot, probe

use std::process::ExitCode;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::application::ports::{ClipboardListener, ClipboardMonitor, ConfigStore, StopOutcome};
use crate::domain::clipboard::ContentSnapshot;
use crate::domain::config::{AppConfig, MonitorOptions};
use crate::domain::environment::{BackendKind, BackendPreference, EnvironmentClassification, HostOs};
use crate::domain::error::MonitorError;
use crate::infrastructure::clipboard::{detect_clipboard_tools, ToolRunner};
use crate::infrastructure::{select_backend, EnvironmentProbe, MonitorFactory, XdgConfigStore};

use super::presenter::Presenter;
use super::signals::ShutdownSignal;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `-v` raises the level from warn.
pub fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("clipwatch={}", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Load and merge configuration from file and CLI.
///
/// Environment overrides arrive through clap's `env` attributes, so
/// `cli_config` already carries them: defaults < file < env < cli.
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load_or_empty().await;

    AppConfig::defaults().merge(file_config).merge(cli_config)
}

fn channel_listener() -> (Arc<dyn ClipboardListener>, mpsc::UnboundedReceiver<ContentSnapshot>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let listener = move |snapshot: ContentSnapshot| {
        let _ = tx.send(snapshot);
    };
    (Arc::new(listener), rx)
}

/// Watch the clipboard until SIGINT/SIGTERM, printing every change
pub async fn run_watch(options: MonitorOptions, json: bool) -> ExitCode {
    let mut presenter = Presenter::new();

    let mut shutdown = match ShutdownSignal::listen() {
        Ok(s) => s,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let (listener, mut changes) = channel_listener();
    let mut monitor = match MonitorFactory::new(options).create(listener) {
        Ok(m) => m,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    presenter.start_spinner(&format!("Starting {} monitor...", monitor.backend()));
    let started = task::spawn_blocking(move || {
        let result = monitor.start();
        (monitor, result)
    })
    .await;

    let mut monitor = match started {
        Ok((monitor, Ok(()))) => monitor,
        Ok((_, Err(e))) => {
            presenter.spinner_fail(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
        Err(e) => {
            presenter.spinner_fail(&format!("Monitor start task failed: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let strategy = monitor
        .strategy()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "stopped".to_string());
    presenter.spinner_success(&format!(
        "Watching clipboard ({} backend, {})",
        monitor.backend(),
        strategy
    ));

    let mut delivered = 0u64;
    loop {
        tokio::select! {
            reason = shutdown.recv() => {
                if let Some(reason) = reason {
                    debug!(%reason, "shutdown requested");
                }
                break;
            }
            Some(snapshot) = changes.recv() => {
                delivered += 1;
                presenter.snapshot(&snapshot, json);
            }
        }
    }

    let stopped = task::spawn_blocking(move || monitor.stop()).await;

    while let Ok(snapshot) = changes.try_recv() {
        delivered += 1;
        presenter.snapshot(&snapshot, json);
    }

    match stopped {
        Ok(StopOutcome::Stopped) | Ok(StopOutcome::AlreadyStopped) => {
            presenter.success(&format!("Monitor stopped ({} change(s))", delivered));
            ExitCode::from(EXIT_SUCCESS)
        }
        Ok(StopOutcome::TimedOut) => {
            presenter.warn("Monitor thread did not exit in time; native resources may leak");
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&format!("Monitor stop task failed: {}", e));
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Read the clipboard once through the selected backend
pub async fn run_snapshot(options: MonitorOptions, json: bool) -> ExitCode {
    let presenter = Presenter::new();
    let listener: Arc<dyn ClipboardListener> = Arc::new(|_: ContentSnapshot| {});

    let monitor = match MonitorFactory::new(options).create(listener) {
        Ok(m) => m,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match task::spawn_blocking(move || monitor.current_snapshot()).await {
        Ok(snapshot) => {
            presenter.snapshot(&snapshot, json);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&format!("Clipboard read failed: {}", e));
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Classify the session once and select a backend from that same answer
fn probe_backend(
    os: HostOs,
    probe: &EnvironmentProbe,
    preference: BackendPreference,
) -> (EnvironmentClassification, Result<BackendKind, MonitorError>) {
    let classification = probe.classify_for(os);
    (classification, select_backend(os, preference, || classification))
}

/// Report the detected environment and the backend that would be used
pub async fn run_probe(options: MonitorOptions, json: bool) -> ExitCode {
    let presenter = Presenter::new();

    let report = task::spawn_blocking(move || {
        let os = HostOs::current();
        let (classification, backend) =
            probe_backend(os, &EnvironmentProbe::system(), options.backend);
        let tools = detect_clipboard_tools(&ToolRunner::new(options.tool_timeout));
        (os, classification, backend, tools)
    })
    .await;

    let (os, classification, backend, tools) = match report {
        Ok(report) => report,
        Err(e) => {
            presenter.error(&format!("Probe failed: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if json {
        let value = serde_json::json!({
            "os": os.to_string(),
            "environment": classification,
            "preference": options.backend.to_string(),
            "backend": backend.as_ref().ok(),
            "error": backend.as_ref().err().map(|e| e.to_string()),
            "tools": tools,
        });
        presenter.output(&value.to_string());
    } else {
        presenter.key_value("os", &os.to_string());
        presenter.key_value("environment", &classification.to_string());
        presenter.key_value("preference", &options.backend.to_string());
        match &backend {
            Ok(kind) => presenter.key_value("backend", &kind.to_string()),
            Err(e) => presenter.key_value("backend", &format!("unavailable ({})", e)),
        }
        let tools = if tools.is_empty() {
            "(none)".to_string()
        } else {
            tools.join(", ")
        };
        presenter.key_value("tools", &tools);
    }

    if backend.is_ok() {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}
