//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::{
    AppConfig, LinuxConfig, MAX_POLL_INTERVAL_MS, MIN_POLL_INTERVAL_MS,
};
use crate::domain::environment::BackendPreference;
use crate::domain::error::ConfigError;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    ensure_valid_key(key)?;

    let mut config = store.load().await?;
    set_value(&mut config, key, value)?;
    store.save(&config).await?;

    presenter.success(&format!(
        "{} = {}",
        key,
        get_value(&config, key).unwrap_or_else(|| value.to_string())
    ));
    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    ensure_valid_key(key)?;

    let config = store.load().await?;
    match get_value(&config, key) {
        Some(v) => presenter.output(&v),
        None => presenter.output(NOT_SET),
    }
    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;
    for key in VALID_CONFIG_KEYS {
        presenter.key_value(
            key,
            &get_value(&config, key).unwrap_or_else(|| NOT_SET.to_string()),
        );
    }
    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn ensure_valid_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
        })
    }
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        key: key.to_string(),
        message: message.into(),
    }
}

/// Read a config value as display text
fn get_value(config: &AppConfig, key: &str) -> Option<String> {
    let linux = config.linux.as_ref();
    match key {
        "backend" => config.backend.clone(),
        "poll_interval_ms" => config.poll_interval_ms.map(|v| v.to_string()),
        "stop_timeout_ms" => config.stop_timeout_ms.map(|v| v.to_string()),
        "start_timeout_ms" => config.start_timeout_ms.map(|v| v.to_string()),
        "preview_chars" => config.preview_chars.map(|v| v.to_string()),
        "file_preview_entries" => config.file_preview_entries.map(|v| v.to_string()),
        "json" => config.json.map(|b| b.to_string()),
        "linux.x11_fallback_interval_ms" => linux
            .and_then(|l| l.x11_fallback_interval_ms)
            .map(|v| v.to_string()),
        "linux.tool_timeout_ms" => linux.and_then(|l| l.tool_timeout_ms).map(|v| v.to_string()),
        _ => None,
    }
}

/// Validate `value` for `key` and store it in `config`
fn set_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "backend" => {
            let backend = value
                .parse::<BackendPreference>()
                .map_err(|e| invalid(key, e.to_string()))?;
            config.backend = Some(backend.to_string());
        }
        "poll_interval_ms" => {
            let ms = parse_millis(key, value)?;
            if !(MIN_POLL_INTERVAL_MS..=MAX_POLL_INTERVAL_MS).contains(&ms) {
                return Err(invalid(
                    key,
                    format!(
                        "Value must be between {} and {}",
                        MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS
                    ),
                ));
            }
            config.poll_interval_ms = Some(ms);
        }
        "stop_timeout_ms" => config.stop_timeout_ms = Some(parse_millis(key, value)?),
        "start_timeout_ms" => config.start_timeout_ms = Some(parse_millis(key, value)?),
        "preview_chars" => config.preview_chars = Some(parse_count(key, value)?),
        "file_preview_entries" => config.file_preview_entries = Some(parse_count(key, value)?),
        "json" => {
            config.json = Some(
                parse_bool(value).map_err(|_| invalid(key, "Value must be 'true' or 'false'"))?,
            )
        }
        "linux.x11_fallback_interval_ms" => {
            let ms = parse_millis(key, value)?;
            config
                .linux
                .get_or_insert_with(LinuxConfig::default)
                .x11_fallback_interval_ms = Some(ms);
        }
        "linux.tool_timeout_ms" => {
            let ms = parse_millis(key, value)?;
            config
                .linux
                .get_or_insert_with(LinuxConfig::default)
                .tool_timeout_ms = Some(ms);
        }
        _ => return Err(invalid(key, "Unknown key")),
    }
    Ok(())
}

/// Parse a positive millisecond value
fn parse_millis(key: &str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(ms),
        _ => Err(invalid(key, "Value must be a positive number of milliseconds")),
    }
}

fn parse_count(key: &str, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid(key, "Value must be a positive integer")),
    }
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ()> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(()),
    }
}
