//! Monitor factory with automatic backend selection

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::ports::{ClipboardListener, ClipboardMonitor};
use crate::domain::config::MonitorOptions;
use crate::domain::environment::{BackendKind, BackendPreference, EnvironmentClassification, HostOs};
use crate::domain::error::MonitorError;

use super::clipboard::PollingMonitor;
#[cfg(windows)]
use super::clipboard::WindowsMonitor;
#[cfg(target_os = "linux")]
use super::clipboard::X11Monitor;
use super::probe::EnvironmentProbe;

/// Pick a backend for `os` and `preference`.
///
/// `classify` is consulted only for `Auto` on Linux, so the X11 probe
/// connection is opened at most once and only when it matters.
///
/// - Windows → native message-loop backend
/// - macOS → generic polling
/// - Linux → X11 events, Wayland polling, or generic polling by session
/// - anything else → [`MonitorError::UnsupportedPlatform`]
pub fn select_backend<F>(
    os: HostOs,
    preference: BackendPreference,
    classify: F,
) -> Result<BackendKind, MonitorError>
where
    F: FnOnce() -> EnvironmentClassification,
{
    if let HostOs::Other(name) = os {
        return Err(MonitorError::UnsupportedPlatform(name.to_string()));
    }

    match preference {
        BackendPreference::Auto => Ok(match os {
            HostOs::Windows => BackendKind::Windows,
            HostOs::Linux => match classify() {
                EnvironmentClassification::X11 => BackendKind::X11,
                EnvironmentClassification::Wayland => BackendKind::Wayland,
                EnvironmentClassification::NativeWin32 | EnvironmentClassification::Generic => {
                    BackendKind::Polling
                }
            },
            HostOs::MacOs | HostOs::Other(_) => BackendKind::Polling,
        }),
        BackendPreference::Polling => Ok(BackendKind::Polling),
        BackendPreference::X11 if os == HostOs::Linux => Ok(BackendKind::X11),
        BackendPreference::Wayland if os == HostOs::Linux => Ok(BackendKind::Wayland),
        BackendPreference::Windows if os == HostOs::Windows => Ok(BackendKind::Windows),
        BackendPreference::X11 => Err(MonitorError::BackendUnavailable(BackendKind::X11)),
        BackendPreference::Wayland => Err(MonitorError::BackendUnavailable(BackendKind::Wayland)),
        BackendPreference::Windows => Err(MonitorError::BackendUnavailable(BackendKind::Windows)),
    }
}

/// Creates exactly one monitor for the current process
pub struct MonitorFactory {
    options: MonitorOptions,
    os: HostOs,
}

impl MonitorFactory {
    pub fn new(options: MonitorOptions) -> Self {
        Self {
            options,
            os: HostOs::current(),
        }
    }

    pub fn options(&self) -> &MonitorOptions {
        &self.options
    }

    /// Backend that `create` would instantiate
    pub fn select(&self) -> Result<BackendKind, MonitorError> {
        select_backend(self.os, self.options.backend, || {
            let classification = EnvironmentProbe::system().classify();
            debug!(%classification, "environment classified");
            classification
        })
    }

    /// Select a backend and build it around `listener`.
    ///
    /// Fails here rather than at `start()` when the platform or the
    /// requested backend is unsupported.
    pub fn create(
        &self,
        listener: Arc<dyn ClipboardListener>,
    ) -> Result<Box<dyn ClipboardMonitor>, MonitorError> {
        let kind = self.select()?;
        info!(backend = %kind, preference = %self.options.backend, "backend selected");
        instantiate(kind, listener, self.options)
    }
}

impl Default for MonitorFactory {
    fn default() -> Self {
        Self::new(MonitorOptions::default())
    }
}

fn instantiate(
    kind: BackendKind,
    listener: Arc<dyn ClipboardListener>,
    options: MonitorOptions,
) -> Result<Box<dyn ClipboardMonitor>, MonitorError> {
    match kind {
        BackendKind::Polling => Ok(Box::new(PollingMonitor::generic(listener, options))),
        BackendKind::Wayland => Ok(Box::new(PollingMonitor::wayland(listener, options))),
        #[cfg(target_os = "linux")]
        BackendKind::X11 => Ok(Box::new(X11Monitor::new(listener, options))),
        #[cfg(windows)]
        BackendKind::Windows => Ok(Box::new(WindowsMonitor::new(listener, options))),
        #[allow(unreachable_patterns)]
        other => Err(MonitorError::BackendUnavailable(other)),
    }
}

/// Create a monitor with the given options
pub fn create_monitor(
    listener: Arc<dyn ClipboardListener>,
    options: MonitorOptions,
) -> Result<Box<dyn ClipboardMonitor>, MonitorError> {
    MonitorFactory::new(options).create(listener)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clipboard::ContentSnapshot;

    fn never() -> EnvironmentClassification {
        panic!("classification should not be consulted")
    }

    #[test]
    fn auto_selection_table() {
        let auto = BackendPreference::Auto;
        assert_eq!(
            select_backend(HostOs::Windows, auto, never).unwrap(),
            BackendKind::Windows
        );
        assert_eq!(
            select_backend(HostOs::MacOs, auto, never).unwrap(),
            BackendKind::Polling
        );
        assert_eq!(
            select_backend(HostOs::Linux, auto, || EnvironmentClassification::X11).unwrap(),
            BackendKind::X11
        );
        assert_eq!(
            select_backend(HostOs::Linux, auto, || EnvironmentClassification::Wayland).unwrap(),
            BackendKind::Wayland
        );
        assert_eq!(
            select_backend(HostOs::Linux, auto, || EnvironmentClassification::Generic).unwrap(),
            BackendKind::Polling
        );
    }

    #[test]
    fn unsupported_platform_fails_for_any_preference() {
        for preference in [BackendPreference::Auto, BackendPreference::Polling] {
            let err = select_backend(HostOs::Other("haiku"), preference, never).unwrap_err();
            assert!(matches!(err, MonitorError::UnsupportedPlatform(ref os) if os == "haiku"));
        }
    }

    #[test]
    fn explicit_preference_must_match_host() {
        assert_eq!(
            select_backend(HostOs::Linux, BackendPreference::X11, never).unwrap(),
            BackendKind::X11
        );
        assert_eq!(
            select_backend(HostOs::MacOs, BackendPreference::Polling, never).unwrap(),
            BackendKind::Polling
        );
        assert!(matches!(
            select_backend(HostOs::MacOs, BackendPreference::Wayland, never),
            Err(MonitorError::BackendUnavailable(BackendKind::Wayland))
        ));
        assert!(matches!(
            select_backend(HostOs::Linux, BackendPreference::Windows, never),
            Err(MonitorError::BackendUnavailable(BackendKind::Windows))
        ));
    }

    #[test]
    fn explicit_polling_builds_polling_monitor() {
        let options = MonitorOptions {
            backend: BackendPreference::Polling,
            ..MonitorOptions::default()
        };
        let listener: Arc<dyn ClipboardListener> = Arc::new(|_: ContentSnapshot| {});
        let monitor = create_monitor(listener, options).unwrap();
        assert_eq!(monitor.backend(), BackendKind::Polling);
        assert!(!monitor.is_running());
        assert_eq!(monitor.strategy(), None);
    }
}
