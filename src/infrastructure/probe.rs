//! Runtime environment classification
//!
//! Decides which display server the process is talking to. Wayland signals
//! are checked before `DISPLAY` because XWayland exports an X11 display
//! variable inside Wayland sessions.

use std::env;

use tracing::debug;

use crate::domain::environment::{EnvironmentClassification, HostOs};

type VarLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;
type DisplayProbe = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Classifies the runtime environment from environment variables and a
/// throwaway X11 connection
pub struct EnvironmentProbe {
    var: VarLookup,
    display_reachable: DisplayProbe,
}

impl EnvironmentProbe {
    /// Probe backed by the process environment and a real X11 connection
    pub fn system() -> Self {
        Self::new(
            |name| env::var(name).ok().filter(|v| !v.trim().is_empty()),
            open_display,
        )
    }

    /// Probe with custom variable lookup and display check
    pub fn new<V, D>(var: V, display_reachable: D) -> Self
    where
        V: Fn(&str) -> Option<String> + Send + Sync + 'static,
        D: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            var: Box::new(var),
            display_reachable: Box::new(display_reachable),
        }
    }

    /// Classify a Linux-class session.
    ///
    /// Never fails: an unreachable display maps to `Generic`.
    pub fn classify(&self) -> EnvironmentClassification {
        if self.var("WAYLAND_DISPLAY").is_some() {
            return EnvironmentClassification::Wayland;
        }

        if let Some(session) = self.var("XDG_SESSION_TYPE") {
            match session.trim().to_lowercase().as_str() {
                "wayland" => return EnvironmentClassification::Wayland,
                "x11" => return EnvironmentClassification::X11,
                _ => {}
            }
        }

        if let Some(display_name) = self.var("DISPLAY") {
            if (self.display_reachable)(&display_name) {
                return EnvironmentClassification::X11;
            }
            debug!(display = %display_name, "X11 display not reachable");
        }

        EnvironmentClassification::Generic
    }

    /// Classify for a given host OS; only Linux consults the session
    pub fn classify_for(&self, os: HostOs) -> EnvironmentClassification {
        match os {
            HostOs::Windows => EnvironmentClassification::NativeWin32,
            HostOs::Linux => self.classify(),
            HostOs::MacOs | HostOs::Other(_) => EnvironmentClassification::Generic,
        }
    }

    fn var(&self, name: &str) -> Option<String> {
        (self.var)(name)
    }
}

impl Default for EnvironmentProbe {
    fn default() -> Self {
        Self::system()
    }
}

/// Open and immediately close an X11 connection to `display`
#[cfg(target_os = "linux")]
fn open_display(display: &str) -> bool {
    x11rb::connect(Some(display)).is_ok()
}

#[cfg(not(target_os = "linux"))]
fn open_display(_display: &str) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn probe(vars: &[(&str, &str)], reachable: bool) -> EnvironmentProbe {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvironmentProbe::new(move |name| vars.get(name).cloned(), move |_| reachable)
    }

    #[test]
    fn wayland_display_wins_over_x_display() {
        let p = probe(&[("WAYLAND_DISPLAY", "wayland-0"), ("DISPLAY", ":0")], true);
        assert_eq!(p.classify(), EnvironmentClassification::Wayland);
    }

    #[test]
    fn session_type_is_honored() {
        let p = probe(&[("XDG_SESSION_TYPE", "Wayland")], false);
        assert_eq!(p.classify(), EnvironmentClassification::Wayland);
        let p = probe(&[("XDG_SESSION_TYPE", "x11")], false);
        assert_eq!(p.classify(), EnvironmentClassification::X11);
    }

    #[test]
    fn reachable_display_is_x11() {
        let p = probe(&[("XDG_SESSION_TYPE", "tty"), ("DISPLAY", ":0")], true);
        assert_eq!(p.classify(), EnvironmentClassification::X11);
    }

    #[test]
    fn unreachable_display_is_generic() {
        let p = probe(&[("DISPLAY", ":9")], false);
        assert_eq!(p.classify(), EnvironmentClassification::Generic);
    }

    #[test]
    fn no_signals_is_generic() {
        assert_eq!(probe(&[], true).classify(), EnvironmentClassification::Generic);
    }

    #[test]
    fn classify_for_other_hosts() {
        let p = probe(&[("WAYLAND_DISPLAY", "wayland-0")], true);
        assert_eq!(
            p.classify_for(HostOs::Windows),
            EnvironmentClassification::NativeWin32
        );
        assert_eq!(
            p.classify_for(HostOs::MacOs),
            EnvironmentClassification::Generic
        );
        assert_eq!(
            p.classify_for(HostOs::Linux),
            EnvironmentClassification::Wayland
        );
    }
}
