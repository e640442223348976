//! Clipboard command-line tools (wl-paste, xclip, xsel)
//!
//! Runs a tool synchronously from a monitor thread with a hard timeout,
//! so a hung selection owner cannot wedge the worker.

use std::io::{ErrorKind, Read};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::{debug, trace};

use crate::domain::error::ReadError;

/// Clipboard tools probed at startup
pub const CLIPBOARD_TOOLS: [&str; 3] = ["wl-paste", "xclip", "xsel"];

/// Seam between the tool-backed readers and the processes they spawn
pub trait CommandRunner: Send + Sync {
    fn is_available(&self, tool: &str) -> bool;

    /// Run `tool` and return its stdout
    fn run(&self, tool: &str, args: &[&str]) -> Result<String, ReadError>;
}

/// Runs clipboard tools with a per-invocation timeout
#[derive(Debug, Clone, Copy)]
pub struct ToolRunner {
    timeout: Duration,
}

impl ToolRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Check if a tool binary is available using `which`
    pub fn is_available(&self, tool: &str) -> bool {
        Command::new("which")
            .arg(tool)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Run `tool` with `args` and return its stdout as text.
    ///
    /// The child is killed if it outlives the timeout.
    pub fn run(&self, tool: &str, args: &[&str]) -> Result<String, ReadError> {
        trace!(tool, ?args, "running clipboard tool");

        let mut child = Command::new(tool)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    ReadError::ToolNotFound(tool.to_string())
                } else {
                    ReadError::Tool {
                        tool: tool.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        let Some(mut stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ReadError::Tool {
                tool: tool.to_string(),
                message: "stdout was not captured".to_string(),
            });
        };

        // Read on a helper thread so the wait below can time out
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let result = stdout.read_to_end(&mut buf).map(|_| buf);
            let _ = tx.send(result);
        });

        let output = match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(_) => {
                let _ = child.kill();
                let _ = child.wait();
                debug!(tool, timeout_ms = self.timeout.as_millis() as u64, "clipboard tool timed out");
                return Err(ReadError::ToolTimeout(tool.to_string()));
            }
        };

        let status = child.wait().map_err(|e| ReadError::Tool {
            tool: tool.to_string(),
            message: e.to_string(),
        })?;
        let bytes = output.map_err(|e| ReadError::Tool {
            tool: tool.to_string(),
            message: e.to_string(),
        })?;

        if !status.success() {
            return Err(ReadError::Tool {
                tool: tool.to_string(),
                message: format!("exited with status: {}", status),
            });
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl CommandRunner for ToolRunner {
    fn is_available(&self, tool: &str) -> bool {
        ToolRunner::is_available(self, tool)
    }

    fn run(&self, tool: &str, args: &[&str]) -> Result<String, ReadError> {
        ToolRunner::run(self, tool, args)
    }
}

/// List which clipboard tools are installed
pub fn detect_clipboard_tools(runner: &dyn CommandRunner) -> Vec<&'static str> {
    CLIPBOARD_TOOLS
        .iter()
        .copied()
        .filter(|tool| runner.is_available(tool))
        .collect()
}


#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn runner() -> ToolRunner {
        ToolRunner::new(Duration::from_secs(2))
    }

    #[test]
    fn run_captures_stdout() {
        let out = runner().run("echo", &["hello"]).unwrap();
        assert_eq!(out.trim_end(), "hello");
    }

    #[test]
    fn missing_tool_is_reported() {
        let err = runner()
            .run("clipwatch-no-such-tool", &[])
            .unwrap_err();
        assert!(matches!(err, ReadError::ToolNotFound(_)));
    }

    #[test]
    fn failing_tool_is_an_error() {
        let err = runner().run("false", &[]).unwrap_err();
        assert!(matches!(err, ReadError::Tool { .. }));
    }

    #[test]
    fn slow_tool_is_killed() {
        let quick = ToolRunner::new(Duration::from_millis(100));
        let err = quick.run("sleep", &["5"]).unwrap_err();
        assert!(matches!(err, ReadError::ToolTimeout(_)));
    }

    #[test]
    fn missing_tool_is_not_available() {
        assert!(!runner().is_available("clipwatch-no-such-tool"));
    }

    #[test]
    fn detect_lists_only_installed_tools() {
        let tools = scripted::ScriptedTools::installed(&["xsel"]);
        assert_eq!(detect_clipboard_tools(&tools), vec!["xsel"]);
    }
}
