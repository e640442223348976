//! CLI presenter for output formatting

use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::clipboard::ContentSnapshot;

/// Longest preview printed per text field in human output
const PREVIEW_WIDTH: usize = 120;

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
        {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a key-value pair (for config list and probe)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Print one snapshot to stdout, as a JSON line or a readable block
    pub fn snapshot(&self, snapshot: &ContentSnapshot, json: bool) {
        if json {
            match serde_json::to_string(snapshot) {
                Ok(line) => println!("{}", line),
                Err(e) => self.error(&format!("Failed to encode snapshot: {}", e)),
            }
        } else {
            println!("{}", self.format_snapshot(snapshot));
        }
    }

    /// Human-readable snapshot block: a summary line plus field previews
    pub fn format_snapshot(&self, snapshot: &ContentSnapshot) -> String {
        let mut out = format!("{} {}", "●".cyan(), snapshot.summary().bold());

        let fields = [
            ("text", snapshot.text()),
            ("html", snapshot.html()),
            ("rtf", snapshot.rtf()),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                out.push_str(&format!("\n  {}: {}", name.dimmed(), preview(value)));
            }
        }
        if let Some(files) = snapshot.files() {
            for file in files {
                out.push_str(&format!("\n  {}: {}", "file".dimmed(), file));
            }
        }
        out
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-line preview, cut at `PREVIEW_WIDTH` characters
fn preview(value: &str) -> String {
    let flat: String = value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if flat.chars().count() > PREVIEW_WIDTH {
        let cut: String = flat.chars().take(PREVIEW_WIDTH).collect();
        format!("{}…", cut)
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_flattens_newlines() {
        assert_eq!(preview("a\nb\tc"), "a b c");
    }

    #[test]
    fn preview_truncates_long_text() {
        let long = "x".repeat(PREVIEW_WIDTH + 10);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_WIDTH + 1);
        assert!(p.ends_with('…'));
    }

    #[test]
    fn format_snapshot_lists_fields() {
        colored::control::set_override(false);
        let snapshot = ContentSnapshot::builder()
            .text("hello")
            .files(["/tmp/a", "/tmp/b"])
            .build();
        let out = Presenter::new().format_snapshot(&snapshot);
        assert!(out.contains("text: hello"));
        assert!(out.contains("file: /tmp/a"));
        assert!(out.contains("file: /tmp/b"));
        assert!(!out.contains("html:"));
    }
}
