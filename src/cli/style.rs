//! Terminal styling helpers for command output

use owo_colors::OwoColorize;

/// Checkmark for success lines
pub fn check() -> String {
    "\u{2713}".to_string()
}

/// Styling extension for display strings
pub trait Stylize {
    /// Bold, for headings
    fn emphasis(&self) -> String;
    /// Cyan, for names and counts
    fn accent(&self) -> String;
    /// Dimmed, for secondary text
    fn muted(&self) -> String;
    /// Green, for success
    fn success(&self) -> String;
    /// Yellow, for warnings
    fn warn(&self) -> String;
}

impl<T: std::fmt::Display> Stylize for T {
    fn emphasis(&self) -> String {
        format!("{}", self.bold())
    }

    fn accent(&self) -> String {
        format!("{}", self.cyan())
    }

    fn muted(&self) -> String {
        format!("{}", self.dimmed())
    }

    fn success(&self) -> String {
        format!("{}", self.green())
    }

    fn warn(&self) -> String {
        format!("{}", self.yellow())
    }
}
