use console::style;
use std::fmt::Display;

/// Console output helper for command results
pub struct OutputWriter;

impl OutputWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: impl Display) {
        println!("{} {}", style("✓").green().bold(), message);
    }

    pub fn info(&self, message: impl Display) {
        println!("{} {}", style("ℹ").blue().bold(), message);
    }

    pub fn key_value(&self, key: impl Display, value: impl Display, annotation: impl Display) {
        println!(
            "  {:<14} {} {}",
            style(key).bold(),
            value,
            style(annotation).dim()
        );
    }
}
