//! Terminal styling for command output
//!
//! Status lines go to stderr so stdout only ever carries rendered
//! changelogs, listings or JSON.

use std::fmt::Display;
use std::path::Path;

use console::{style, StyledObject};

/// Width of the label column in [`field`] lines
const LABEL_WIDTH: usize = 15;

/// Report a completed action
pub fn success(message: impl Display) {
    eprintln!("{} {}", style("✓").green().bold(), message);
}

/// Report a failed command
pub fn error(message: impl Display) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Report something the user should look at
pub fn warning(message: impl Display) {
    eprintln!("{} {}", style("!").yellow().bold(), message);
}

/// Bold heading line
pub fn heading(text: &str) -> StyledObject<&str> {
    style(text).bold()
}

/// Indented `label: value` line with aligned values
pub fn field(label: &str, value: impl Display) -> String {
    format!(
        "  {} {}",
        style(format!("{:<width$}", format!("{label}:"), width = LABEL_WIDTH)).dim(),
        value
    )
}

/// Release version, padded to `width`
pub fn version(version: &str, width: usize) -> StyledObject<String> {
    style(format!("{version:<width$}")).green().bold()
}

/// Resolved link target
pub fn link(url: &str) -> StyledObject<&str> {
    style(url).underlined()
}

/// File system path
pub fn path(path: &Path) -> StyledObject<String> {
    style(path.display().to_string()).cyan()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_aligns_values() {
        console::set_colors_enabled(false);
        assert_eq!(field("Entries", 3), "  Entries:        3");
        assert_eq!(field("Substitutions", 0), "  Substitutions:  0");
    }

    #[test]
    fn test_version_is_padded() {
        console::set_colors_enabled(false);
        assert_eq!(version("1.0", 6).to_string(), "1.0   ");
    }
}
