//! Centralized color theming for consistent CLI output.
//!
//! Child output prefixes, the batch summary and the `list` table all take
//! their colors from here.
//!
//! # NO_COLOR Support
//!
//! Colors can be disabled globally via:
//! - The `--no-color` CLI flag
//! - The `NO_COLOR` environment variable
//!
//! When colors are disabled, all theming functions return unstyled output.
//! Colors are also left out when the target stream is not a terminal.

use owo_colors::{AnsiColors, OwoColorize, Stream, Style};
use std::sync::atomic::{AtomicBool, Ordering};

/// Global color enable flag (respects NO_COLOR and --no-color).
static COLORS_ENABLED: AtomicBool = AtomicBool::new(true);

/// Disable all colors globally.
///
/// Call this early in main() when --no-color is set.
pub fn disable_colors() {
    COLORS_ENABLED.store(false, Ordering::Relaxed);
    owo_colors::set_override(false);
}

/// Check if colors are currently enabled.
pub fn colors_enabled() -> bool {
    COLORS_ENABLED.load(Ordering::Relaxed)
}

/// Prefix colors, assigned to children round-robin in launch order.
const PREFIX_PALETTE: [AnsiColors; 6] = [
    AnsiColors::Cyan,
    AnsiColors::Magenta,
    AnsiColors::Yellow,
    AnsiColors::Blue,
    AnsiColors::Green,
    AnsiColors::BrightRed,
];

/// The `[name]` prefix put in front of every line a child prints to `stream`.
pub fn child_prefix(display_name: &str, index: usize, stream: Stream) -> String {
    let prefix = format!("[{}]", display_name);
    if colors_enabled() {
        let color = PREFIX_PALETTE[index % PREFIX_PALETTE.len()];
        prefix
            .if_supports_color(stream, |p| p.color(color))
            .to_string()
    } else {
        prefix
    }
}

/// Semantic color categories for the `list` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Semantic {
    /// Variant names (e.g. "dark-arm")
    VariantName,
    /// Axis values
    Value,
    /// Row numbers and other secondary text
    Muted,
}

/// Get the comfy_table color for a semantic category.
///
/// Returns `None` when colors are disabled, which leaves the cell unstyled.
pub fn table_color(semantic: Semantic) -> Option<comfy_table::Color> {
    if !colors_enabled() {
        return None;
    }
    Some(match semantic {
        Semantic::VariantName => comfy_table::Color::Cyan,
        Semantic::Value => comfy_table::Color::Green,
        Semantic::Muted => comfy_table::Color::DarkGrey,
    })
}

/// Extension trait for comfy_table cells with NO_COLOR support.
pub trait ThemedCell {
    /// Apply semantic coloring to a cell, respecting NO_COLOR.
    fn themed(self, semantic: Semantic) -> Self;
}

impl ThemedCell for comfy_table::Cell {
    fn themed(self, semantic: Semantic) -> Self {
        match table_color(semantic) {
            Some(color) => self.fg(color),
            None => self,
        }
    }
}

/// Extension trait for applying semantic colors with owo_colors.
///
/// All methods respect the global color enable state set by `disable_colors()`
/// and only color when stderr supports it, since that is where they are printed.
pub trait Themed: OwoColorize {
    /// Style for error messages (red + bold).
    fn error_style(&self) -> String
    where
        Self: std::fmt::Display,
    {
        if colors_enabled() {
            self.if_supports_color(Stream::Stderr, |t| t.style(Style::new().red().bold()))
                .to_string()
        } else {
            self.to_string()
        }
    }

    /// Style for warnings and killed children (yellow).
    fn warning(&self) -> String
    where
        Self: std::fmt::Display,
    {
        if colors_enabled() {
            self.if_supports_color(Stream::Stderr, |t| t.style(Style::new().yellow()))
                .to_string()
        } else {
            self.to_string()
        }
    }

    /// Style for success messages (green + bold).
    fn success(&self) -> String
    where
        Self: std::fmt::Display,
    {
        if colors_enabled() {
            self.if_supports_color(Stream::Stderr, |t| t.style(Style::new().green().bold()))
                .to_string()
        } else {
            self.to_string()
        }
    }
}

impl Themed for String {}
impl Themed for &str {}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    // Reset color state before each test
    fn reset_colors() {
        COLORS_ENABLED.store(true, Ordering::Relaxed);
        owo_colors::set_override(true);
    }

    #[test]
    #[serial(colors)]
    fn test_disable_colors() {
        reset_colors();
        assert!(colors_enabled());
        disable_colors();
        assert!(!colors_enabled());
        reset_colors();
    }

    #[test]
    #[serial(colors)]
    fn test_child_prefix_colored() {
        reset_colors();
        let prefix = child_prefix("dark-arm", 0, Stream::Stdout);
        assert!(prefix.contains("\x1b["), "Expected ANSI escape codes");
        assert!(prefix.contains("[dark-arm]"));
    }

    #[test]
    #[serial(colors)]
    fn test_child_prefix_plain() {
        reset_colors();
        disable_colors();
        assert_eq!(child_prefix("light-x86", 7, Stream::Stdout), "[light-x86]");
        reset_colors();
    }

    #[test]
    #[serial(colors)]
    fn test_child_prefix_follows_stream_support() {
        reset_colors();
        owo_colors::set_override(false);
        // Enabled globally, but the stream cannot show colors.
        assert!(colors_enabled());
        assert_eq!(child_prefix("dark-arm", 0, Stream::Stdout), "[dark-arm]");
        assert_eq!(child_prefix("dark-arm", 0, Stream::Stderr), "[dark-arm]");
        reset_colors();
    }

    #[test]
    #[serial(colors)]
    fn test_themed_trait_with_colors() {
        reset_colors();
        assert!("boom".error_style().contains("\x1b["));
        assert!("boom".error_style().contains("boom"));
        assert!(String::from("ok").success().contains("\x1b["));
    }

    #[test]
    #[serial(colors)]
    fn test_prefix_palette_wraps() {
        reset_colors();
        assert_eq!(
            child_prefix("a", 1, Stream::Stderr),
            child_prefix("a", 1 + PREFIX_PALETTE.len(), Stream::Stderr)
        );
    }

    #[test]
    #[serial(colors)]
    fn test_themed_trait_without_colors() {
        reset_colors();
        disable_colors();

        let text = "test";
        assert_eq!(text.error_style(), "test");
        assert_eq!(text.warning(), "test");
        assert_eq!(text.success(), "test");

        reset_colors();
    }

    #[test]
    #[serial(colors)]
    fn test_table_color_toggle() {
        reset_colors();
        assert_eq!(
            table_color(Semantic::VariantName),
            Some(comfy_table::Color::Cyan)
        );
        disable_colors();
        assert_eq!(table_color(Semantic::Value), None);
        reset_colors();
    }
}
