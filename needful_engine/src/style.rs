//! Styling helpers for terminal output.
//!
//! The [`ConsoleStyle`] trait applies ANSI styling via the `colored` crate.
//! Implementations for `&str` and `String` are provided so string literals can
//! be styled directly.

use colored::{ColoredString, Colorize};

/// Convenience trait for applying color and style to console output.
pub trait ConsoleStyle {
    /// Text a macro echoes to the chat log.
    fn chat_style(&self) -> ColoredString;
    /// A side effect performed on the host (click, key press, action...).
    fn effect_style(&self) -> ColoredString;
    fn error_style(&self) -> ColoredString;
    fn state_style(&self) -> ColoredString;
    fn macro_name_style(&self) -> ColoredString;
    fn prompt_style(&self) -> ColoredString;
    fn section_style(&self) -> ColoredString;
}

impl ConsoleStyle for &str {
    fn chat_style(&self) -> ColoredString {
        self.truecolor(220, 220, 220)
    }
    fn effect_style(&self) -> ColoredString {
        self.italic().truecolor(102, 208, 250)
    }
    fn error_style(&self) -> ColoredString {
        self.truecolor(230, 30, 30)
    }
    fn state_style(&self) -> ColoredString {
        self.bold().truecolor(220, 180, 40)
    }
    fn macro_name_style(&self) -> ColoredString {
        self.truecolor(13, 160, 60).underline()
    }
    fn prompt_style(&self) -> ColoredString {
        self.truecolor(75, 180, 255)
    }
    fn section_style(&self) -> ColoredString {
        let bracketed = format!("[{self}]");
        bracketed.truecolor(75, 80, 75)
    }
}

impl ConsoleStyle for String {
    fn chat_style(&self) -> ColoredString {
        self.as_str().chat_style()
    }
    fn effect_style(&self) -> ColoredString {
        self.as_str().effect_style()
    }
    fn error_style(&self) -> ColoredString {
        self.as_str().error_style()
    }
    fn state_style(&self) -> ColoredString {
        self.as_str().state_style()
    }
    fn macro_name_style(&self) -> ColoredString {
        self.as_str().macro_name_style()
    }
    fn prompt_style(&self) -> ColoredString {
        self.as_str().prompt_style()
    }
    fn section_style(&self) -> ColoredString {
        self.as_str().section_style()
    }
}
