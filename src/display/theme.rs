//! Colour themes for the screen display.
//!
//! Light and dark palettes, plus automatic detection from the terminal
//! environment.

use ratatui::style::Color;

use crate::cli::ThemeArg;

/// Colours used by the screen display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub primary: Color,
    pub success: Color,
    pub danger: Color,
    pub identifier: Color,
    pub dim: Color,
    pub normal: Color,
}

impl Theme {
    /// High-contrast dark theme (default).
    ///
    /// Palette:
    /// - Primary: Cyan (header, borders)
    /// - Success: Green (success notices)
    /// - Danger: Red (error notices)
    /// - Identifier: Yellow (checked-in identifiers)
    /// - Dim: DarkGray (timestamps, placeholder)
    /// - Normal: White (main text)
    pub fn dark() -> Self {
        Self {
            primary: Color::Cyan,
            success: Color::Green,
            danger: Color::Red,
            identifier: Color::Yellow,
            dim: Color::DarkGray,
            normal: Color::White,
        }
    }

    /// High-contrast light theme.
    pub fn light() -> Self {
        Self {
            primary: Color::Blue,
            success: Color::Green,
            danger: Color::Red,
            identifier: Color::Magenta,
            dim: Color::Gray,
            normal: Color::Black,
        }
    }

    /// Detect the terminal background, falling back to dark.
    pub fn auto() -> Self {
        if is_light_terminal() {
            Self::light()
        } else {
            Self::dark()
        }
    }

    /// Resolve a CLI/config theme choice.
    pub fn from_arg(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Auto => Self::auto(),
            ThemeArg::Dark => Self::dark(),
            ThemeArg::Light => Self::light(),
        }
    }

    /// Check if this is a light theme.
    pub fn is_light(&self) -> bool {
        self.normal == Color::Black
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

/// Heuristic light-background check.
///
/// `COLORFGBG` ("fg;bg") is set by rxvt, xterm and konsole; background
/// indices 7 and up are light, except 8 (dark gray).
fn is_light_terminal() -> bool {
    std::env::var("COLORFGBG")
        .ok()
        .as_deref()
        .and_then(|value| value.rsplit(';').next())
        .and_then(|bg| bg.parse::<u32>().ok())
        .is_some_and(|bg| bg >= 7 && bg != 8)
}
