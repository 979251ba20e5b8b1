//! Theme tokens for the browser: light/dark palettes and `NO_COLOR` support.

#![allow(missing_docs)]

use std::env;

use crossterm::style::Color;

use crate::catalog::record::Category;

/// Light or dark palette, toggled at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

/// Color output mode for compatibility with `NO_COLOR` and `--no-color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Enabled,
    Disabled,
}

impl ColorMode {
    #[must_use]
    pub const fn from_no_color_flag(no_color: bool) -> Self {
        if no_color { Self::Disabled } else { Self::Enabled }
    }

    #[must_use]
    pub fn from_environment(no_color_flag: bool) -> Self {
        Self::from_no_color_flag(no_color_flag || env::var_os("NO_COLOR").is_some())
    }
}

/// Semantic token category independent of concrete colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticToken {
    Accent,
    Warning,
    Danger,
    Muted,
    Neutral,
    Reading,
    Listening,
    Writing,
    Other,
}

impl SemanticToken {
    #[must_use]
    pub const fn for_category(category: Category) -> Self {
        match category {
            Category::Reading => Self::Reading,
            Category::Listening => Self::Listening,
            Category::Writing => Self::Writing,
            Category::Other => Self::Other,
        }
    }
}

/// Concrete colors for one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub accent: Color,
    pub warning: Color,
    pub danger: Color,
    pub muted: Color,
    pub neutral: Color,
    pub reading: Color,
    pub listening: Color,
    pub writing: Color,
    pub other: Color,
    pub selection_bg: Color,
}

impl ThemePalette {
    #[must_use]
    pub const fn dark() -> Self {
        Self {
            accent: Color::Cyan,
            warning: Color::Yellow,
            danger: Color::Red,
            muted: Color::DarkGrey,
            neutral: Color::White,
            reading: Color::Blue,
            listening: Color::Magenta,
            writing: Color::Green,
            other: Color::Grey,
            selection_bg: Color::DarkBlue,
        }
    }

    #[must_use]
    pub const fn light() -> Self {
        Self {
            accent: Color::DarkCyan,
            warning: Color::DarkYellow,
            danger: Color::DarkRed,
            muted: Color::Grey,
            neutral: Color::Black,
            reading: Color::DarkBlue,
            listening: Color::DarkMagenta,
            writing: Color::DarkGreen,
            other: Color::DarkGrey,
            selection_bg: Color::Grey,
        }
    }

    #[must_use]
    pub const fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Dark => Self::dark(),
            ThemeMode::Light => Self::light(),
        }
    }

    #[must_use]
    pub const fn color(&self, token: SemanticToken) -> Color {
        match token {
            SemanticToken::Accent => self.accent,
            SemanticToken::Warning => self.warning,
            SemanticToken::Danger => self.danger,
            SemanticToken::Muted => self.muted,
            SemanticToken::Neutral => self.neutral,
            SemanticToken::Reading => self.reading,
            SemanticToken::Listening => self.listening,
            SemanticToken::Writing => self.writing,
            SemanticToken::Other => self.other,
        }
    }
}

/// Full render theme (palette + color policy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub mode: ThemeMode,
    pub color: ColorMode,
    pub palette: ThemePalette,
}

impl Theme {
    #[must_use]
    pub const fn new(mode: ThemeMode, color: ColorMode) -> Self {
        Self {
            mode,
            color,
            palette: ThemePalette::for_mode(mode),
        }
    }

    /// Foreground for a token, or `None` when color is disabled.
    #[must_use]
    pub const fn fg(&self, token: SemanticToken) -> Option<Color> {
        match self.color {
            ColorMode::Enabled => Some(self.palette.color(token)),
            ColorMode::Disabled => None,
        }
    }

    /// Background for the selected row, or `None` when color is disabled.
    #[must_use]
    pub const fn selection_bg(&self) -> Option<Color> {
        match self.color {
            ColorMode::Enabled => Some(self.palette.selection_bg),
            ColorMode::Disabled => None,
        }
    }
}
