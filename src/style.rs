//! ANSI colour and decoration helpers.
//!
//! Styling is attached to text as data and only turned into escape
//! sequences when rendered, so every writer can drop it with a single
//! `colors` switch and still measure the visible width.

use colored::{ColoredString, Colorize};

pub use colored::Color;

/// Text decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoration {
    Bold,
    Italic,
    Underlined,
}

/// Text plus optional foreground, background and decoration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Styled {
    text: String,
    fg: Option<Color>,
    bg: Option<Color>,
    decoration: Option<Decoration>,
}

impl Styled {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fg: None,
            bg: None,
            decoration: None,
        }
    }

    pub fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    pub fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    pub fn decorate(mut self, decoration: Decoration) -> Self {
        self.decoration = Some(decoration);
        self
    }

    /// Visible width in characters.
    pub fn width(&self) -> usize {
        self.text.chars().count()
    }

    /// Render with escape sequences, or as plain text when `colors` is off.
    pub fn render(&self, colors: bool) -> String {
        if !colors || (self.fg.is_none() && self.bg.is_none() && self.decoration.is_none()) {
            return self.text.clone();
        }

        let mut out: ColoredString = self.text.as_str().normal();
        if let Some(fg) = self.fg {
            out = out.color(fg);
        }
        if let Some(bg) = self.bg {
            out = out.on_color(bg);
        }
        out = match self.decoration {
            Some(Decoration::Bold) => out.bold(),
            Some(Decoration::Italic) => out.italic(),
            Some(Decoration::Underlined) => out.underline(),
            None => out,
        };
        out.to_string()
    }
}

impl From<&str> for Styled {
    fn from(text: &str) -> Self {
        Styled::plain(text)
    }
}

impl From<String> for Styled {
    fn from(text: String) -> Self {
        Styled::plain(text)
    }
}

impl From<&String> for Styled {
    fn from(text: &String) -> Self {
        Styled::plain(text.as_str())
    }
}

pub fn colorize(text: impl Into<String>, color: Color) -> Styled {
    Styled::plain(text).fg(color)
}

pub fn italic(text: impl Into<String>) -> Styled {
    Styled::plain(text).decorate(Decoration::Italic)
}

pub fn underline(text: impl Into<String>) -> Styled {
    Styled::plain(text).decorate(Decoration::Underlined)
}

/// `true` in green, `false` in red.
pub fn colored_bool(value: bool) -> Styled {
    colorize(
        value.to_string(),
        if value { Color::Green } else { Color::Red },
    )
}
