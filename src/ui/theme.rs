//! Color themes for the UI.

use crate::app::Theme;
use crate::visualizer::scene::Ink;
use ratatui::style::Color;

/// Theme color palette.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    /// Background color.
    pub bg: Color,
    /// Primary text color.
    pub text: Color,
    /// Dimmed text color.
    pub muted: Color,
    /// Heading text color.
    pub heading: Color,
    /// Label text color.
    pub label: Color,
    /// Value text color.
    pub value: Color,
    /// Border color.
    pub border: Color,
    /// Border color of the focused panel.
    pub focus: Color,
    /// Cursor foreground color.
    pub cursor_fg: Color,
    /// Cursor background color.
    pub cursor_bg: Color,
    /// Status bar foreground color.
    pub status_fg: Color,
    /// Status bar background color.
    pub status_bg: Color,
    /// Warning color.
    pub warning: Color,
    /// Error color.
    pub error: Color,
    /// Success color.
    pub ok: Color,
    /// Red accent.
    pub red: Color,
    /// Green accent.
    pub green: Color,
    /// Yellow accent.
    pub yellow: Color,
    /// Blue accent.
    pub blue: Color,
    /// Purple accent.
    pub purple: Color,
    /// Aqua accent.
    pub aqua: Color,
}

impl ThemeColors {
    /// Create color palette from theme.
    pub fn from_theme(theme: &Theme) -> Self {
        match theme {
            Theme::GruvboxDark => Self {
                bg: Color::Rgb(40, 40, 40),
                text: Color::Rgb(235, 219, 178),
                muted: Color::Rgb(146, 131, 116),
                heading: Color::Rgb(251, 184, 108),
                label: Color::Rgb(184, 187, 38),
                value: Color::Rgb(142, 192, 124),
                border: Color::Rgb(102, 92, 84),
                focus: Color::Rgb(131, 165, 152),
                cursor_fg: Color::Rgb(40, 40, 40),
                cursor_bg: Color::Rgb(251, 184, 108),
                status_fg: Color::Rgb(235, 219, 178),
                status_bg: Color::Rgb(60, 56, 54),
                warning: Color::Rgb(250, 189, 47),
                error: Color::Rgb(251, 73, 52),
                ok: Color::Rgb(184, 187, 38),
                red: Color::Rgb(251, 73, 52),
                green: Color::Rgb(184, 187, 38),
                yellow: Color::Rgb(250, 189, 47),
                blue: Color::Rgb(131, 165, 152),
                purple: Color::Rgb(211, 134, 155),
                aqua: Color::Rgb(142, 192, 124),
            },
            Theme::GruvboxLight => Self {
                bg: Color::Rgb(251, 245, 234),
                text: Color::Rgb(60, 56, 54),
                muted: Color::Rgb(124, 111, 100),
                heading: Color::Rgb(175, 58, 3),
                label: Color::Rgb(121, 116, 14),
                value: Color::Rgb(102, 123, 3),
                border: Color::Rgb(213, 196, 161),
                focus: Color::Rgb(7, 102, 120),
                cursor_fg: Color::Rgb(251, 245, 234),
                cursor_bg: Color::Rgb(175, 58, 3),
                status_fg: Color::Rgb(60, 56, 54),
                status_bg: Color::Rgb(235, 219, 178),
                warning: Color::Rgb(181, 118, 20),
                error: Color::Rgb(157, 0, 6),
                ok: Color::Rgb(121, 116, 14),
                red: Color::Rgb(157, 0, 6),
                green: Color::Rgb(121, 116, 14),
                yellow: Color::Rgb(181, 118, 20),
                blue: Color::Rgb(7, 102, 120),
                purple: Color::Rgb(143, 63, 113),
                aqua: Color::Rgb(66, 123, 88),
            },
        }
    }

    /// Color for a visualizer ink.
    pub fn ink(&self, ink: Ink) -> Color {
        match ink {
            Ink::Grid => self.border,
            Ink::Axis => self.blue,
            Ink::Curve => self.green,
            Ink::Derivative => self.yellow,
            Ink::Tangent | Ink::Point => self.red,
            Ink::Secant => self.purple,
            Ink::Approach => self.yellow,
            Ink::Sine => self.red,
            Ink::Cosine => self.aqua,
            Ink::Guide => self.blue,
            Ink::Text => self.text,
        }
    }
}
