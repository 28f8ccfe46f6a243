//! Color theme and glyphs for the lexcheck TUI.
//!
//! Uses Kanagawa Wave palette by default with an optional high-contrast override.

use ratatui::style::{Color, Modifier, Style};

use lexcheck_types::{RiskBand, UiOptions};

mod colors {
    use super::Color;

    pub const BG_HIGHLIGHT: Color = Color::Rgb(42, 42, 55); // sumiInk4

    pub const TEXT_PRIMARY: Color = Color::Rgb(220, 215, 186); // fujiWhite
    pub const TEXT_SECONDARY: Color = Color::Rgb(200, 192, 147); // oldWhite
    pub const TEXT_MUTED: Color = Color::Rgb(114, 113, 105); // fujiGray

    pub const PRIMARY: Color = Color::Rgb(149, 127, 184); // oniViolet
    pub const CYAN: Color = Color::Rgb(127, 180, 202); // springBlue
    pub const BLUE: Color = Color::Rgb(126, 156, 216); // crystalBlue

    // Risk bar colors match the traffic-light scheme of the analysis service's own UI.
    pub const RISK_GREEN: Color = Color::Rgb(39, 174, 96); // #27ae60
    pub const RISK_YELLOW: Color = Color::Rgb(241, 196, 15); // #f1c40f
    pub const RISK_RED: Color = Color::Rgb(231, 76, 60); // #e74c3c
}

/// Resolved theme palette used by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg_highlight: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub primary: Color,
    pub accent: Color,
    pub info: Color,
    pub green: Color,
    pub yellow: Color,
    pub red: Color,
}

impl Palette {
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            bg_highlight: colors::BG_HIGHLIGHT,
            text_primary: colors::TEXT_PRIMARY,
            text_secondary: colors::TEXT_SECONDARY,
            text_muted: colors::TEXT_MUTED,
            primary: colors::PRIMARY,
            accent: colors::CYAN,
            info: colors::BLUE,
            green: colors::RISK_GREEN,
            yellow: colors::RISK_YELLOW,
            red: colors::RISK_RED,
        }
    }

    #[must_use]
    pub const fn high_contrast() -> Self {
        Self {
            bg_highlight: Color::Black,
            text_primary: Color::White,
            text_secondary: Color::White,
            text_muted: Color::Gray,
            primary: Color::Magenta,
            accent: Color::Cyan,
            info: Color::LightBlue,
            green: Color::Green,
            yellow: Color::Yellow,
            red: Color::Red,
        }
    }

    #[must_use]
    pub const fn band_color(&self, band: RiskBand) -> Color {
        match band {
            RiskBand::Low => self.green,
            RiskBand::Medium => self.yellow,
            RiskBand::High => self.red,
        }
    }
}

#[must_use]
pub fn palette(options: UiOptions) -> Palette {
    if options.high_contrast {
        Palette::high_contrast()
    } else {
        Palette::standard()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Glyphs {
    pub bullet: &'static str,
    pub info: &'static str,
    pub success: &'static str,
    pub error: &'static str,
    pub tag_open: &'static str,
    pub tag_close: &'static str,
    pub gauge_filled: &'static str,
    pub gauge_empty: &'static str,
    pub spinner_frames: &'static [&'static str],
}

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const SPINNER_FRAMES_ASCII: &[&str] = &["-", "\\", "|", "/"];

#[must_use]
pub fn glyphs(options: UiOptions) -> Glyphs {
    if options.ascii_only {
        Glyphs {
            bullet: "*",
            info: "i",
            success: "OK",
            error: "!",
            tag_open: "[",
            tag_close: "]",
            gauge_filled: "#",
            gauge_empty: "-",
            spinner_frames: SPINNER_FRAMES_ASCII,
        }
    } else {
        Glyphs {
            bullet: "•",
            info: "ℹ",
            success: "✓",
            error: "✗",
            tag_open: " ",
            tag_close: " ",
            gauge_filled: "█",
            gauge_empty: "░",
            spinner_frames: SPINNER_FRAMES,
        }
    }
}

#[must_use]
pub fn spinner_frame(tick: usize, options: UiOptions) -> &'static str {
    let frames = glyphs(options).spinner_frames;
    frames[tick % frames.len()]
}

/// Pre-defined styles for common UI elements.
pub mod styles {
    use super::{Modifier, Palette, Style};

    #[must_use]
    pub fn section_header(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.primary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn keyword_tag(palette: &Palette) -> Style {
        Style::default().fg(palette.accent).bg(palette.bg_highlight)
    }

    #[must_use]
    pub fn body(palette: &Palette) -> Style {
        Style::default().fg(palette.text_secondary)
    }

    #[must_use]
    pub fn label(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.text_primary)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn muted(palette: &Palette) -> Style {
        Style::default().fg(palette.text_muted)
    }
}
