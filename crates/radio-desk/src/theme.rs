//! Color palettes and style helpers for the desk.

use ratatui::style::{Color, Modifier, Style};
use station_proto::config::ThemeChoice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn palette(self) -> &'static Palette {
        match self {
            Theme::Dark => &DARK,
            Theme::Light => &LIGHT,
        }
    }
}

impl From<ThemeChoice> for Theme {
    fn from(choice: ThemeChoice) -> Self {
        match choice {
            ThemeChoice::Dark => Theme::Dark,
            ThemeChoice::Light => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub desktop_bg: Color,
    pub desktop_pattern: Color,
    pub panel_bg: Color,
    pub primary: Color,
    pub secondary: Color,
    pub muted: Color,
    pub accent: Color,
    pub playing: Color,
    pub error: Color,
    pub border: Color,
    pub border_focused: Color,
    pub selection_bg: Color,
    pub filter_bg: Color,
    pub filter_fg: Color,
    pub dock_bg: Color,
}

// ── Palettes ──────────────────────────────────────────────────────────────────

pub const DARK: Palette = Palette {
    desktop_bg: Color::Rgb(18, 18, 18),
    desktop_pattern: Color::Rgb(34, 34, 44),
    panel_bg: Color::Rgb(24, 24, 30),
    primary: Color::Rgb(210, 210, 225),
    secondary: Color::Rgb(115, 115, 138),
    muted: Color::Rgb(72, 72, 88),
    accent: Color::Rgb(255, 95, 95),
    playing: Color::Rgb(80, 200, 120),
    error: Color::Rgb(255, 80, 80),
    border: Color::Rgb(52, 52, 66),
    border_focused: Color::Rgb(120, 100, 200),
    selection_bg: Color::Rgb(36, 36, 52),
    filter_bg: Color::Rgb(20, 20, 32),
    filter_fg: Color::Rgb(255, 200, 80),
    dock_bg: Color::Rgb(12, 12, 16),
};

pub const LIGHT: Palette = Palette {
    desktop_bg: Color::Rgb(228, 224, 214),
    desktop_pattern: Color::Rgb(210, 204, 190),
    panel_bg: Color::Rgb(250, 248, 242),
    primary: Color::Rgb(32, 32, 40),
    secondary: Color::Rgb(92, 92, 110),
    muted: Color::Rgb(150, 150, 160),
    accent: Color::Rgb(200, 50, 60),
    playing: Color::Rgb(30, 140, 80),
    error: Color::Rgb(190, 30, 30),
    border: Color::Rgb(170, 166, 156),
    border_focused: Color::Rgb(90, 70, 180),
    selection_bg: Color::Rgb(222, 218, 240),
    filter_bg: Color::Rgb(238, 234, 220),
    filter_fg: Color::Rgb(150, 90, 0),
    dock_bg: Color::Rgb(204, 198, 184),
};

// ── Styles ────────────────────────────────────────────────────────────────────

impl Palette {
    pub fn style_default(&self) -> Style {
        Style::default().fg(self.primary).bg(self.panel_bg)
    }

    pub fn style_secondary(&self) -> Style {
        Style::default().fg(self.secondary)
    }

    pub fn style_muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn style_accent(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn style_playing(&self) -> Style {
        Style::default().fg(self.playing)
    }

    pub fn style_error(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn style_title(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn style_selected(&self) -> Style {
        Style::default()
            .bg(self.selection_bg)
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn style_border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.border_focused)
        } else {
            Style::default().fg(self.border)
        }
    }

    pub fn style_filter(&self) -> Style {
        Style::default().fg(self.filter_fg).bg(self.filter_bg)
    }
}
