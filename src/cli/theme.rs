use crate::config::{
    HexColor, StyleOverride, ThemeConfig, ThemeModifier, ThemePreset, ThemeToken,
};
use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

/// Resolved token styles. With colour disabled only structural emphasis remains.
#[derive(Debug, Clone)]
pub struct Theme {
    enabled: bool,
    styles: HashMap<ThemeToken, Style>,
}

/// Base colours of a preset. Every token style is derived from these.
struct Palette {
    title: Color,
    muted: Color,
    prompt: Color,
    input: Color,
    placeholder: Color,
    answer: Color,
    waiting: Style,
    info: Color,
    error: Color,
    hint: Color,
    heading: Style,
    allowed: Color,
    input_bg: Color,
}

const DEFAULT_PALETTE: Palette = Palette {
    title: Color::Rgb(167, 139, 250),
    muted: Color::Rgb(138, 138, 160),
    prompt: Color::Rgb(102, 126, 234),
    input: Color::White,
    placeholder: Color::Rgb(110, 110, 130),
    answer: Color::Rgb(220, 220, 235),
    waiting: Style::new()
        .fg(Color::Rgb(167, 139, 250))
        .add_modifier(Modifier::ITALIC),
    info: Color::Rgb(86, 95, 137),
    error: Color::Rgb(247, 118, 142),
    hint: Color::Rgb(224, 175, 104),
    heading: Style::new()
        .fg(Color::Rgb(118, 75, 162))
        .add_modifier(Modifier::BOLD),
    allowed: Color::Rgb(158, 206, 106),
    input_bg: Color::Rgb(22, 22, 30),
};

const LIGHT_PALETTE: Palette = Palette {
    title: Color::Rgb(118, 75, 162),
    muted: Color::Rgb(90, 90, 110),
    prompt: Color::Rgb(31, 111, 235),
    input: Color::Rgb(36, 41, 47),
    placeholder: Color::Rgb(140, 149, 159),
    answer: Color::Rgb(36, 41, 47),
    waiting: Style::new()
        .fg(Color::Rgb(118, 75, 162))
        .add_modifier(Modifier::ITALIC),
    info: Color::Rgb(36, 70, 120),
    error: Color::Rgb(176, 0, 32),
    hint: Color::Rgb(130, 70, 0),
    heading: Style::new()
        .fg(Color::Rgb(102, 126, 234))
        .add_modifier(Modifier::BOLD),
    allowed: Color::Rgb(5, 80, 40),
    input_bg: Color::Rgb(246, 248, 250),
};

const HIGH_CONTRAST_PALETTE: Palette = Palette {
    title: Color::Rgb(255, 215, 0),
    muted: Color::Rgb(220, 220, 220),
    prompt: Color::Rgb(0, 255, 127),
    input: Color::Rgb(255, 255, 255),
    placeholder: Color::Rgb(200, 200, 200),
    answer: Color::Rgb(255, 255, 255),
    waiting: Style::new()
        .fg(Color::Rgb(255, 255, 0))
        .add_modifier(Modifier::BOLD),
    info: Color::Rgb(173, 216, 230),
    error: Color::Rgb(255, 64, 64),
    hint: Color::Rgb(255, 140, 0),
    heading: Style::new()
        .fg(Color::Rgb(255, 215, 0))
        .add_modifier(Modifier::BOLD.union(Modifier::UNDERLINED)),
    allowed: Color::Rgb(0, 255, 127),
    input_bg: Color::Rgb(0, 0, 0),
};

impl Theme {
    #[cfg(test)]
    pub fn new(enabled: bool) -> Self {
        Self::from_config(enabled, &ThemeConfig::default())
    }

    pub fn from_config(enabled: bool, config: &ThemeConfig) -> Self {
        let palette = match config.preset {
            ThemePreset::Default => &DEFAULT_PALETTE,
            ThemePreset::Light => &LIGHT_PALETTE,
            ThemePreset::HighContrast => &HIGH_CONTRAST_PALETTE,
        };
        let styles = ThemeToken::all()
            .iter()
            .map(|&token| {
                let base = palette.style(token);
                let style = config
                    .styles
                    .get(&token)
                    .map_or(base, |custom| apply_override(base, custom));
                (token, style)
            })
            .collect();

        Self { enabled, styles }
    }

    pub fn style(&self, token: ThemeToken) -> Style {
        if self.enabled {
            return self.styles.get(&token).copied().unwrap_or_default();
        }
        match token {
            ThemeToken::Title | ThemeToken::UserPrompt | ThemeToken::SidebarHeading => {
                Style::new().add_modifier(Modifier::BOLD)
            }
            _ => Style::new(),
        }
    }
}

impl Palette {
    fn style(&self, token: ThemeToken) -> Style {
        let fg = |color: Color| Style::new().fg(color);
        match token {
            ThemeToken::Title => fg(self.title).add_modifier(Modifier::BOLD),
            ThemeToken::Tagline | ThemeToken::Footer => fg(self.muted),
            ThemeToken::UserPrompt => fg(self.prompt).add_modifier(Modifier::BOLD),
            ThemeToken::UserInput => fg(self.input),
            ThemeToken::Placeholder => fg(self.placeholder).add_modifier(Modifier::ITALIC),
            ThemeToken::AssistantText => fg(self.answer),
            ThemeToken::AssistantWaiting => self.waiting,
            ThemeToken::SystemInfo | ThemeToken::Status => fg(self.info),
            ThemeToken::SystemError => fg(self.error).add_modifier(Modifier::BOLD),
            ThemeToken::SystemHint => fg(self.hint),
            ThemeToken::SidebarHeading => self.heading,
            ThemeToken::SidebarAllowed => fg(self.allowed),
            ThemeToken::SidebarDenied => fg(self.error),
            ThemeToken::InputBlock => fg(self.input).bg(self.input_bg),
        }
    }
}

fn apply_override(mut style: Style, custom: &StyleOverride) -> Style {
    if let Some(color) = custom.fg {
        style = style.fg(rgb(color));
    }
    if let Some(color) = custom.bg {
        style = style.bg(rgb(color));
    }
    if let Some(modifiers) = &custom.modifiers {
        let replacement = modifiers
            .iter()
            .fold(Modifier::empty(), |acc, &modifier| acc | to_modifier(modifier));
        style = style
            .remove_modifier(Modifier::all())
            .add_modifier(replacement);
    }
    style
}

fn rgb(HexColor { r, g, b }: HexColor) -> Color {
    Color::Rgb(r, g, b)
}

fn to_modifier(modifier: ThemeModifier) -> Modifier {
    match modifier {
        ThemeModifier::Bold => Modifier::BOLD,
        ThemeModifier::Dim => Modifier::DIM,
        ThemeModifier::Italic => Modifier::ITALIC,
        ThemeModifier::Underlined => Modifier::UNDERLINED,
        ThemeModifier::Reversed => Modifier::REVERSED,
        ThemeModifier::CrossedOut => Modifier::CROSSED_OUT,
    }
}
