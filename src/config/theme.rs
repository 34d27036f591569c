use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;

/// Theme section of the config file after validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeConfig {
    pub preset: ThemePreset,
    pub styles: HashMap<ThemeToken, StyleOverride>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ThemePreset {
    #[default]
    Default,
    Light,
    HighContrast,
}

/// A styled region of the TUI that the config file can restyle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeToken {
    Title,
    Tagline,
    UserPrompt,
    UserInput,
    Placeholder,
    AssistantText,
    AssistantWaiting,
    SystemInfo,
    SystemError,
    SystemHint,
    SidebarHeading,
    SidebarAllowed,
    SidebarDenied,
    Status,
    InputBlock,
    Footer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleOverride {
    pub fg: Option<HexColor>,
    pub bg: Option<HexColor>,
    /// When set, replaces the preset modifiers instead of adding to them.
    pub modifiers: Option<Vec<ThemeModifier>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeModifier {
    Bold,
    Dim,
    Italic,
    Underlined,
    Reversed,
    CrossedOut,
}

const PRESETS: [(&str, ThemePreset); 3] = [
    ("default", ThemePreset::Default),
    ("light", ThemePreset::Light),
    ("high-contrast", ThemePreset::HighContrast),
];

const TOKENS: [(&str, ThemeToken); 16] = [
    ("title", ThemeToken::Title),
    ("tagline", ThemeToken::Tagline),
    ("user_prompt", ThemeToken::UserPrompt),
    ("user_input", ThemeToken::UserInput),
    ("placeholder", ThemeToken::Placeholder),
    ("assistant_text", ThemeToken::AssistantText),
    ("assistant_waiting", ThemeToken::AssistantWaiting),
    ("system_info", ThemeToken::SystemInfo),
    ("system_error", ThemeToken::SystemError),
    ("system_hint", ThemeToken::SystemHint),
    ("sidebar_heading", ThemeToken::SidebarHeading),
    ("sidebar_allowed", ThemeToken::SidebarAllowed),
    ("sidebar_denied", ThemeToken::SidebarDenied),
    ("status", ThemeToken::Status),
    ("input_block", ThemeToken::InputBlock),
    ("footer", ThemeToken::Footer),
];

const ALL_TOKENS: [ThemeToken; 16] = {
    let mut all = [ThemeToken::Title; 16];
    let mut i = 0;
    while i < TOKENS.len() {
        all[i] = TOKENS[i].1;
        i += 1;
    }
    all
};

const MODIFIERS: [(&str, ThemeModifier); 6] = [
    ("bold", ThemeModifier::Bold),
    ("dim", ThemeModifier::Dim),
    ("italic", ThemeModifier::Italic),
    ("underlined", ThemeModifier::Underlined),
    ("reversed", ThemeModifier::Reversed),
    ("crossed_out", ThemeModifier::CrossedOut),
];

fn lookup<T: Copy>(table: &[(&str, T)], what: &str, name: &str) -> Result<T, String> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, value)| *value)
        .ok_or_else(|| format!("unknown {what} '{name}'"))
}

impl ThemeToken {
    pub fn all() -> &'static [ThemeToken] {
        &ALL_TOKENS
    }
}

impl FromStr for ThemePreset {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        lookup(&PRESETS, "preset", value)
    }
}

impl FromStr for ThemeToken {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        lookup(&TOKENS, "token", value)
    }
}

impl FromStr for ThemeModifier {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        lookup(&MODIFIERS, "modifier", value)
    }
}

impl FromStr for HexColor {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || "invalid hex color, expected #RRGGBB".to_string();
        let digits = value
            .strip_prefix('#')
            .filter(|digits| digits.len() == 6 && digits.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(invalid)?;
        let [_, r, g, b] = u32::from_str_radix(digits, 16)
            .map_err(|_| invalid())?
            .to_be_bytes();
        Ok(Self { r, g, b })
    }
}

/// A setting that failed validation, addressed by its dotted key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct InvalidSetting {
    pub key: String,
    pub reason: String,
}

impl InvalidSetting {
    fn new(key: impl Into<String>, reason: String) -> Self {
        Self {
            key: key.into(),
            reason,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RawTheme {
    name: Option<String>,
    #[serde(default)]
    styles: HashMap<String, RawStyle>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStyle {
    fg: Option<String>,
    bg: Option<String>,
    modifiers: Option<Vec<String>>,
}

impl RawTheme {
    pub(super) fn resolve(&self) -> Result<ThemeConfig, InvalidSetting> {
        let preset = match &self.name {
            Some(name) => name
                .parse::<ThemePreset>()
                .map_err(|reason| InvalidSetting::new("theme.name", reason))?,
            None => ThemePreset::default(),
        };

        let mut styles = HashMap::with_capacity(self.styles.len());
        for (name, raw) in &self.styles {
            let key = format!("theme.styles.{name}");
            let token = name
                .parse::<ThemeToken>()
                .map_err(|reason| InvalidSetting::new(key.as_str(), reason))?;
            styles.insert(token, raw.resolve(&key)?);
        }

        Ok(ThemeConfig { preset, styles })
    }
}

impl RawStyle {
    fn resolve(&self, key: &str) -> Result<StyleOverride, InvalidSetting> {
        let color = |field: &str, value: &Option<String>| {
            value
                .as_deref()
                .map(str::parse::<HexColor>)
                .transpose()
                .map_err(|reason| InvalidSetting::new(format!("{key}.{field}"), reason))
        };

        let modifiers = self
            .modifiers
            .as_ref()
            .map(|names| {
                names
                    .iter()
                    .map(|name| name.parse::<ThemeModifier>())
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()
            .map_err(|reason| InvalidSetting::new(format!("{key}.modifiers"), reason))?;

        Ok(StyleOverride {
            fg: color("fg", &self.fg)?,
            bg: color("bg", &self.bg)?,
            modifiers,
        })
    }
}
