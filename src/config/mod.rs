mod theme;

pub use theme::{HexColor, StyleOverride, ThemeConfig, ThemeModifier, ThemePreset, ThemeToken};

use crate::assistant::profile::Profile;
use crate::knowledge::DEFAULT_KNOWLEDGE_BASE_FILE;
use crate::llm::anthropic::{
    DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, ModelSettings,
};
use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use theme::RawTheme;

const APP_DIR: &str = "course-assistant";
const FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// The file that was read, or would have been read when absent.
    pub config_path: PathBuf,
    pub anthropic_api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub profile: Profile,
    pub knowledge_base: PathBuf,
    pub theme: ThemeConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    anthropic_api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f64>,
    profile: Option<String>,
    knowledge_base: Option<String>,
    #[serde(default)]
    theme: RawTheme,
}

impl AppConfig {
    /// Layers defaults, the TOML file, `.env` and the process environment.
    /// CLI flags are applied afterwards with [`AppConfig::apply_overrides`].
    pub fn load_with_path(explicit_path: Option<&Path>) -> Result<Self> {
        let config_path = match explicit_path {
            Some(path) if path.is_file() => path.to_path_buf(),
            Some(path) => bail!("Failed to load config {}: file not found", path.display()),
            None => default_config_path()?,
        };
        let file = if config_path.is_file() {
            read_config_file(&config_path)?
        } else {
            FileConfig::default()
        };

        dotenvy::dotenv().ok();

        let invalid = |key: &str, reason: &str| {
            anyhow!(
                "Failed to load config {}: {key}: {reason}",
                config_path.display()
            )
        };

        let max_tokens = match file.max_tokens {
            Some(0) => return Err(invalid("max_tokens", "must be >= 1")),
            value => value.unwrap_or(DEFAULT_MAX_TOKENS),
        };
        let temperature = match file.temperature {
            Some(value) if !(0.0..=1.0).contains(&value) => {
                return Err(invalid("temperature", "must be between 0.0 and 1.0"));
            }
            value => value.unwrap_or(DEFAULT_TEMPERATURE),
        };

        let profile = if let Some(name) = setting("COURSE_ASSISTANT_PROFILE") {
            name.parse::<Profile>()
                .map_err(|reason| anyhow!("Failed to resolve COURSE_ASSISTANT_PROFILE: {reason}"))?
        } else if let Some(name) = present(file.profile.as_deref()) {
            name.parse::<Profile>()
                .map_err(|reason| invalid("profile", &reason))?
        } else {
            Profile::default()
        };

        let knowledge_base = match setting("COURSE_ASSISTANT_KNOWLEDGE_BASE") {
            Some(path) => PathBuf::from(path),
            None => present(file.knowledge_base.as_deref()).map_or_else(
                || PathBuf::from(DEFAULT_KNOWLEDGE_BASE_FILE),
                |path| relative_to_config(&config_path, path),
            ),
        };

        let theme = file
            .theme
            .resolve()
            .map_err(|err| invalid(&err.key, &err.reason))?;

        let anthropic_api_key = setting("ANTHROPIC_API_KEY")
            .or_else(|| setting("CLAUDE_API_KEY"))
            .or_else(|| present(file.anthropic_api_key.as_deref()).map(str::to_owned));
        let model = setting("ANTHROPIC_MODEL")
            .or_else(|| present(file.model.as_deref()).map(str::to_owned))
            .unwrap_or_else(|| DEFAULT_MODEL.to_owned());
        let base_url = setting("ANTHROPIC_BASE_URL")
            .or_else(|| present(file.base_url.as_deref()).map(str::to_owned))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());

        Ok(Self {
            config_path,
            anthropic_api_key,
            model,
            base_url,
            max_tokens,
            temperature,
            profile,
            knowledge_base,
            theme,
        })
    }

    /// Command-line flags win over every other source.
    pub fn apply_overrides(&mut self, profile: Option<Profile>, knowledge_base: Option<PathBuf>) {
        if let Some(profile) = profile {
            self.profile = profile;
        }
        if let Some(path) = knowledge_base {
            self.knowledge_base = path;
        }
    }

    pub fn model_settings(&self) -> ModelSettings {
        ModelSettings {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

fn default_config_path() -> Result<PathBuf> {
    let base = match env::var("XDG_CONFIG_HOME") {
        Ok(value) if value.trim().is_empty() => {
            bail!("Failed to resolve config path: XDG_CONFIG_HOME is set but empty")
        }
        Ok(value) => PathBuf::from(value.trim()),
        Err(_) => dirs::home_dir()
            .map(|home| home.join(".config"))
            .ok_or_else(|| anyhow!("Failed to resolve config path: HOME directory is unavailable"))?,
    };
    Ok(base.join(APP_DIR).join(FILE_NAME))
}

fn read_config_file(path: &Path) -> Result<FileConfig> {
    let text = fs::read_to_string(path).with_context(|| {
        format!("Failed to load config {}: unable to read file", path.display())
    })?;
    toml::from_str(&text).map_err(|err| anyhow!("Failed to load config {}: {err}", path.display()))
}

fn relative_to_config(config_path: &Path, value: &str) -> PathBuf {
    let path = Path::new(value);
    match config_path.parent() {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

/// Reads an environment variable, treating blank values as unset.
fn setting(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .and_then(|value| present(Some(&value)).map(str::to_owned))
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
