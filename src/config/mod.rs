use crate::models::ModelConfig;
use crate::services::normalize::validate_slug;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub locale: LocaleConfig,
    #[serde(default)]
    pub slugs: SlugsConfig,
    #[serde(default)]
    pub models: Vec<ModelConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocaleConfig {
    /// Locale a fresh `LocaleContext` starts in.
    #[serde(default = "default_locale")]
    pub default: String,
    /// Locales the CLI accepts. Empty means any.
    #[serde(default)]
    pub available: Vec<String>,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            default: default_locale(),
            available: Vec::new(),
        }
    }
}

impl LocaleConfig {
    pub fn is_available(&self, locale: &str) -> bool {
        self.available.is_empty() || self.available.iter().any(|l| l == locale)
    }
}

/// Whether a slug must be unique across all locales of a model, or only
/// among translations in the same locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UniquenessScope {
    #[default]
    Global,
    PerLocale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverKind {
    #[default]
    Sequential,
    Uuid,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SlugsConfig {
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default)]
    pub uniqueness: UniquenessScope,
    #[serde(default)]
    pub resolver: ResolverKind,
    /// Upper bound on suffixes tried by the sequential resolver.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Words that are never handed out as slugs, e.g. route names.
    #[serde(default = "default_reserved")]
    pub reserved: Vec<String>,
}

impl Default for SlugsConfig {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
            separator: default_separator(),
            uniqueness: UniquenessScope::default(),
            resolver: ResolverKind::default(),
            max_attempts: default_max_attempts(),
            reserved: default_reserved(),
        }
    }
}

impl SlugsConfig {
    pub const SEPARATORS: [&'static str; 3] = ["-", "_", "."];

    pub fn validate(&self) -> Result<()> {
        if !Self::SEPARATORS.contains(&self.separator.as_str()) {
            anyhow::bail!(
                "Invalid slug separator '{}'. Allowed separators: {}",
                self.separator,
                Self::SEPARATORS.join(" ")
            );
        }
        if self.max_length < 8 {
            anyhow::bail!("slugs.max_length must be at least 8");
        }
        if self.max_length > 200 {
            anyhow::bail!("slugs.max_length must be 200 or less");
        }
        if self.max_attempts == 0 {
            anyhow::bail!("slugs.max_attempts must be greater than 0");
        }
        // Generated slugs always have this shape, so anything else could never match.
        if let Some(word) = self.reserved.iter().find(|w| !validate_slug(w)) {
            anyhow::bail!("Reserved word '{}' is not a valid slug", word);
        }
        Ok(())
    }

    pub fn separator_char(&self) -> char {
        self.separator.chars().next().unwrap_or('-')
    }
}

fn default_pool_size() -> u32 {
    10
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_max_length() -> usize {
    100
}

fn default_separator() -> String {
    "-".to_string()
}

fn default_max_attempts() -> u32 {
    100
}

fn default_reserved() -> Vec<String> {
    ["new", "edit", "index", "session", "login", "logout", "users", "admin"]
        .iter()
        .map(|w| w.to_string())
        .collect()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!(
                "Could not read config file '{}': {}. Run `polyslug init` first?",
                path.display(),
                e
            )
        })?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.pool_size == 0 {
            anyhow::bail!("database.pool_size must be greater than 0");
        }
        if self.locale.default.trim().is_empty() {
            anyhow::bail!("locale.default cannot be empty");
        }
        if !self.locale.is_available(&self.locale.default) {
            anyhow::bail!(
                "locale.default '{}' is not listed in locale.available",
                self.locale.default
            );
        }
        self.slugs.validate()?;

        let mut seen = std::collections::HashSet::new();
        for model in &self.models {
            if !seen.insert(model.name.as_str()) {
                anyhow::bail!("model '{}' is declared more than once", model.name);
            }
        }
        Ok(())
    }

    pub fn model(&self, name: &str) -> Option<&ModelConfig> {
        self.models.iter().find(|m| m.name == name)
    }
}
