// ABOUTME: Configuration management for hatenapost
// ABOUTME: Loads credentials from the XDG config file with HATENA_* overrides from the
// ABOUTME: environment or a .env file

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::client::HatenaClient;
use crate::oauth::SigningSecrets;

pub const CONFIG_FILE: &str = "config.toml";

pub const ENV_CONSUMER_KEY: &str = "HATENA_CONSUMER_KEY";
pub const ENV_CONSUMER_SECRET: &str = "HATENA_CONSUMER_SECRET";
pub const ENV_ACCESS_TOKEN: &str = "HATENA_ACCESS_TOKEN";
pub const ENV_ACCESS_TOKEN_SECRET: &str = "HATENA_ACCESS_TOKEN_SECRET";
pub const ENV_ENTRY_URL: &str = "HATENA_ENTRY_URL";

/// Get the XDG config directory for hatenapost
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("hatenapost");

    fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

    Ok(config_dir)
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE))
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub consumer_key: String,
    #[serde(default)]
    pub consumer_secret: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub access_token_secret: String,
    /// AtomPub collection URI, `https://blog.hatena.ne.jp/{user}/{blog}/atom/entry`
    #[serde(default)]
    pub entry_url: String,
    /// Author name for entries that don't set one
    pub author: Option<String>,
    /// Categories appended to every entry
    #[serde(default)]
    pub preset_categories: Vec<String>,
}

impl Config {
    /// Load config from `path` (or the default location) and apply overrides
    /// from the environment, then from `.env`. A missing file yields an empty
    /// config.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => default_config_path()?,
        };

        let mut config = if config_path.exists() {
            Self::from_file(&config_path)?
        } else {
            Config::default()
        };

        let dotenv = dotenv_values()?;
        config.apply_overrides(|name| lookup_setting(name, |var| std::env::var(var).ok(), &dotenv));
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents).context("Failed to write config file")?;
        Ok(())
    }

    /// Placeholder config written by `hatenapost init`
    pub fn template() -> Self {
        Self {
            consumer_key: "your-consumer-key".to_string(),
            consumer_secret: "your-consumer-secret".to_string(),
            access_token: "your-access-token".to_string(),
            access_token_secret: "your-access-token-secret".to_string(),
            entry_url: "your-entry-url".to_string(),
            author: None,
            preset_categories: Vec::new(),
        }
    }

    /// Overwrite credentials with non-empty values from `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fields = [
            (ENV_CONSUMER_KEY, &mut self.consumer_key),
            (ENV_CONSUMER_SECRET, &mut self.consumer_secret),
            (ENV_ACCESS_TOKEN, &mut self.access_token),
            (ENV_ACCESS_TOKEN_SECRET, &mut self.access_token_secret),
            (ENV_ENTRY_URL, &mut self.entry_url),
        ];

        for (name, field) in fields {
            if let Some(value) = lookup(name) {
                let value = value.trim();
                if !value.is_empty() {
                    *field = value.to_string();
                }
            }
        }
    }

    /// Reject empty credentials and unedited `your-...` placeholders
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("consumer_key", &self.consumer_key),
            ("consumer_secret", &self.consumer_secret),
            ("access_token", &self.access_token),
            ("access_token_secret", &self.access_token_secret),
            ("entry_url", &self.entry_url),
        ];

        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| is_unset(value))
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            anyhow::bail!(
                "Missing or placeholder settings: {}. Edit the config file (see `hatenapost init`) or set the HATENA_* environment variables",
                missing.join(", ")
            );
        }

        url::Url::parse(self.entry_url.trim())
            .with_context(|| format!("entry_url is not a valid URL: {}", self.entry_url))?;

        Ok(())
    }

    pub fn signing_secrets(&self) -> SigningSecrets {
        SigningSecrets::new(
            self.consumer_key.trim(),
            self.consumer_secret.trim(),
            self.access_token.trim(),
            self.access_token_secret.trim(),
        )
    }

    /// Validated client for the configured blog
    pub fn client(&self) -> Result<HatenaClient> {
        self.validate()?;
        Ok(HatenaClient::new(
            self.entry_url.trim().to_string(),
            self.signing_secrets(),
        ))
    }
}

/// Variables from the nearest `.env` in the working directory or its parents
fn dotenv_values() -> Result<HashMap<String, String>> {
    match dotenvy::dotenv_iter() {
        Ok(iter) => collect_dotenv(iter),
        Err(err) if err.not_found() => Ok(HashMap::new()),
        Err(err) => Err(err).context("Failed to read .env file"),
    }
}

/// Variables from a specific `.env` file, without touching the process environment
pub fn read_dotenv(path: &Path) -> Result<HashMap<String, String>> {
    let iter = dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    collect_dotenv(iter)
}

fn collect_dotenv<R: std::io::Read>(iter: dotenvy::Iter<R>) -> Result<HashMap<String, String>> {
    iter.map(|item| item.context("Failed to parse .env file"))
        .collect()
}

/// A variable already set in the environment wins over the same name in `.env`
fn lookup_setting<F>(name: &str, env: F, dotenv: &HashMap<String, String>) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    env(name)
        .filter(|value| !value.trim().is_empty())
        .or_else(|| dotenv.get(name).cloned())
}

fn is_unset(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.to_lowercase().starts_with("your")
}
