// ABOUTME: Command handlers for posting entries and managing configuration
// ABOUTME: Orchestrates entry file loading, config validation, and the signed post

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::{default_config_path, Config};
use crate::draft::EntryFile;
use crate::entry::BlogEntry;
use crate::oauth::redact;
use crate::response::PostResult;

/// Command-line adjustments applied on top of the entry file
#[derive(Debug, Clone, Default)]
pub struct EntryOverrides {
    pub draft: bool,
    pub categories: Vec<String>,
}

/// Load an entry file and apply config defaults and overrides
pub fn build_entry(path: &Path, config: &Config, overrides: &EntryOverrides) -> Result<BlogEntry> {
    let mut entry = EntryFile::load(path)?.into_entry(config)?;

    if overrides.draft {
        entry.is_draft = true;
    }
    entry.categories.extend(overrides.categories.iter().cloned());

    Ok(entry)
}

/// Post an entry file. Returns the parsed result whether or not the service
/// accepted it.
pub async fn cmd_post(
    path: &Path,
    config_path: Option<&Path>,
    overrides: &EntryOverrides,
) -> Result<PostResult> {
    let config = Config::load(config_path)?;
    let client = config.client()?;
    let entry = build_entry(path, &config, overrides)?;

    println!("Posting \"{}\" to {}...", entry.title, client.endpoint());
    let result = client
        .post(&entry)
        .await
        .context("Failed to post entry")?;

    if result.is_success() {
        println!("✓ Posted successfully!");
        println!("  Title: {}", result.title);
        if result.is_draft {
            println!("  Status: draft");
        }
        println!("  URL: {}", result.link_alternate);
        println!("  Edit: {}", result.link_edit_user);
    } else {
        eprintln!("✗ Post failed with status {}", result.status_code);
    }

    Ok(result)
}

/// Print the request document without sending it
pub fn cmd_render(
    path: &Path,
    config_path: Option<&Path>,
    overrides: &EntryOverrides,
) -> Result<()> {
    let config = Config::load(config_path)?;
    let entry = build_entry(path, &config, overrides)?;
    println!("{}", entry.to_xml()?);
    Ok(())
}

/// Validate configuration and show what would be used
pub fn cmd_check(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    config.validate()?;

    println!("Configuration OK");
    println!("  Entry URL: {}", config.entry_url);
    println!("  Consumer key: {}", redact(&config.consumer_key));
    println!("  Access token: {}", redact(&config.access_token));
    if let Some(author) = &config.author {
        println!("  Author: {}", author);
    }
    if !config.preset_categories.is_empty() {
        println!("  Preset categories: {}", config.preset_categories.join(", "));
    }
    Ok(())
}

/// Write a template config file, refusing to overwrite an existing one
pub fn cmd_init(config_path: Option<&Path>) -> Result<PathBuf> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };

    if path.exists() {
        anyhow::bail!("Config file already exists: {}", path.display());
    }

    Config::template().save(&path)?;
    println!("Config written to {}", path.display());
    println!("Fill in your API keys from the blog's advanced settings page.");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_build_entry_applies_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entry.md");
        fs::write(&path, "---\ntitle: T\ncategories: [A, B]\n---\nbody").unwrap();

        let config = Config {
            preset_categories: vec!["C".to_string()],
            author: Some("alice".to_string()),
            ..Default::default()
        };
        let overrides = EntryOverrides {
            draft: true,
            categories: vec!["D".to_string()],
        };

        let entry = build_entry(&path, &config, &overrides).unwrap();
        assert!(entry.is_draft);
        assert_eq!(entry.author.as_deref(), Some("alice"));
        assert_eq!(entry.all_categories().collect::<Vec<_>>(), vec!["A", "B", "D", "C"]);
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        cmd_init(Some(&path)).unwrap();
        assert!(path.exists());
        assert!(cmd_init(Some(&path)).is_err());
    }
}
