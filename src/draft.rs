// ABOUTME: Entry files for hatenapost: YAML frontmatter followed by a markdown body
// ABOUTME: Converts a parsed file plus config defaults into a BlogEntry

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::entry::{BlogEntry, Timestamp};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct EntryMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "category")]
    pub categories: Vec<String>,
    pub author: Option<String>,
    /// RFC 3339, or a local time read as UTC+9
    pub updated: Option<String>,
    #[serde(default)]
    pub draft: bool,
}

#[derive(Debug, Clone)]
pub struct EntryFile {
    pub metadata: EntryMetadata,
    pub content: String,
}

impl EntryFile {
    /// Parse an entry from a string (YAML frontmatter + content)
    pub fn from_string(source: &str) -> Result<Self> {
        let source = source.trim_start_matches('\u{feff}');

        // Split on --- delimiters
        let parts: Vec<&str> = source.splitn(3, "---").collect();

        if parts.len() < 3 || !parts[0].trim().is_empty() {
            anyhow::bail!("Invalid entry format: missing frontmatter delimiters");
        }

        let frontmatter = parts[1].trim();
        let content = parts[2].trim().to_string();

        let metadata: EntryMetadata =
            serde_yaml::from_str(frontmatter).context("Failed to parse frontmatter")?;

        Ok(Self { metadata, content })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read entry file {}", path.display()))?;
        Self::from_string(&contents)
    }

    /// Build the entry to post, filling in the configured author and preset
    /// categories
    pub fn into_entry(self, config: &Config) -> Result<BlogEntry> {
        if self.metadata.title.trim().is_empty() {
            anyhow::bail!("Entry has no title: add `title:` to the frontmatter");
        }

        let updated = self
            .metadata
            .updated
            .as_deref()
            .map(str::parse::<Timestamp>)
            .transpose()
            .context("Invalid `updated` in frontmatter")?;

        Ok(BlogEntry {
            title: self.metadata.title,
            content: self.content,
            categories: self.metadata.categories,
            preset_categories: config.preset_categories.clone(),
            author: self.metadata.author.or_else(|| config.author.clone()),
            updated,
            is_draft: self.metadata.draft,
        })
    }
}
