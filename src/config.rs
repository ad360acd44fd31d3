//! Repository configuration
//!
//! Read from `.twig/config.toml` when present:
//!
//! ```toml
//! [author]
//! name = "Jane Doe"
//! email = "jane@example.com"
//!
//! [commit]
//! id_width = 6
//! ```
//!
//! `TWIG_AUTHOR_NAME`, `TWIG_AUTHOR_EMAIL` and `TWIG_AUTHOR_DATE` override the file.

use crate::artifacts::objects::commit::{Author, CommitIdWidth, Signature};
use anyhow::Context;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

pub const CONFIG_FILE: &str = "config.toml";

pub const AUTHOR_NAME_ENV: &str = "TWIG_AUTHOR_NAME";
pub const AUTHOR_EMAIL_ENV: &str = "TWIG_AUTHOR_EMAIL";
pub const AUTHOR_DATE_ENV: &str = "TWIG_AUTHOR_DATE";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub author: AuthorConfig,
    pub commit: CommitConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorConfig {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitConfig {
    pub id_width: CommitIdWidth,
}

impl Config {
    /// Load `config.toml` from the metadata directory, or defaults if there is none
    pub fn load(metadata_path: &Path) -> anyhow::Result<Self> {
        let config_path = metadata_path.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {:?}", config_path))?;

        Self::parse(&content).with_context(|| format!("invalid config {:?}", config_path))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Author and timestamp for a new commit, taken from the process environment
    pub fn signature(&self) -> Signature {
        self.signature_from(|key| std::env::var(key).ok())
    }

    pub fn signature_from<F>(&self, lookup: F) -> Signature
    where
        F: Fn(&str) -> Option<String>,
    {
        let name = lookup(AUTHOR_NAME_ENV)
            .or_else(|| self.author.name.clone())
            .or_else(|| lookup("USER"))
            .or_else(|| lookup("USERNAME"))
            .unwrap_or_default();
        let email = lookup(AUTHOR_EMAIL_ENV)
            .or_else(|| self.author.email.clone())
            .unwrap_or_default();
        let timestamp = lookup(AUTHOR_DATE_ENV)
            .and_then(|date_str| {
                let parsed = parse_timestamp(&date_str);
                if parsed.is_none() {
                    warn!(value = %date_str, "ignoring unparseable {AUTHOR_DATE_ENV}");
                }
                parsed
            })
            .unwrap_or_else(|| chrono::Local::now().fixed_offset());

        Signature::new(Author::new(name, email), timestamp)
    }
}

fn parse_timestamp(date_str: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc2822(date_str)
        .or_else(|_| DateTime::parse_from_str(date_str, "%Y-%m-%d %H:%M:%S %z"))
        .ok()
}
