//! Configuration file parser for feed definitions (`feedkit.toml`).
//!
//! The config file is optional: a missing file yields `Config::default()`,
//! which defines no feeds. Unknown top-level keys are accepted and logged.
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::routing::RouteParams;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Where a feed points: a literal URI or a route resolved at render time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Link {
    Uri(String),
    Route {
        route_name: String,
        #[serde(default)]
        route_params: RouteParams,
    },
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

/// Settings of one named feed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedConfig {
    pub title: String,
    pub description: String,
    pub link: Link,

    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Required by the Atom formatter only.
    #[serde(default)]
    pub author: Option<String>,

    /// Any other string parameter, reachable through `Feed::get`.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl FeedConfig {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            link: Link::Uri(link.into()),
            encoding: default_encoding(),
            author: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn with_link(mut self, link: Link) -> Self {
        self.link = link;
        self
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Feed definitions keyed by feed name.
    pub feeds: BTreeMap<String, FeedConfig>,

    /// Route templates (`name = "/path/{param}"`) used to generate links.
    pub routes: BTreeMap<String, String>,

    /// Message catalogs keyed by translation domain.
    pub translations: BTreeMap<String, BTreeMap<String, String>>,

    /// Domain passed to the translator by the formatters.
    pub translation_domain: Option<String>,
}

impl Config {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 4] =
        ["feeds", "routes", "translations", "translation_domain"];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        let config = Self::parse(&content)?;
        tracing::info!(
            path = %path.display(),
            feeds = config.feeds.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        Ok(toml::from_str(content)?)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FULL: &str = r#"
translation_domain = "feeds"

[feeds.article]
title = "My articles/posts"
description = "Latests articles"
link = "http://github.com/eko/FeedBundle"
encoding = "utf-8"
author = "Vincent Composieux"
copyright = "CC-BY"

[feeds.routed]
title = "Routed"
description = "Link from a route"
link = { route_name = "home", route_params = { page = "1" } }

[routes]
home = "/page/{page}"

[translations.feeds]
"My articles/posts" = "Mes articles"
"#;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.feeds.is_empty());
        assert!(config.routes.is_empty());
        assert!(config.translation_domain.is_none());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/feedkit_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert!(config.feeds.is_empty());
    }

    #[test]
    fn test_whitespace_only_returns_default() {
        let config = Config::parse("   \n  \n  ").unwrap();
        assert!(config.feeds.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(FULL).unwrap();

        let article = &config.feeds["article"];
        assert_eq!(article.title, "My articles/posts");
        assert_eq!(article.link, Link::Uri("http://github.com/eko/FeedBundle".into()));
        assert_eq!(article.author.as_deref(), Some("Vincent Composieux"));
        assert_eq!(article.extra.get("copyright").map(String::as_str), Some("CC-BY"));

        let routed = &config.feeds["routed"];
        assert_eq!(routed.encoding, "utf-8");
        assert_eq!(routed.author, None);
        match &routed.link {
            Link::Route {
                route_name,
                route_params,
            } => {
                assert_eq!(route_name, "home");
                assert_eq!(route_params.get("page").map(String::as_str), Some("1"));
            }
            other => panic!("expected a route link, got {:?}", other),
        }

        assert_eq!(config.routes["home"], "/page/{page}");
        assert_eq!(config.translation_domain.as_deref(), Some("feeds"));
        assert_eq!(
            config.translations["feeds"]["My articles/posts"],
            "Mes articles"
        );
    }

    #[test]
    fn test_missing_required_key_is_an_error() {
        let result = Config::parse("[feeds.article]\ntitle = \"only a title\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let err = Config::parse("this is not [valid toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let config = Config::parse("totally_fake_key = \"should not fail\"\n").unwrap();
        assert!(config.feeds.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join("feedkit_config_test_load");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("feedkit.toml");
        std::fs::write(&path, FULL).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.feeds.len(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }

    // SEC-014: File size limit
    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("feedkit_config_test_too_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("feedkit.toml");
        std::fs::write(&path, "a".repeat(1_048_577)).unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
