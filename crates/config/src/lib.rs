//! Configuration loading and validation for deskhand.
//!
//! Loads configuration from a `deskhand.toml` file with serde field
//! defaults, so an empty file (or no file at all) yields a fully working
//! configuration. Everything tunable in the agent core lives here:
//! search relevance floors, snippet caps, result limits, and the
//! comment-deduplication windows.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// The root configuration structure.
///
/// Maps directly to `deskhand.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    /// Search gateway tuning.
    #[serde(default)]
    pub search: SearchConfig,

    /// Comment-deduplication tuning.
    #[serde(default)]
    pub dedup: DedupConfig,

    /// Response synthesis tuning.
    #[serde(default)]
    pub synthesis: SynthesisConfig,
}

/// Search gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Maximum matches requested per index (tickets, articles).
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,

    /// Excerpt length in characters for display hits.
    #[serde(default = "default_excerpt_len")]
    pub excerpt_len: usize,
}

fn default_result_limit() -> usize {
    5
}
fn default_excerpt_len() -> usize {
    200
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            result_limit: default_result_limit(),
            excerpt_len: default_excerpt_len(),
        }
    }
}

/// Duplicate-comment suppression settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DedupConfig {
    /// Identical (ticket, body) comment submissions within this many
    /// seconds are acknowledged but not re-posted.
    #[serde(default = "default_dedup_window_secs")]
    pub window_secs: u64,

    /// Cache entries older than this are purged opportunistically.
    #[serde(default = "default_dedup_purge_secs")]
    pub purge_secs: u64,
}

fn default_dedup_window_secs() -> u64 {
    5
}
fn default_dedup_purge_secs() -> u64 {
    60
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            window_secs: default_dedup_window_secs(),
            purge_secs: default_dedup_purge_secs(),
        }
    }
}

/// Response synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SynthesisConfig {
    /// Minimum similarity for a knowledge-base snippet to be quoted.
    #[serde(default = "default_article_floor")]
    pub article_floor: f32,

    /// Minimum similarity for a similar-ticket mention.
    #[serde(default = "default_ticket_floor")]
    pub ticket_floor: f32,

    /// Maximum knowledge-base snippets per reply.
    #[serde(default = "default_max_article_snippets")]
    pub max_article_snippets: usize,

    /// Maximum similar-ticket mentions per reply.
    #[serde(default = "default_max_ticket_mentions")]
    pub max_ticket_mentions: usize,
}

fn default_article_floor() -> f32 {
    0.4
}
fn default_ticket_floor() -> f32 {
    0.3
}
fn default_max_article_snippets() -> usize {
    2
}
fn default_max_ticket_mentions() -> usize {
    2
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            article_floor: default_article_floor(),
            ticket_floor: default_ticket_floor(),
            max_article_snippets: default_max_article_snippets(),
            max_ticket_mentions: default_max_ticket_mentions(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file. A missing file yields the
    /// defaults; a present file is parsed and validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse configuration from a TOML string and validate it.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.result_limit == 0 {
            return Err(ConfigError::Invalid(
                "search.result_limit must be at least 1".into(),
            ));
        }
        for (name, floor) in [
            ("synthesis.article_floor", self.synthesis.article_floor),
            ("synthesis.ticket_floor", self.synthesis.ticket_floor),
        ] {
            if !(0.0..=1.0).contains(&floor) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within [0.0, 1.0], got {floor}"
                )));
            }
        }
        if self.dedup.purge_secs < self.dedup.window_secs {
            return Err(ConfigError::Invalid(
                "dedup.purge_secs must not be shorter than dedup.window_secs".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_spec_values() {
        let config = AppConfig::default();
        assert_eq!(config.search.result_limit, 5);
        assert_eq!(config.dedup.window_secs, 5);
        assert_eq!(config.dedup.purge_secs, 60);
        assert!((config.synthesis.article_floor - 0.4).abs() < f32::EPSILON);
        assert!((config.synthesis.ticket_floor - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.synthesis.max_article_snippets, 2);
        assert_eq!(config.synthesis.max_ticket_mentions, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [synthesis]
            article_floor = 0.6

            [dedup]
            window_secs = 10
            purge_secs = 120
            "#,
        )
        .unwrap();
        assert!((config.synthesis.article_floor - 0.6).abs() < f32::EPSILON);
        assert_eq!(config.synthesis.max_article_snippets, 2);
        assert_eq!(config.dedup.window_secs, 10);
        assert_eq!(config.search.result_limit, 5);
    }

    #[test]
    fn invalid_floor_is_rejected() {
        let err = AppConfig::from_toml("[synthesis]\narticle_floor = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("article_floor"));
    }

    #[test]
    fn purge_shorter_than_window_is_rejected() {
        let err = AppConfig::from_toml("[dedup]\nwindow_secs = 30\npurge_secs = 10\n").unwrap_err();
        assert!(err.to_string().contains("purge_secs"));
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let config = AppConfig::load("/nonexistent/deskhand.toml").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[search]\nresult_limit = 8").unwrap();
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.search.result_limit, 8);
    }

    #[test]
    fn zero_result_limit_is_rejected() {
        let err = AppConfig::from_toml("[search]\nresult_limit = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
