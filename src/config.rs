use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::FixedOffset;

use crate::grouping::DEFAULT_MIN_LIKELIHOOD;
use crate::source::{clamp_amount, DEFAULT_AMOUNT};

/// Where posts are loaded from.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceKind {
    /// A JSON file on disk
    File(PathBuf),
    /// A GraphQL endpoint serving `allPosts`
    Graphql(String),
}

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Command-line
/// flags override individual fields after loading.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to a posts JSON file (POSTLENS_INPUT)
    pub input_path: Option<PathBuf>,
    /// GraphQL endpoint URL (POSTLENS_GRAPHQL_URL)
    pub graphql_url: Option<String>,
    /// Maximum number of posts to fetch, 1..=1000 (POSTLENS_AMOUNT)
    pub amount: u32,
    /// Topic likelihood threshold (POSTLENS_MIN_LIKELIHOOD)
    pub min_likelihood: f64,
    /// Offset from UTC, in minutes, used to assign posts to months
    /// (POSTLENS_UTC_OFFSET_MINUTES)
    pub utc_offset_minutes: i32,
    /// Fail on the first post with an unusable timestamp instead of skipping it
    pub strict_timestamps: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: None,
            graphql_url: None,
            amount: DEFAULT_AMOUNT,
            min_likelihood: DEFAULT_MIN_LIKELIHOOD,
            utc_offset_minutes: 0,
            strict_timestamps: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default except the source, which is checked by
    /// `require_source` once flags have been applied.
    pub fn load() -> Result<Self> {
        let defaults = Self::default();

        let amount = match env::var("POSTLENS_AMOUNT") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("POSTLENS_AMOUNT must be a whole number, got {raw:?}"))?,
            Err(_) => defaults.amount,
        };

        let min_likelihood = match env::var("POSTLENS_MIN_LIKELIHOOD") {
            Ok(raw) => raw.trim().parse::<f64>().with_context(|| {
                format!("POSTLENS_MIN_LIKELIHOOD must be a number, got {raw:?}")
            })?,
            Err(_) => defaults.min_likelihood,
        };

        let utc_offset_minutes = match env::var("POSTLENS_UTC_OFFSET_MINUTES") {
            Ok(raw) => raw.trim().parse::<i32>().with_context(|| {
                format!("POSTLENS_UTC_OFFSET_MINUTES must be a whole number, got {raw:?}")
            })?,
            Err(_) => defaults.utc_offset_minutes,
        };

        Ok(Self {
            input_path: env::var("POSTLENS_INPUT")
                .ok()
                .filter(|raw| !raw.trim().is_empty())
                .map(PathBuf::from),
            graphql_url: env::var("POSTLENS_GRAPHQL_URL").ok(),
            amount,
            min_likelihood,
            utc_offset_minutes,
            strict_timestamps: false,
        })
    }

    /// Pick the post source. A file wins over an endpoint when both are set.
    pub fn require_source(&self) -> Result<SourceKind> {
        if let Some(path) = self.input_path.as_ref().filter(|p| !p.as_os_str().is_empty()) {
            return Ok(SourceKind::File(path.clone()));
        }
        match &self.graphql_url {
            Some(url) if !url.is_empty() => Ok(SourceKind::Graphql(url.clone())),
            _ => anyhow::bail!(
                "No post source configured. Pass --input <file> or --endpoint <url>,\n\
                 or set POSTLENS_INPUT / POSTLENS_GRAPHQL_URL in your .env file."
            ),
        }
    }

    /// Check the threshold is usable: a number in [0, 1].
    pub fn require_valid_threshold(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_likelihood) {
            anyhow::bail!(
                "Minimum likelihood must be between 0 and 1, got {}",
                self.min_likelihood
            );
        }
        Ok(())
    }

    /// The configured batch size, clamped to the supported range.
    pub fn effective_amount(&self) -> u32 {
        clamp_amount(self.amount)
    }

    /// The configured month offset as a chrono offset.
    pub fn utc_offset(&self) -> Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "UTC offset must be within ±24 hours, got {} minutes",
                    self.utc_offset_minutes
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_source_wins() {
        let config = Config {
            input_path: Some(PathBuf::from("posts.json")),
            graphql_url: Some("http://localhost:4000/graphql".to_string()),
            ..Config::default()
        };
        assert_eq!(
            config.require_source().unwrap(),
            SourceKind::File(PathBuf::from("posts.json"))
        );
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let config = Config::default();
        assert!(config.require_source().is_err());

        let config = Config {
            graphql_url: Some(String::new()),
            ..Config::default()
        };
        assert!(config.require_source().is_err());
    }

    #[test]
    fn test_empty_input_path_is_ignored() {
        let config = Config {
            input_path: Some(PathBuf::new()),
            ..Config::default()
        };
        assert!(config.require_source().is_err());

        let config = Config {
            input_path: Some(PathBuf::new()),
            graphql_url: Some("http://localhost:4000/graphql".to_string()),
            ..Config::default()
        };
        assert_eq!(
            config.require_source().unwrap(),
            SourceKind::Graphql("http://localhost:4000/graphql".to_string())
        );
    }

    #[test]
    fn test_threshold_range() {
        let mut config = Config::default();
        assert!(config.require_valid_threshold().is_ok());
        config.min_likelihood = 1.5;
        assert!(config.require_valid_threshold().is_err());
        config.min_likelihood = f64::NAN;
        assert!(config.require_valid_threshold().is_err());
    }

    #[test]
    fn test_amount_is_clamped() {
        let config = Config {
            amount: 5000,
            ..Config::default()
        };
        assert_eq!(config.effective_amount(), 1000);
    }

    #[test]
    fn test_utc_offset() {
        let config = Config {
            utc_offset_minutes: 120,
            ..Config::default()
        };
        assert_eq!(config.utc_offset().unwrap().local_minus_utc(), 7200);

        let config = Config {
            utc_offset_minutes: 24 * 60,
            ..Config::default()
        };
        assert!(config.utc_offset().is_err());
    }
}
