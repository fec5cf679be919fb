//! Alignment configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{DraftError, DraftResult};

/// Name of the default consensus strategy.
pub const DEFAULT_CONSENSUS_STRATEGY: &str = "highest_confidence";

static DEFAULT_CONFIG: Lazy<AlignmentConfig> = Lazy::new(AlignmentConfig::default);

/// Configuration for tokenized draft alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Consensus strategy used when a request does not name one.
    pub consensus_strategy: String,
    pub scoring: ScoringConfig,
    pub confidence: ConfidenceConfig,
    pub transport: TransportConfig,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            consensus_strategy: DEFAULT_CONSENSUS_STRATEGY.to_string(),
            scoring: ScoringConfig::default(),
            confidence: ConfidenceConfig::default(),
            transport: TransportConfig::default(),
        }
    }
}

/// Integer scores for the alignment dynamic program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Score for two tokens that compare equal (case-insensitive).
    pub match_score: i64,
    /// Score for two tokens placed in the same column that differ.
    pub mismatch_score: i64,
    /// Score for a token placed against a gap. Must be negative.
    pub gap_penalty: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            match_score: 2,
            mismatch_score: -1,
            gap_penalty: -1,
        }
    }
}

/// Confidence constants and classification thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    /// Confidence of a column where every non-gap token agrees.
    pub agreed: f64,
    /// Confidence of a column with differing tokens.
    pub mismatched: f64,
    /// Scores at or above this are `high`.
    pub high_threshold: f64,
    /// Scores at or above this (and below `high_threshold`) are `medium`.
    pub medium_threshold: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            agreed: 0.95,
            mismatched: 0.3,
            high_threshold: 0.8,
            medium_threshold: 0.5,
        }
    }
}

/// Retry policy for requests to an alignment backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Retries after the first failed attempt (0 or 1).
    pub max_retries: u32,
    /// Fixed pause before the retry, in milliseconds.
    pub backoff_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff_ms: 250,
        }
    }
}

impl TransportConfig {
    /// Policy without retries or backoff, used by in-process callers and tests.
    pub fn immediate() -> Self {
        Self {
            max_retries: 0,
            backoff_ms: 0,
        }
    }

    pub fn backoff(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.backoff_ms)
    }
}

impl AlignmentConfig {
    /// Process-wide default configuration.
    pub fn shared_default() -> &'static AlignmentConfig {
        &DEFAULT_CONFIG
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> DraftResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| DraftError::config(path.display().to_string(), e.to_string()))?;
        Self::parse_named(&content, &path.display().to_string())
    }

    /// Parse from a TOML string.
    pub fn from_toml_str(content: &str) -> DraftResult<Self> {
        Self::parse_named(content, "<inline>")
    }

    fn parse_named(content: &str, name: &str) -> DraftResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| DraftError::config(name, e.to_string()))?;
        config
            .validate()
            .map_err(|message| DraftError::config(name, message))?;
        debug!(source = name, strategy = %config.consensus_strategy, "loaded alignment config");
        Ok(config)
    }

    /// Check the invariants the aligner and analyzer rely on.
    pub fn validate(&self) -> Result<(), String> {
        let scoring = &self.scoring;
        if scoring.match_score <= scoring.mismatch_score {
            return Err(format!(
                "match_score ({}) must be greater than mismatch_score ({})",
                scoring.match_score, scoring.mismatch_score
            ));
        }
        if scoring.gap_penalty >= 0 {
            return Err(format!(
                "gap_penalty ({}) must be negative",
                scoring.gap_penalty
            ));
        }

        let confidence = &self.confidence;
        let unit = 0.0..=1.0;
        if !unit.contains(&confidence.mismatched)
            || !unit.contains(&confidence.agreed)
            || confidence.mismatched >= confidence.agreed
        {
            return Err(format!(
                "confidence must satisfy 0 <= mismatched ({}) < agreed ({}) <= 1",
                confidence.mismatched, confidence.agreed
            ));
        }
        if !unit.contains(&confidence.medium_threshold)
            || !unit.contains(&confidence.high_threshold)
            || confidence.medium_threshold > confidence.high_threshold
        {
            return Err(format!(
                "thresholds must satisfy 0 <= medium ({}) <= high ({}) <= 1",
                confidence.medium_threshold, confidence.high_threshold
            ));
        }

        if self.transport.max_retries > 1 {
            return Err(format!(
                "max_retries ({}) must be 0 or 1",
                self.transport.max_retries
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
    fn empty_document_is_default() {
        let config = AlignmentConfig::from_toml_str("").unwrap();
        assert_eq!(&config, AlignmentConfig::shared_default());
        assert_eq!(config.consensus_strategy, "highest_confidence");
        assert_eq!(config.transport.max_retries, 1);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = AlignmentConfig::from_toml_str(
            r#"
            consensus_strategy = "majority"

            [confidence]
            agreed = 0.9
            "#,
        )
        .unwrap();
        assert_eq!(config.consensus_strategy, "majority");
        assert_eq!(config.confidence.agreed, 0.9);
        assert_eq!(config.confidence.mismatched, 0.3);
        assert_eq!(config.scoring, ScoringConfig::default());
    }

    #[test]
    fn rejects_inverted_confidence() {
        let err = AlignmentConfig::from_toml_str(
            r#"
            [confidence]
            agreed = 0.2
            mismatched = 0.4
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, DraftError::Config { .. }));
        assert!(err.to_string().contains("mismatched"));
    }

    #[test]
    fn rejects_non_negative_gap_penalty() {
        let err = AlignmentConfig::from_toml_str("[scoring]\ngap_penalty = 0\n").unwrap_err();
        assert!(err.to_string().contains("gap_penalty"));
    }

    #[test]
    fn rejects_more_than_one_retry() {
        let err = AlignmentConfig::from_toml_str("[transport]\nmax_retries = 3\n").unwrap_err();
        assert!(err.to_string().contains("max_retries"));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[transport]\nbackoff_ms = 10").unwrap();
        let config = AlignmentConfig::load(file.path()).unwrap();
        assert_eq!(config.transport.backoff_ms, 10);
        assert_eq!(config.transport.backoff(), std::time::Duration::from_millis(10));
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let err = AlignmentConfig::load(Path::new("/nonexistent/align.toml")).unwrap_err();
        assert!(matches!(err, DraftError::Config { .. }));
    }
}
