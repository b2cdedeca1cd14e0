use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::features::FeatureVector;
use crate::core::record::{InvalidRecordError, PersonRecord};
use crate::core::types::{Flag, Recommendation};
use crate::matching::batch::{BatchMatch, BatchScanner, BlockingKind, NoBlocking};
use crate::matching::classifier::{Classifier, RuleBasedClassifier, ScoringWeights};
use crate::matching::features::FeatureExtractor;
use crate::matching::flags::evaluate_flags;

/// Default minimum probability for a pair to be reported by a batch scan
pub const DEFAULT_THRESHOLD: f64 = 0.7;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration for the duplicate detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum probability for including a pair in batch results
    pub threshold: f64,
    /// Declared face embedding dimensionality; unchecked when absent
    pub embedding_dim: Option<usize>,
    /// Weights for the rule-based classifier
    pub weights: ScoringWeights,
    /// Pre-grouping applied before pairwise comparison in batch scans
    pub blocking: BlockingKind,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            embedding_dim: None,
            weights: ScoringWeights::default(),
            blocking: BlockingKind::None,
        }
    }
}

impl MatchingConfig {
    /// Load configuration from a JSON file; missing fields take their defaults
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for a threshold outside [0, 1], a
    /// negative or non-finite weight, all-zero weights, or a zero embedding
    /// dimensionality.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::Invalid(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }

        let weights = self.weights.to_array();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ConfigError::Invalid(
                "weights must be finite and non-negative".to_string(),
            ));
        }
        if self.weights.total() <= 0.0 {
            return Err(ConfigError::Invalid(
                "at least one weight must be positive".to_string(),
            ));
        }

        if self.embedding_dim == Some(0) {
            return Err(ConfigError::Invalid(
                "embedding_dim must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Outcome of comparing two records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub duplicate_probability: f64,
    pub confidence: f64,
    pub features: FeatureVector,
    pub flags: Vec<Flag>,
    pub recommendation: Recommendation,
}

/// Runs the full pipeline for a record pair: features, classifier, flags.
///
/// The classifier is chosen at construction time and shared read-only, so a
/// detector can be used from many threads at once.
pub struct DuplicateDetector {
    extractor: FeatureExtractor,
    classifier: Arc<dyn Classifier>,
    config: MatchingConfig,
}

impl std::fmt::Debug for DuplicateDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateDetector")
            .field("extractor", &self.extractor)
            .field("classifier", &self.classifier.name())
            .field("config", &self.config)
            .finish()
    }
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl DuplicateDetector {
    /// Create a detector with the default configuration and rule-based classifier
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MatchingConfig::default())
    }

    /// Create a detector whose rule-based classifier uses the configured weights
    #[must_use]
    pub fn with_config(config: MatchingConfig) -> Self {
        let extractor = match config.embedding_dim {
            Some(dim) => FeatureExtractor::with_embedding_dim(dim),
            None => FeatureExtractor::new(),
        };
        let classifier = Arc::new(RuleBasedClassifier::with_weights(config.weights.clone()));

        Self {
            extractor,
            classifier,
            config,
        }
    }

    /// Replace the classifier, keeping feature extraction and scanning unchanged
    #[must_use]
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = classifier;
        self
    }

    #[must_use]
    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    #[must_use]
    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Compare two records.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRecordError` only for hard contract violations;
    /// missing optional fields simply score 0.0.
    pub fn compare(
        &self,
        a: &PersonRecord,
        b: &PersonRecord,
    ) -> Result<ComparisonResult, InvalidRecordError> {
        let features = self.extractor.extract(a, b)?;
        Ok(self.score(features))
    }

    /// Classify an already extracted feature vector
    #[must_use]
    pub fn score(&self, features: FeatureVector) -> ComparisonResult {
        let score = self.classifier.score(&features);

        ComparisonResult {
            duplicate_probability: score.probability,
            confidence: score.confidence,
            flags: evaluate_flags(&features),
            recommendation: Recommendation::from_probability(score.probability),
            features,
        }
    }

    /// A batch scanner using this detector's threshold and blocking
    #[must_use]
    pub fn scanner(&self) -> BatchScanner<'_> {
        BatchScanner::new(self)
            .with_threshold(self.config.threshold)
            .with_blocking(self.config.blocking.strategy())
    }

    /// Scan all N(N-1)/2 pairs and return those with probability ≥ `threshold`.
    ///
    /// Always exhaustive: the configured blocking strategy is ignored here; use
    /// [`DuplicateDetector::scanner`] for a blocked scan. Pairs that hard-fail
    /// are logged and skipped. See [`BatchScanner::with_threshold`] for how
    /// out-of-range thresholds are treated.
    #[must_use]
    pub fn batch_scan(&self, records: &[PersonRecord], threshold: f64) -> Vec<BatchMatch> {
        BatchScanner::new(self)
            .with_threshold(threshold)
            .with_blocking(Arc::new(NoBlocking))
            .scan(records, None)
            .matches
    }
}
