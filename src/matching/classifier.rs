use serde::{Deserialize, Serialize};

use crate::core::features::{clamp_unit, FeatureVector};

/// Output of a classifier for one feature vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Probability that both records describe the same person, in [0, 1]
    pub probability: f64,
    /// How much the feature vector supports the probability, in [0, 1]
    pub confidence: f64,
}

/// Maps a feature vector to a duplicate probability.
///
/// Implementations must be pure: the detector shares one instance across
/// worker threads and calls it concurrently.
pub trait Classifier: Send + Sync {
    /// Short identifier used in logs and reports
    fn name(&self) -> &str;

    fn score(&self, features: &FeatureVector) -> Score;
}

/// Multiplier applied when enough independent signals corroborate each other
pub const CORROBORATION_BOOST: f64 = 1.2;

/// Number of corroborating signals needed for the boost
pub const CORROBORATION_MIN_SIGNALS: usize = 3;

/// Face similarity above which the biometric override applies
pub const FACE_OVERRIDE_SIMILARITY: f64 = 0.9;

/// Probability floor imposed by the biometric override
pub const FACE_OVERRIDE_FLOOR: f64 = 0.95;

/// Per-feature weights of the rule-based classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub name: f64,
    pub father_name: f64,
    pub mother_name: f64,
    pub dob: f64,
    pub address: f64,
    pub phone: f64,
    pub id: f64,
    pub face: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            name: 0.25,
            father_name: 0.10,
            mother_name: 0.10,
            dob: 0.20,
            address: 0.15,
            phone: 0.05,
            id: 0.05,
            face: 0.10,
        }
    }
}

impl ScoringWeights {
    /// Weights in `FeatureVector` order
    #[must_use]
    pub fn to_array(&self) -> [f64; 8] {
        [
            self.name,
            self.father_name,
            self.mother_name,
            self.dob,
            self.address,
            self.phone,
            self.id,
            self.face,
        ]
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.to_array().iter().sum()
    }

    /// Weighted sum of the features
    #[must_use]
    pub fn apply(&self, features: &FeatureVector) -> f64 {
        self.to_array()
            .iter()
            .zip(features.to_array())
            .map(|(w, f)| w * f)
            .sum()
    }
}

/// Transparent weighted-rule classifier.
///
/// 1. Weighted sum of the features.
/// 2. If at least three of {name > 0.8, exact DOB, address > 0.7, exact phone,
///    face > 0.9} hold, the sum is multiplied by 1.2 (capped at 1.0).
/// 3. A face similarity above 0.9 lifts the probability to at least 0.95.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedClassifier {
    weights: ScoringWeights,
}

impl RuleBasedClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Number of strong, independent signals present
    fn corroborating_signals(features: &FeatureVector) -> usize {
        [
            features.name_similarity > 0.8,
            features.dob_match >= 1.0,
            features.address_similarity > 0.7,
            features.phone_match >= 1.0,
            features.face_similarity > FACE_OVERRIDE_SIMILARITY,
        ]
        .into_iter()
        .filter(|signal| *signal)
        .count()
    }

    fn probability(&self, features: &FeatureVector) -> f64 {
        let mut probability = self.weights.apply(features);

        if Self::corroborating_signals(features) >= CORROBORATION_MIN_SIGNALS {
            probability = (probability * CORROBORATION_BOOST).min(1.0);
        }

        if features.face_similarity > FACE_OVERRIDE_SIMILARITY {
            probability = probability.max(FACE_OVERRIDE_FLOOR);
        }

        clamp_unit(probability)
    }
}

/// Confidence from how complete and how decisive the feature vector is
#[must_use]
pub fn feature_confidence(features: &FeatureVector) -> f64 {
    clamp_unit(0.5 + 0.3 * features.completeness() + 0.2 * features.range())
}

impl Classifier for RuleBasedClassifier {
    fn name(&self) -> &str {
        "rule_based"
    }

    fn score(&self, features: &FeatureVector) -> Score {
        Score {
            probability: self.probability(features),
            confidence: feature_confidence(features),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(features: &FeatureVector) -> Score {
        RuleBasedClassifier::new().score(features)
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!((ScoringWeights::default().total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_features() {
        let s = score(&FeatureVector::default());
        assert!(s.probability.abs() < f64::EPSILON);
        // No signal and no spread
        assert!((s.confidence - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_weighted_sum_without_boost() {
        let features = FeatureVector {
            name_similarity: 1.0,
            dob_match: 1.0,
            ..FeatureVector::default()
        };
        // Two signals: no boost
        let s = score(&features);
        assert!((s.probability - 0.45).abs() < 1e-12);
        assert!((s.confidence - (0.5 + 0.3 * 0.25 + 0.2)).abs() < 1e-12);
    }

    #[test]
    fn test_corroboration_boost() {
        let features = FeatureVector {
            name_similarity: 1.0,
            dob_match: 1.0,
            phone_match: 1.0,
            ..FeatureVector::default()
        };
        let s = score(&features);
        assert!((s.probability - 0.50 * 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_boost_is_capped() {
        let features = FeatureVector::from_array([1.0; 8]);
        let s = score(&features);
        assert!((s.probability - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_face_override() {
        let features = FeatureVector {
            face_similarity: 0.95,
            ..FeatureVector::default()
        };
        let s = score(&features);
        assert!((s.probability - FACE_OVERRIDE_FLOOR).abs() < f64::EPSILON);

        // At exactly 0.9 the override does not apply
        let features = FeatureVector {
            face_similarity: 0.9,
            ..FeatureVector::default()
        };
        assert!((score(&features).probability - 0.09).abs() < 1e-12);
    }

    #[test]
    fn test_custom_weights() {
        let weights = ScoringWeights {
            name: 1.0,
            father_name: 0.0,
            mother_name: 0.0,
            dob: 0.0,
            address: 0.0,
            phone: 0.0,
            id: 0.0,
            face: 0.0,
        };
        let classifier = RuleBasedClassifier::with_weights(weights);
        let features = FeatureVector {
            name_similarity: 0.6,
            dob_match: 1.0,
            ..FeatureVector::default()
        };
        assert!((classifier.score(&features).probability - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_weights_deserialize_with_defaults() {
        let weights: ScoringWeights = serde_json::from_str(r#"{"name": 0.5}"#).unwrap();
        assert!((weights.name - 0.5).abs() < f64::EPSILON);
        assert!((weights.dob - 0.20).abs() < f64::EPSILON);
    }
}
