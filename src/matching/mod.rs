//! Duplicate-detection pipeline.
//!
//! Two records flow through four stages:
//!
//! 1. [`features::FeatureExtractor`] turns the pair into a [`FeatureVector`]
//!    using the primitives in [`strings`] plus date, identifier and embedding
//!    comparisons
//! 2. A [`Classifier`] maps the vector to a probability and a confidence
//! 3. [`flags::evaluate_flags`] derives discrete flags from the raw features
//! 4. The probability is turned into a [`Recommendation`]
//!
//! [`DuplicateDetector`] ties the stages together for a single pair, and
//! [`BatchScanner`] drives it over every pair of a record set.
//!
//! ## Example
//!
//! ```rust
//! use roll_dedup::{DuplicateDetector, PersonRecord};
//!
//! let a = PersonRecord::new("V001", "Rajesh Kumar").with_mobile_number("9876543210");
//! let b = PersonRecord::new("V002", "Rajesh Kumaar").with_mobile_number("9876543210");
//!
//! let detector = DuplicateDetector::new();
//! let result = detector.compare(&a, &b).unwrap();
//! println!("{:.2} -> {}", result.duplicate_probability, result.recommendation);
//! ```
//!
//! [`FeatureVector`]: crate::core::features::FeatureVector
//! [`Recommendation`]: crate::core::types::Recommendation

pub mod batch;
pub mod classifier;
pub mod engine;
pub mod features;
pub mod flags;
pub mod strings;

pub use batch::{BatchMatch, BatchScanner, BlockingKind, BlockingStrategy, ScanOutcome, Scope};
pub use classifier::{Classifier, RuleBasedClassifier, Score, ScoringWeights};
pub use engine::{ComparisonResult, DuplicateDetector, MatchingConfig};
