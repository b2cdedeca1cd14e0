//! # roll-dedup
//!
//! A library for detecting duplicate person records in a voter roll.
//!
//! Registries built from many enrolment drives accumulate the same person
//! more than once, often with a transliterated name, a shifted date of birth
//! or a new address. `roll-dedup` compares records field by field and turns
//! the comparison into a duplicate probability and an actionable
//! recommendation.
//!
//! ## Features
//!
//! - **Fuzzy name matching**: Jaro-Winkler, Levenshtein, Soundex and Metaphone
//! - **Feature extraction**: eight normalized similarity features per pair
//! - **Rule-based scoring**: weighted combination with corroboration boost and
//!   a face-match override
//! - **Explainable flags**: discrete signals such as `dob_name_match`
//! - **Batch scanning**: parallel all-pairs scan with optional blocking
//!
//! ## Example
//!
//! ```rust
//! use roll_dedup::{DuplicateDetector, PersonRecord, Recommendation};
//!
//! let a = PersonRecord::new("V001", "Rajesh Kumar").with_father_name("Suresh Kumar");
//! let b = PersonRecord::new("V002", "Rajesh Kumar").with_father_name("Suresh Kumar");
//!
//! let detector = DuplicateDetector::new();
//! let result = detector.compare(&a, &b).unwrap();
//! assert!(result.duplicate_probability > 0.0);
//! assert_ne!(result.recommendation, Recommendation::Merge);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Record, feature and result types
//! - [`matching`]: String similarity, feature extraction, scoring and batch scans
//! - [`parsing`]: Loading records from JSON and JSON Lines
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::features::FeatureVector;
pub use core::record::{Address, InvalidRecordError, PersonRecord};
pub use core::types::*;
pub use matching::engine::{ComparisonResult, DuplicateDetector, MatchingConfig};
