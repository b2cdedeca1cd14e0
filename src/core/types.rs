use serde::{Deserialize, Serialize};

/// Caller-assigned identifier of a person record (e.g. a voter ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identifiers are mandatory; a blank one is a contract violation
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Minimum probability for a `Merge` recommendation
pub const MERGE_THRESHOLD: f64 = 0.9;

/// Minimum probability for a `Review` recommendation
pub const REVIEW_THRESHOLD: f64 = 0.7;

/// What a reviewer should do with a scored pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Dismiss,
    Review,
    Merge,
}

impl Recommendation {
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        if probability >= MERGE_THRESHOLD {
            Self::Merge
        } else if probability >= REVIEW_THRESHOLD {
            Self::Review
        } else {
            Self::Dismiss
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Review => "review",
            Self::Dismiss => "dismiss",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Discrete signal raised by a specific combination of features
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    /// Name similarity above 0.85
    StrongNameMatch,
    /// Exact date of birth with name similarity above 0.7
    DobNameMatch,
    /// Address similarity above 0.8 with name similarity above 0.75
    AddressNameMatch,
    /// Face embedding similarity above 0.9
    FaceMatch,
    /// Identical mobile numbers
    PhoneExactMatch,
}

impl Flag {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StrongNameMatch => "strong_name_match",
            Self::DobNameMatch => "dob_name_match",
            Self::AddressNameMatch => "address_name_match",
            Self::FaceMatch => "face_match",
            Self::PhoneExactMatch => "phone_exact_match",
        }
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_thresholds() {
        assert_eq!(Recommendation::from_probability(1.0), Recommendation::Merge);
        assert_eq!(Recommendation::from_probability(0.9), Recommendation::Merge);
        assert_eq!(Recommendation::from_probability(0.899), Recommendation::Review);
        assert_eq!(Recommendation::from_probability(0.7), Recommendation::Review);
        assert_eq!(
            Recommendation::from_probability(0.699),
            Recommendation::Dismiss
        );
        assert_eq!(Recommendation::from_probability(0.0), Recommendation::Dismiss);
    }

    #[test]
    fn test_flag_names_match_serde() {
        for flag in [
            Flag::StrongNameMatch,
            Flag::DobNameMatch,
            Flag::AddressNameMatch,
            Flag::FaceMatch,
            Flag::PhoneExactMatch,
        ] {
            let json = serde_json::to_string(&flag).unwrap();
            assert_eq!(json, format!("\"{}\"", flag.as_str()));
        }
    }

    #[test]
    fn test_blank_record_id() {
        assert!(RecordId::new("").is_blank());
        assert!(RecordId::new("   ").is_blank());
        assert!(!RecordId::new("V001").is_blank());
    }
}
