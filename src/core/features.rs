use serde::{Deserialize, Serialize};

/// Number of features produced for every record pair
pub const FEATURE_COUNT: usize = 8;

/// Feature names in vector order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "name_similarity",
    "father_name_similarity",
    "mother_name_similarity",
    "dob_match",
    "address_similarity",
    "phone_match",
    "id_match",
    "face_similarity",
];

/// Fixed-order summary of how two records compare.
///
/// Every value lies in [0, 1]. A feature whose source data is missing on
/// either side is 0.0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub name_similarity: f64,
    pub father_name_similarity: f64,
    pub mother_name_similarity: f64,
    pub dob_match: f64,
    pub address_similarity: f64,
    pub phone_match: f64,
    pub id_match: f64,
    pub face_similarity: f64,
}

impl FeatureVector {
    /// Build from an array in `FEATURE_NAMES` order, clamping each value to [0, 1]
    #[must_use]
    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        let [name, father, mother, dob, address, phone, id, face] = values.map(clamp_unit);
        Self {
            name_similarity: name,
            father_name_similarity: father,
            mother_name_similarity: mother,
            dob_match: dob,
            address_similarity: address,
            phone_match: phone,
            id_match: id,
            face_similarity: face,
        }
    }

    #[must_use]
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.name_similarity,
            self.father_name_similarity,
            self.mother_name_similarity,
            self.dob_match,
            self.address_similarity,
            self.phone_match,
            self.id_match,
            self.face_similarity,
        ]
    }

    /// (name, value) pairs in vector order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        FEATURE_NAMES.into_iter().zip(self.to_array())
    }

    /// Fraction of features that carry any signal
    #[must_use]
    pub fn completeness(&self) -> f64 {
        let non_zero = self.to_array().iter().filter(|v| **v != 0.0).count();
        count_to_f64(non_zero) / count_to_f64(FEATURE_COUNT)
    }

    /// Spread between the largest and smallest feature
    #[must_use]
    pub fn range(&self) -> f64 {
        let values = self.to_array();
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        max - min
    }
}

/// Clamp to [0, 1], mapping NaN to 0.0
#[inline]
#[must_use]
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Lossless for any count the pipeline produces (far below 2^53)
#[inline]
pub(crate) fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_to_f64() {
        assert_eq!(count_to_f64(0), 0.0);
        assert_eq!(count_to_f64(FEATURE_COUNT), 8.0);
        assert_eq!(count_to_f64(1_000_000), 1_000_000.0);
    }

    #[test]
    fn test_from_array_clamps() {
        let features = FeatureVector::from_array([1.5, -0.2, f64::NAN, 0.5, 0.0, 1.0, 0.5, 0.25]);
        assert!((features.name_similarity - 1.0).abs() < f64::EPSILON);
        assert!(features.father_name_similarity.abs() < f64::EPSILON);
        assert!(features.mother_name_similarity.abs() < f64::EPSILON);
        assert!((features.dob_match - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_array_order_matches_names() {
        let features = FeatureVector {
            dob_match: 0.95,
            ..FeatureVector::default()
        };
        let (name, value) = features.iter().nth(3).unwrap();
        assert_eq!(name, "dob_match");
        assert!((value - 0.95).abs() < f64::EPSILON);
    }

    #[test]
    fn test_completeness_and_range() {
        let empty = FeatureVector::default();
        assert!(empty.completeness().abs() < f64::EPSILON);
        assert!(empty.range().abs() < f64::EPSILON);

        let features = FeatureVector {
            name_similarity: 1.0,
            dob_match: 1.0,
            ..FeatureVector::default()
        };
        assert!((features.completeness() - 0.25).abs() < f64::EPSILON);
        assert!((features.range() - 1.0).abs() < f64::EPSILON);
    }
}
