use chrono::NaiveDate;

use crate::core::features::{clamp_unit, FeatureVector};
use crate::core::record::{Address, InvalidRecordError, PersonRecord};
use crate::matching::strings::jaro_winkler;

/// Score for dates of birth that differ by exactly one day
pub const DOB_NEAR_MATCH: f64 = 0.95;

/// Score for national ID numbers sharing only their last four characters
pub const ID_SUFFIX_MATCH: f64 = 0.5;

/// Number of trailing characters compared for a partial ID match
const ID_SUFFIX_LEN: usize = 4;

/// Added to embedding norms so zero vectors do not divide by zero
const NORM_EPSILON: f64 = 1e-8;

/// Turns a record pair into a `FeatureVector`.
///
/// Each feature is computed independently. Absent or malformed optional data
/// degrades that feature to 0.0; only hard contract violations are errors.
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    /// Declared face embedding dimensionality, if any
    embedding_dim: Option<usize>,
}

impl FeatureExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require present embeddings to have exactly `dim` components
    #[must_use]
    pub fn with_embedding_dim(dim: usize) -> Self {
        Self {
            embedding_dim: Some(dim),
        }
    }

    #[must_use]
    pub fn embedding_dim(&self) -> Option<usize> {
        self.embedding_dim
    }

    /// Compute all eight features for a pair.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRecordError` if either record fails validation or the
    /// two face embeddings have different lengths.
    pub fn extract(
        &self,
        a: &PersonRecord,
        b: &PersonRecord,
    ) -> Result<FeatureVector, InvalidRecordError> {
        a.validate(self.embedding_dim)?;
        b.validate(self.embedding_dim)?;

        let face_similarity = face_similarity(a, b)?;

        Ok(FeatureVector::from_array([
            jaro_winkler(&a.name, &b.name),
            optional_name_similarity(a.father_name.as_deref(), b.father_name.as_deref()),
            optional_name_similarity(a.mother_name.as_deref(), b.mother_name.as_deref()),
            dob_match(a.date_of_birth, b.date_of_birth),
            address_similarity(&a.address, &b.address),
            phone_match(a.mobile_number.as_deref(), b.mobile_number.as_deref()),
            id_match(
                a.national_id_number.as_deref(),
                b.national_id_number.as_deref(),
            ),
            face_similarity,
        ]))
    }
}

fn optional_name_similarity(a: Option<&str>, b: Option<&str>) -> f64 {
    jaro_winkler(a.unwrap_or_default(), b.unwrap_or_default())
}

/// 1.0 for equal dates, 0.95 within one day, otherwise 0.0
#[must_use]
pub fn dob_match(a: Option<NaiveDate>, b: Option<NaiveDate>) -> f64 {
    let (Some(a), Some(b)) = (a, b) else {
        return 0.0;
    };

    if a == b {
        1.0
    } else if (a - b).num_days().abs() <= 1 {
        DOB_NEAR_MATCH
    } else {
        0.0
    }
}

/// Jaro-Winkler similarity of the normalized address strings
#[must_use]
pub fn address_similarity(a: &Address, b: &Address) -> f64 {
    let a = a.normalized();
    let b = b.normalized();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    jaro_winkler(&a, &b)
}

/// 1.0 only when both numbers are present and identical
#[must_use]
pub fn phone_match(a: Option<&str>, b: Option<&str>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) if !a.is_empty() && a == b => 1.0,
        _ => 0.0,
    }
}

/// 1.0 for identical IDs, 0.5 when only the last four characters agree.
///
/// A shared suffix raises suspicion; it never confirms identity on its own.
#[must_use]
pub fn id_match(a: Option<&str>, b: Option<&str>) -> f64 {
    let a = a.map(str::trim).filter(|s| !s.is_empty());
    let b = b.map(str::trim).filter(|s| !s.is_empty());
    let (Some(a), Some(b)) = (a, b) else {
        return 0.0;
    };

    if a == b {
        return 1.0;
    }

    match (suffix(a, ID_SUFFIX_LEN), suffix(b, ID_SUFFIX_LEN)) {
        (Some(sa), Some(sb)) if sa == sb => ID_SUFFIX_MATCH,
        _ => 0.0,
    }
}

/// Last `n` characters of `s`, or None if `s` is shorter than `n`
fn suffix(s: &str, n: usize) -> Option<&str> {
    let count = s.chars().count();
    if count < n {
        return None;
    }
    s.char_indices().nth(count - n).map(|(i, _)| &s[i..])
}

fn face_similarity(a: &PersonRecord, b: &PersonRecord) -> Result<f64, InvalidRecordError> {
    let (Some(ea), Some(eb)) = (a.face_embedding.as_deref(), b.face_embedding.as_deref()) else {
        return Ok(0.0);
    };
    if ea.is_empty() || eb.is_empty() {
        return Ok(0.0);
    }
    if ea.len() != eb.len() {
        return Err(InvalidRecordError::new(
            b.id.as_str(),
            "face_embedding",
            format!(
                "has length {} but record '{}' has length {}",
                eb.len(),
                a.id,
                ea.len()
            ),
        ));
    }
    Ok(cosine_similarity(ea, eb))
}

/// Cosine similarity of two equal-length vectors, clamped to [0, 1]
#[must_use]
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let norm_a = a.iter().map(|v| v * v).sum::<f64>().sqrt() + NORM_EPSILON;
    let norm_b = b.iter().map(|v| v * v).sum::<f64>().sqrt() + NORM_EPSILON;
    let dot: f64 = a.iter().zip(b).map(|(x, y)| (x / norm_a) * (y / norm_b)).sum();
    clamp_unit(dot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_dob_match() {
        let d = date(1990, 5, 17);
        assert!((dob_match(Some(d), Some(d)) - 1.0).abs() < f64::EPSILON);
        assert!((dob_match(Some(d), Some(date(1990, 5, 18))) - DOB_NEAR_MATCH).abs() < f64::EPSILON);
        assert!((dob_match(Some(date(1990, 5, 18)), Some(d)) - DOB_NEAR_MATCH).abs() < f64::EPSILON);
        assert!(dob_match(Some(d), Some(date(1990, 5, 19))).abs() < f64::EPSILON);
        assert!(dob_match(Some(d), None).abs() < f64::EPSILON);
        assert!(dob_match(None, None).abs() < f64::EPSILON);
    }

    #[test]
    fn test_dob_match_across_month_boundary() {
        assert!(
            (dob_match(Some(date(1990, 2, 28)), Some(date(1990, 3, 1))) - DOB_NEAR_MATCH).abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn test_id_match() {
        assert!((id_match(Some("123456789012"), Some("123456789012")) - 1.0).abs() < f64::EPSILON);
        assert!(
            (id_match(Some("999999999012"), Some("123456789012")) - ID_SUFFIX_MATCH).abs()
                < f64::EPSILON
        );
        assert!(id_match(Some("123456789012"), Some("123456789013")).abs() < f64::EPSILON);
        assert!(id_match(Some("012"), Some("9012")).abs() < f64::EPSILON);
        assert!(id_match(None, None).abs() < f64::EPSILON);
        assert!(id_match(Some("123456789012"), None).abs() < f64::EPSILON);
        assert!((id_match(Some(" 1234 "), Some("1234")) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_phone_match() {
        assert!((phone_match(Some("9876543210"), Some("9876543210")) - 1.0).abs() < f64::EPSILON);
        assert!(phone_match(Some("9876543210"), Some("9876543211")).abs() < f64::EPSILON);
        assert!(phone_match(Some(""), Some("")).abs() < f64::EPSILON);
        assert!(phone_match(None, Some("9876543210")).abs() < f64::EPSILON);
    }

    #[test]
    fn test_address_similarity() {
        let a = Address {
            house_number: Some("12".to_string()),
            street: Some("MG Road".to_string()),
            pin_code: Some("411001".to_string()),
            ..Address::default()
        };
        let b = Address {
            street: Some("mg road".to_string()),
            house_number: Some("12".to_string()),
            pin_code: Some("411001".to_string()),
            ..Address::default()
        };
        assert!((address_similarity(&a, &b) - 1.0).abs() < f64::EPSILON);
        assert!(address_similarity(&a, &Address::default()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cosine_similarity() {
        let a = [1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &[2.0, 0.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&a, &[0.0, 1.0, 0.0]).abs() < 1e-6);
        // Opposite vectors clamp to zero instead of going negative
        assert!(cosine_similarity(&a, &[-1.0, 0.0, 0.0]).abs() < 1e-6);
        // Zero vectors are handled by the norm epsilon
        assert!(cosine_similarity(&[0.0, 0.0, 0.0], &a).abs() < 1e-6);
    }

    #[test]
    fn test_extract_missing_fields_degrade_to_zero() {
        let a = PersonRecord::new("V1", "Asha Patil");
        let b = PersonRecord::new("V2", "");
        let features = FeatureExtractor::new().extract(&a, &b).unwrap();
        assert_eq!(features, FeatureVector::default());
    }

    #[test]
    fn test_extract_face_length_mismatch_is_error() {
        let a = PersonRecord::new("V1", "Asha").with_face_embedding(vec![0.1, 0.2]);
        let b = PersonRecord::new("V2", "Asha").with_face_embedding(vec![0.1, 0.2, 0.3]);
        let err = FeatureExtractor::new().extract(&a, &b).unwrap_err();
        assert_eq!(err.record_id, "V2");
        assert_eq!(err.field, "face_embedding");
    }

    #[test]
    fn test_extract_empty_embedding_is_soft() {
        let a = PersonRecord::new("V1", "Asha").with_face_embedding(Vec::new());
        let b = PersonRecord::new("V2", "Asha").with_face_embedding(vec![0.1, 0.2, 0.3]);
        let features = FeatureExtractor::new().extract(&a, &b).unwrap();
        assert!(features.face_similarity.abs() < f64::EPSILON);
    }

    #[test]
    fn test_extract_declared_dimension() {
        let a = PersonRecord::new("V1", "Asha").with_face_embedding(vec![0.1, 0.2, 0.3]);
        let b = PersonRecord::new("V2", "Asha").with_face_embedding(vec![0.1, 0.2, 0.3]);
        assert!(FeatureExtractor::with_embedding_dim(3).extract(&a, &b).is_ok());
        let err = FeatureExtractor::with_embedding_dim(128)
            .extract(&a, &b)
            .unwrap_err();
        assert_eq!(err.record_id, "V1");
    }
}
