use crate::core::features::FeatureVector;
use crate::core::types::Flag;

/// Evaluate every flag rule against the raw features.
///
/// Flags depend only on the features, never on which classifier produced
/// the probability. They are returned in declaration order without duplicates.
#[must_use]
pub fn evaluate_flags(features: &FeatureVector) -> Vec<Flag> {
    let rules = [
        (Flag::StrongNameMatch, features.name_similarity > 0.85),
        (
            Flag::DobNameMatch,
            features.dob_match >= 1.0 && features.name_similarity > 0.7,
        ),
        (
            Flag::AddressNameMatch,
            features.address_similarity > 0.8 && features.name_similarity > 0.75,
        ),
        (Flag::FaceMatch, features.face_similarity > 0.9),
        (Flag::PhoneExactMatch, features.phone_match >= 1.0),
    ];

    rules
        .into_iter()
        .filter_map(|(flag, raised)| raised.then_some(flag))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_for_empty_features() {
        assert!(evaluate_flags(&FeatureVector::default()).is_empty());
    }

    #[test]
    fn test_all_flags() {
        let flags = evaluate_flags(&FeatureVector::from_array([1.0; 8]));
        assert_eq!(
            flags,
            vec![
                Flag::StrongNameMatch,
                Flag::DobNameMatch,
                Flag::AddressNameMatch,
                Flag::FaceMatch,
                Flag::PhoneExactMatch,
            ]
        );
    }

    #[test]
    fn test_near_dob_does_not_raise_dob_name_match() {
        let features = FeatureVector {
            name_similarity: 0.8,
            dob_match: 0.95,
            ..FeatureVector::default()
        };
        assert!(evaluate_flags(&features).is_empty());
    }

    #[test]
    fn test_thresholds_are_strict() {
        let features = FeatureVector {
            name_similarity: 0.85,
            address_similarity: 0.8,
            face_similarity: 0.9,
            ..FeatureVector::default()
        };
        // name 0.85 is not a strong match, address 0.8 is not above 0.8
        assert!(evaluate_flags(&features).is_empty());

        let features = FeatureVector {
            name_similarity: 0.76,
            address_similarity: 0.81,
            ..FeatureVector::default()
        };
        assert_eq!(evaluate_flags(&features), vec![Flag::AddressNameMatch]);
    }
}
