use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::RecordId;
use crate::utils::validation::check_embedding;

/// A hard contract violation in a record.
///
/// Missing or malformed optional data never produces this error; it only
/// covers inputs that cannot be scored honestly (no identifier, embeddings of
/// the wrong dimensionality or with non-finite components).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid record '{record_id}': field '{field}' {reason}")]
pub struct InvalidRecordError {
    /// Identifier of the offending record, or `#<index>` when the identifier itself is missing
    pub record_id: String,
    pub field: &'static str,
    pub reason: String,
}

impl InvalidRecordError {
    pub fn new(record_id: impl Into<String>, field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            field,
            reason: reason.into(),
        }
    }
}

/// Structured postal address; every component is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub village_city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_code: Option<String>,
}

impl Address {
    /// Address given as one free-text line
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            street: Some(text.into()),
            ..Self::default()
        }
    }

    /// Components in comparison order: house, street, village/city, district, state, pin
    fn parts(&self) -> impl Iterator<Item = &str> {
        [
            &self.house_number,
            &self.street,
            &self.village_city,
            &self.district,
            &self.state,
            &self.pin_code,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .map(str::trim)
        .filter(|part| !part.is_empty())
    }

    /// Single lower-cased string of all non-empty components, space separated
    #[must_use]
    pub fn normalized(&self) -> String {
        self.parts().collect::<Vec<_>>().join(" ").to_lowercase()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts().next().is_none()
    }
}

/// A person record as consumed by the duplicate-detection pipeline.
///
/// Records are immutable input: the pipeline only ever borrows them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: RecordId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Address::is_empty")]
    pub address: Address,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,

    /// National identity number, e.g. a 12-digit Aadhaar number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_id_number: Option<String>,

    /// Fixed-length face embedding produced by an external model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_embedding: Option<Vec<f64>>,
}

impl PersonRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(id),
            name: name.into(),
            father_name: None,
            mother_name: None,
            date_of_birth: None,
            address: Address::default(),
            mobile_number: None,
            national_id_number: None,
            face_embedding: None,
        }
    }

    #[must_use]
    pub fn with_father_name(mut self, name: impl Into<String>) -> Self {
        self.father_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_mother_name(mut self, name: impl Into<String>) -> Self {
        self.mother_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_date_of_birth(mut self, date: NaiveDate) -> Self {
        self.date_of_birth = Some(date);
        self
    }

    #[must_use]
    pub fn with_address(mut self, address: Address) -> Self {
        self.address = address;
        self
    }

    #[must_use]
    pub fn with_mobile_number(mut self, number: impl Into<String>) -> Self {
        self.mobile_number = Some(number.into());
        self
    }

    #[must_use]
    pub fn with_national_id(mut self, number: impl Into<String>) -> Self {
        self.national_id_number = Some(number.into());
        self
    }

    #[must_use]
    pub fn with_face_embedding(mut self, embedding: Vec<f64>) -> Self {
        self.face_embedding = Some(embedding);
        self
    }

    /// Check the hard contracts of a single record.
    ///
    /// `embedding_dim` is the declared embedding dimensionality, if any. When
    /// declared, a present embedding must have exactly that length.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRecordError` for a blank identifier, an embedding whose
    /// length disagrees with `embedding_dim`, or non-finite embedding values.
    pub fn validate(&self, embedding_dim: Option<usize>) -> Result<(), InvalidRecordError> {
        if self.id.is_blank() {
            return Err(InvalidRecordError::new(
                self.id.as_str(),
                "id",
                "is missing or blank",
            ));
        }

        if let Some(embedding) = &self.face_embedding {
            if let Some(reason) = check_embedding(embedding, embedding_dim) {
                return Err(InvalidRecordError::new(
                    self.id.as_str(),
                    "face_embedding",
                    reason,
                ));
            }
        }

        Ok(())
    }
}
