use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::record::{Address, InvalidRecordError, PersonRecord};
use crate::core::types::RecordId;
use crate::utils::validation::{check_record_limit, normalize_text, parse_date, MAX_RECORDS};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input format: {0}")]
    InvalidFormat(String),

    #[error("Record {index}: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: InvalidRecordError,
    },

    #[error("Too many records: {0} exceeds maximum allowed ({max})", max = MAX_RECORDS)]
    TooManyRecords(usize),
}

/// How records are checked while loading
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Declared face embedding dimensionality
    pub embedding_dim: Option<usize>,
    /// Drop records with hard violations instead of failing the load
    pub skip_invalid: bool,
}

/// Accept strings and numbers; anything else is treated as absent
fn loose_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => normalize_text(&s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Record as it arrives from upstream systems: every field optional, several spellings
#[derive(Debug, Default, Deserialize)]
struct RawRecord {
    #[serde(
        default,
        alias = "voter_id",
        alias = "identifier",
        deserialize_with = "loose_string"
    )]
    id: Option<String>,

    #[serde(default, deserialize_with = "loose_string")]
    name: Option<String>,

    #[serde(default, deserialize_with = "loose_string")]
    father_name: Option<String>,

    #[serde(default, deserialize_with = "loose_string")]
    mother_name: Option<String>,

    #[serde(default, alias = "dob", deserialize_with = "loose_string")]
    date_of_birth: Option<String>,

    #[serde(default)]
    address: Option<Value>,

    #[serde(default, alias = "phone", deserialize_with = "loose_string")]
    mobile_number: Option<String>,

    #[serde(
        default,
        alias = "aadhaar_number",
        alias = "aadhaar",
        deserialize_with = "loose_string"
    )]
    national_id_number: Option<String>,

    #[serde(default)]
    face_embedding: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAddress {
    #[serde(default, deserialize_with = "loose_string")]
    house_number: Option<String>,

    #[serde(default, deserialize_with = "loose_string")]
    street: Option<String>,

    #[serde(default, alias = "city", deserialize_with = "loose_string")]
    village_city: Option<String>,

    #[serde(default, deserialize_with = "loose_string")]
    district: Option<String>,

    #[serde(default, deserialize_with = "loose_string")]
    state: Option<String>,

    #[serde(default, alias = "pin", deserialize_with = "loose_string")]
    pin_code: Option<String>,
}

impl From<RawAddress> for Address {
    fn from(raw: RawAddress) -> Self {
        Self {
            house_number: raw.house_number,
            street: raw.street,
            village_city: raw.village_city,
            district: raw.district,
            state: raw.state,
            pin_code: raw.pin_code,
        }
    }
}

fn parse_address(value: Option<Value>) -> Address {
    match value {
        Some(Value::String(text)) => normalize_text(&text).map(Address::from_text).unwrap_or_default(),
        Some(value @ Value::Object(_)) => serde_json::from_value::<RawAddress>(value)
            .map(Address::from)
            .unwrap_or_default(),
        _ => Address::default(),
    }
}

fn parse_embedding(value: Option<Value>, record_id: &str) -> Result<Option<Vec<f64>>, InvalidRecordError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(Value::as_f64)
            .collect::<Option<Vec<f64>>>()
            .map(Some)
            .ok_or_else(|| {
                InvalidRecordError::new(record_id, "face_embedding", "contains a non-numeric value")
            }),
        Some(_) => Err(InvalidRecordError::new(
            record_id,
            "face_embedding",
            "is not an array of numbers",
        )),
    }
}

impl RawRecord {
    fn into_record(self, index: usize) -> Result<PersonRecord, InvalidRecordError> {
        let Some(id) = self.id else {
            return Err(InvalidRecordError::new(
                format!("#{index}"),
                "id",
                "is missing or blank",
            ));
        };

        let date_of_birth = self.date_of_birth.as_deref().and_then(|s| {
            let parsed = parse_date(s);
            if parsed.is_none() {
                debug!("Record '{}': ignoring unparseable date of birth '{}'", id, s);
            }
            parsed
        });

        let face_embedding = parse_embedding(self.face_embedding, &id)?;

        Ok(PersonRecord {
            id: RecordId::new(id),
            name: self.name.unwrap_or_default(),
            father_name: self.father_name,
            mother_name: self.mother_name,
            date_of_birth,
            address: parse_address(self.address),
            mobile_number: self.mobile_number,
            national_id_number: self.national_id_number,
            face_embedding,
        })
    }
}

/// Parse one JSON value into a validated record
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if the value is not an object, or
/// `ParseError::InvalidRecord` for a hard contract violation.
pub fn parse_record_value(
    value: Value,
    index: usize,
    embedding_dim: Option<usize>,
) -> Result<PersonRecord, ParseError> {
    if !value.is_object() {
        return Err(ParseError::InvalidFormat(format!(
            "Record {index} is not a JSON object"
        )));
    }

    let raw: RawRecord = serde_json::from_value(value)?;
    raw.into_record(index)
        .and_then(|record| record.validate(embedding_dim).map(|()| record))
        .map_err(|source| ParseError::InvalidRecord { index, source })
}

/// Split the input into one JSON value per record.
///
/// Accepts a JSON array, an object with a `records` array, a single record
/// object, or a stream of objects (JSON Lines).
fn record_values(text: &str) -> Result<Vec<Value>, ParseError> {
    let mut values = serde_json::Deserializer::from_str(text)
        .into_iter::<Value>()
        .collect::<Result<Vec<_>, _>>()?;

    if values.len() != 1 {
        return Ok(values);
    }

    match values.pop() {
        Some(Value::Array(items)) => Ok(items),
        Some(Value::Object(mut map)) => match map.remove("records") {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(ParseError::InvalidFormat(
                "'records' must be an array".to_string(),
            )),
            None => Ok(vec![Value::Object(map)]),
        },
        Some(other) => Err(ParseError::InvalidFormat(format!(
            "Expected records, found {other}"
        ))),
        None => Ok(Vec::new()),
    }
}

/// Parse records from JSON text
///
/// # Errors
///
/// Returns `ParseError::Json` for malformed JSON, `ParseError::InvalidFormat`
/// for a non-record structure, `ParseError::TooManyRecords` if the limit is
/// exceeded, or `ParseError::InvalidRecord` for the first hard violation
/// unless `skip_invalid` is set.
pub fn parse_records_text(text: &str, options: &LoadOptions) -> Result<Vec<PersonRecord>, ParseError> {
    let values = record_values(text)?;
    let mut records = Vec::with_capacity(values.len());

    for (index, value) in values.into_iter().enumerate() {
        if check_record_limit(records.len()).is_some() {
            return Err(ParseError::TooManyRecords(records.len() + 1));
        }

        match parse_record_value(value, index, options.embedding_dim) {
            Ok(record) => records.push(record),
            Err(ParseError::InvalidRecord { index, source }) if options.skip_invalid => {
                warn!("Skipping record {}: {}", index, source);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(records)
}

/// Parse records from a file, or from stdin when `path` is `-`
///
/// # Errors
///
/// Returns `ParseError::Io` if the input cannot be read, or any error of
/// [`parse_records_text`].
pub fn parse_records_file(path: &Path, options: &LoadOptions) -> Result<Vec<PersonRecord>, ParseError> {
    let content = if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(path)?
    };
    parse_records_text(&content, options)
}
