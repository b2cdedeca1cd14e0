//! Loading person records from JSON.
//!
//! Records arrive from upstream registries in loose shapes. The loader accepts:
//!
//! - a JSON array of record objects
//! - an object with a `records` array
//! - a single record object
//! - JSON Lines, one record object per line
//!
//! Field spellings are normalized at this boundary (`voter_id` or
//! `identifier` for `id`, `dob` for `date_of_birth`, `aadhaar_number` for
//! `national_id_number`). Blank strings become absent fields, numbers are
//! accepted where text is expected, and an address may be structured or a
//! single line of text.
//!
//! ## Example
//!
//! ```rust
//! use roll_dedup::parsing::records::{parse_records_text, LoadOptions};
//!
//! let json = r#"[{"voter_id": "V1", "name": "Asha Devi", "dob": "1990-03-15"}]"#;
//! let records = parse_records_text(json, &LoadOptions::default()).unwrap();
//! assert_eq!(records[0].id.as_str(), "V1");
//! ```

pub mod records;
