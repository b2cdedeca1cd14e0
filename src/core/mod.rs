//! Core data types for person-record deduplication.
//!
//! - [`PersonRecord`]: a validated person record with explicitly optional fields
//! - [`Address`]: structured postal address
//! - [`FeatureVector`]: the eight [0, 1] features describing a record pair
//! - [`RecordId`], [`Recommendation`], [`Flag`]: identifiers and result classifications
//!
//! [`PersonRecord`]: record::PersonRecord
//! [`Address`]: record::Address
//! [`FeatureVector`]: features::FeatureVector
//! [`RecordId`]: types::RecordId
//! [`Recommendation`]: types::Recommendation
//! [`Flag`]: types::Flag

pub mod features;
pub mod record;
pub mod types;
