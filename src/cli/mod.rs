//! Command-line interface for roll-dedup.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **compare**: Score a single pair of records
//! - **scan**: Find every likely duplicate pair in a records file
//! - **similarity**: Show the string similarity measures for two strings
//!
//! ## Usage
//!
//! ```text
//! # Compare two single-record files
//! roll-dedup compare a.json b.json
//!
//! # Compare two records from a roll by ID
//! roll-dedup compare --records roll.json V001 V002
//!
//! # Scan a roll, blocking on Soundex of the first name
//! roll-dedup scan roll.json --blocking soundex --threshold 0.8
//!
//! # JSON output for scripting
//! roll-dedup scan roll.jsonl --district Pune --format json
//!
//! # Inspect how two names compare
//! roll-dedup similarity "Mohammed" "Mohamad"
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::matching::engine::MatchingConfig;
use crate::parsing::records::LoadOptions;

pub mod compare;
pub mod scan;
pub mod similarity;

#[derive(Parser)]
#[command(name = "roll-dedup")]
#[command(version)]
#[command(about = "Detect duplicate person records in voter rolls")]
#[command(
    long_about = "roll-dedup scores how likely two person records describe the same individual.\n\nIt compares names, family names, date of birth, address, phone, national ID and face embeddings, and reports:\n- A duplicate probability with a confidence\n- Flags explaining which signals agree\n- A merge, review or dismiss recommendation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Matching configuration file (JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare two records
    Compare(compare::CompareArgs),

    /// Scan a set of records for duplicate pairs
    Scan(scan::ScanArgs),

    /// Show string similarity measures for two strings
    Similarity(similarity::SimilarityArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Load the matching configuration, falling back to defaults without a file
pub fn load_config(path: Option<&Path>) -> anyhow::Result<MatchingConfig> {
    match path {
        Some(path) => MatchingConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(MatchingConfig::default()),
    }
}

fn load_options(config: &MatchingConfig, skip_invalid: bool) -> LoadOptions {
    LoadOptions {
        embedding_dim: config.embedding_dim,
        skip_invalid,
    }
}

fn format_flags(flags: &[crate::core::types::Flag]) -> String {
    if flags.is_empty() {
        "-".to_string()
    } else {
        flags
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}
