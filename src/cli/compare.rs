use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Args;

use crate::cli::{format_flags, load_options, OutputFormat};
use crate::core::record::PersonRecord;
use crate::matching::engine::{ComparisonResult, DuplicateDetector, MatchingConfig};
use crate::parsing::records::{parse_records_file, LoadOptions};

#[derive(Args)]
pub struct CompareArgs {
    /// First record file (JSON), or a record ID when --records is given
    #[arg(required = true)]
    pub first: String,

    /// Second record file (JSON), or a record ID when --records is given
    #[arg(required = true)]
    pub second: String,

    /// Look up both records by ID in this records file
    #[arg(long)]
    pub records: Option<PathBuf>,
}

pub fn run(
    args: CompareArgs,
    config: MatchingConfig,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let options = load_options(&config, false);

    let (a, b) = if let Some(path) = &args.records {
        let records = parse_records_file(path, &options)
            .with_context(|| format!("Failed to load records from {}", path.display()))?;
        if verbose {
            eprintln!("Loaded {} records from {}", records.len(), path.display());
        }
        (
            find_record(&records, &args.first, path)?,
            find_record(&records, &args.second, path)?,
        )
    } else {
        (
            load_single(Path::new(&args.first), &options)?,
            load_single(Path::new(&args.second), &options)?,
        )
    };

    let detector = DuplicateDetector::with_config(config);
    let result = detector.compare(&a, &b)?;

    match format {
        OutputFormat::Text => print_text_comparison(&a, &b, &result),
        OutputFormat::Json => print_json_comparison(&a, &b, &result)?,
        OutputFormat::Tsv => print_tsv_comparison(&a, &b, &result),
    }

    Ok(())
}

fn find_record(records: &[PersonRecord], id: &str, path: &Path) -> anyhow::Result<PersonRecord> {
    records
        .iter()
        .find(|r| r.id.as_str() == id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Record '{}' not found in {}", id, path.display()))
}

fn load_single(path: &Path, options: &LoadOptions) -> anyhow::Result<PersonRecord> {
    let mut records = parse_records_file(path, options)
        .with_context(|| format!("Failed to load record from {}", path.display()))?;

    if records.len() != 1 {
        bail!(
            "{} must contain exactly one record, found {} (use --records to pick records by ID)",
            path.display(),
            records.len()
        );
    }
    Ok(records.remove(0))
}

fn print_text_comparison(a: &PersonRecord, b: &PersonRecord, result: &ComparisonResult) {
    println!("Comparison Results");
    println!("{}", "=".repeat(60));

    println!("\nRecord 1: {} ({})", a.id, a.name);
    println!("Record 2: {} ({})", b.id, b.name);

    println!("\nFeatures:");
    for (name, value) in result.features.iter() {
        println!("  {name:<24} {value:.4}");
    }

    println!(
        "\nDuplicate probability: {:.2}%",
        result.duplicate_probability * 100.0
    );
    println!("Confidence: {:.2}", result.confidence);
    println!("Flags: {}", format_flags(&result.flags));
    println!("Recommendation: {}", result.recommendation);
}

fn print_json_comparison(
    a: &PersonRecord,
    b: &PersonRecord,
    result: &ComparisonResult,
) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "record1_id": a.id,
        "record2_id": b.id,
        "duplicate_probability": result.duplicate_probability,
        "confidence": result.confidence,
        "features": result.features,
        "flags": result.flags,
        "recommendation": result.recommendation,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_comparison(a: &PersonRecord, b: &PersonRecord, result: &ComparisonResult) {
    println!("record1_id\trecord2_id\tduplicate_probability\tconfidence\trecommendation\tflags");
    println!(
        "{}\t{}\t{:.4}\t{:.4}\t{}\t{}",
        a.id,
        b.id,
        result.duplicate_probability,
        result.confidence,
        result.recommendation,
        format_flags(&result.flags),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_record() {
        let records = vec![
            PersonRecord::new("V1", "Asha Devi"),
            PersonRecord::new("V2", "Asha Devi"),
        ];
        let path = Path::new("roll.json");

        assert_eq!(find_record(&records, "V2", path).unwrap().id.as_str(), "V2");
        let err = find_record(&records, "V9", path).unwrap_err();
        assert!(err.to_string().contains("'V9' not found"));
    }

    #[test]
    fn test_load_single_rejects_multiple_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two.json");
        std::fs::write(&path, r#"[{"id": "V1"}, {"id": "V2"}]"#).unwrap();

        let err = load_single(&path, &LoadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("exactly one record"));
    }
}
