use clap::Args;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::matching::strings::{
    jaro_winkler, levenshtein, levenshtein_similarity, metaphone, metaphone_match, soundex,
    soundex_match,
};

#[derive(Args)]
pub struct SimilarityArgs {
    /// First string
    pub a: String,

    /// Second string
    pub b: String,
}

/// Every string measure the matcher uses, for one pair of strings
#[derive(Debug, Serialize)]
struct SimilarityReport<'a> {
    a: &'a str,
    b: &'a str,
    jaro_winkler: f64,
    levenshtein_distance: usize,
    levenshtein_similarity: f64,
    soundex: (String, String),
    soundex_match: bool,
    metaphone: (String, String),
    metaphone_match: bool,
}

impl<'a> SimilarityReport<'a> {
    fn new(a: &'a str, b: &'a str) -> Self {
        Self {
            a,
            b,
            jaro_winkler: jaro_winkler(a, b),
            levenshtein_distance: levenshtein(a, b),
            levenshtein_similarity: levenshtein_similarity(a, b),
            soundex: (soundex(a), soundex(b)),
            soundex_match: soundex_match(a, b),
            metaphone: (metaphone(a), metaphone(b)),
            metaphone_match: metaphone_match(a, b),
        }
    }
}

pub fn run(args: &SimilarityArgs, format: OutputFormat) -> anyhow::Result<()> {
    let report = SimilarityReport::new(&args.a, &args.b);

    match format {
        OutputFormat::Text => print_text_report(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Tsv => print_tsv_report(&report),
    }

    Ok(())
}

fn print_text_report(report: &SimilarityReport<'_>) {
    println!("'{}' vs '{}'", report.a, report.b);
    println!("  Jaro-Winkler:           {:.4}", report.jaro_winkler);
    println!("  Levenshtein distance:   {}", report.levenshtein_distance);
    println!("  Levenshtein similarity: {:.4}", report.levenshtein_similarity);
    println!(
        "  Soundex:                {} / {} ({})",
        report.soundex.0,
        report.soundex.1,
        if report.soundex_match { "match" } else { "no match" }
    );
    println!(
        "  Metaphone:              {} / {} ({})",
        report.metaphone.0,
        report.metaphone.1,
        if report.metaphone_match { "match" } else { "no match" }
    );
}

fn print_tsv_report(report: &SimilarityReport<'_>) {
    println!("jaro_winkler\tlevenshtein_distance\tlevenshtein_similarity\tsoundex_a\tsoundex_b\tmetaphone_a\tmetaphone_b");
    println!(
        "{:.4}\t{}\t{:.4}\t{}\t{}\t{}\t{}",
        report.jaro_winkler,
        report.levenshtein_distance,
        report.levenshtein_similarity,
        report.soundex.0,
        report.soundex.1,
        report.metaphone.0,
        report.metaphone.1,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_for_phonetic_variants() {
        let report = SimilarityReport::new("Robert", "Rupert");
        assert_eq!(report.soundex, ("R163".to_string(), "R163".to_string()));
        assert!(report.soundex_match);
        assert_eq!(report.levenshtein_distance, 2);
    }

    #[test]
    fn test_report_for_empty_input() {
        let report = SimilarityReport::new("", "Asha");
        assert_eq!(report.jaro_winkler, 0.0);
        assert_eq!(report.levenshtein_distance, 4);
        assert_eq!(report.levenshtein_similarity, 0.0);
        assert!(!report.soundex_match);
        assert!(!report.metaphone_match);
    }
}
