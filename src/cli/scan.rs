use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Args;

use crate::cli::{load_options, OutputFormat};
use crate::matching::batch::{BlockingKind, ScanOutcome, Scope};
use crate::matching::engine::{DuplicateDetector, MatchingConfig};
use crate::parsing::records::parse_records_file;

#[derive(Args)]
pub struct ScanArgs {
    /// Records file (JSON array, {"records": [...]}, or JSON Lines); use - for stdin
    #[arg(required = true)]
    pub input: PathBuf,

    /// Minimum duplicate probability to report [default: from config, else 0.7]
    #[arg(short, long, value_parser = parse_threshold)]
    pub threshold: Option<f64>,

    /// Pre-group records before pairwise comparison [default: from config, else none]
    #[arg(short, long)]
    pub blocking: Option<BlockingKind>,

    /// Only scan records in this district
    #[arg(long, conflicts_with = "state")]
    pub district: Option<String>,

    /// Only scan records in this state
    #[arg(long)]
    pub state: Option<String>,

    /// Number of worker threads (default: all cores)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Stop the scan after this many seconds and report what was found
    #[arg(long)]
    pub time_limit: Option<u64>,

    /// Skip records with contract violations instead of failing
    #[arg(long)]
    pub skip_invalid: bool,

    /// Scan on a single thread
    #[arg(long, conflicts_with = "threads")]
    pub sequential: bool,
}

fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("threshold must be within [0, 1], got {value}"))
    }
}

impl ScanArgs {
    fn scope(&self) -> Scope {
        match (&self.district, &self.state) {
            (Some(district), _) => Scope::District(district.clone()),
            (None, Some(state)) => Scope::State(state.clone()),
            (None, None) => Scope::All,
        }
    }
}

pub fn run(
    args: ScanArgs,
    mut config: MatchingConfig,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(blocking) = args.blocking {
        config.blocking = blocking;
    }

    let records = parse_records_file(&args.input, &load_options(&config, args.skip_invalid))
        .with_context(|| format!("Failed to load records from {}", args.input.display()))?;

    if verbose {
        eprintln!(
            "Loaded {} records from {}",
            records.len(),
            args.input.display()
        );
    }

    let detector = DuplicateDetector::with_config(config);
    let scanner = detector
        .scanner()
        .with_scope(args.scope())
        .with_parallel(!args.sequential);

    let stop = Arc::new(AtomicBool::new(false));
    let timer = args
        .time_limit
        .map(|secs| spawn_timer(Duration::from_secs(secs), Arc::clone(&stop)));

    let outcome = match args.threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .context("Failed to build thread pool")?;
            pool.install(|| scanner.scan(&records, Some(stop.as_ref())))
        }
        None => scanner.scan(&records, Some(stop.as_ref())),
    };

    if let Some((cancel, handle)) = timer {
        stop_timer(cancel, handle)?;
    }

    if outcome.cancelled {
        eprintln!(
            "Time limit reached; results cover {} comparisons",
            outcome.comparisons
        );
    }

    match format {
        OutputFormat::Text => print_text_outcome(&outcome, verbose),
        OutputFormat::Json => print_json_outcome(&outcome)?,
        OutputFormat::Tsv => print_tsv_outcome(&outcome),
    }

    Ok(())
}

/// Raise `stop` after `limit` unless the returned sender is dropped first
fn spawn_timer(
    limit: Duration,
    stop: Arc<AtomicBool>,
) -> (mpsc::Sender<()>, thread::JoinHandle<()>) {
    let (cancel, wait) = mpsc::channel::<()>();
    let handle = thread::spawn(move || {
        if let Err(mpsc::RecvTimeoutError::Timeout) = wait.recv_timeout(limit) {
            stop.store(true, Ordering::Relaxed);
        }
    });
    (cancel, handle)
}

/// Disarm a timer from [`spawn_timer`] and wait for its thread
fn stop_timer(cancel: mpsc::Sender<()>, handle: thread::JoinHandle<()>) -> anyhow::Result<()> {
    // Dropping the sender wakes the timer so it exits without firing
    drop(cancel);
    handle
        .join()
        .map_err(|_| anyhow::anyhow!("Time limit timer thread panicked"))
}

fn print_text_outcome(outcome: &ScanOutcome, verbose: bool) {
    println!("Scan Results");
    println!("{}", "=".repeat(60));
    println!("Records scanned: {}", outcome.records_considered);
    println!("Comparisons: {}", outcome.comparisons);
    if outcome.failures > 0 {
        println!("Failed pairs: {}", outcome.failures);
    }
    if outcome.cancelled {
        println!("Stopped early: yes");
    }
    println!("Matches: {}", outcome.matches.len());

    if outcome.matches.is_empty() {
        return;
    }

    println!();
    println!(
        "{:<16} {:<16} {:>11}  Recommendation",
        "Record 1", "Record 2", "Probability"
    );
    println!("{}", "-".repeat(60));
    for m in &outcome.matches {
        println!(
            "{:<16} {:<16} {:>10.2}%  {}",
            m.record1_id.as_str(),
            m.record2_id.as_str(),
            m.duplicate_probability * 100.0,
            m.recommendation
        );
        if verbose {
            for (name, value) in m.features.iter().filter(|(_, v)| *v > 0.0) {
                println!("    {name:<24} {value:.4}");
            }
        }
    }
}

fn print_json_outcome(outcome: &ScanOutcome) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    Ok(())
}

fn print_tsv_outcome(outcome: &ScanOutcome) {
    let feature_header = crate::core::features::FEATURE_NAMES.join("\t");
    println!("record1_id\trecord2_id\tduplicate_probability\trecommendation\t{feature_header}");

    for m in &outcome.matches {
        let features = m
            .features
            .iter()
            .map(|(_, v)| format!("{v:.4}"))
            .collect::<Vec<_>>()
            .join("\t");
        println!(
            "{}\t{}\t{:.4}\t{}\t{}",
            m.record1_id, m.record2_id, m.duplicate_probability, m.recommendation, features
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_threshold() {
        assert!((parse_threshold("0.85").unwrap() - 0.85).abs() < f64::EPSILON);
        assert!(parse_threshold("0").is_ok());
        assert!(parse_threshold("1").is_ok());
        assert!(parse_threshold("1.5").is_err());
        assert!(parse_threshold("-0.1").is_err());
        assert!(parse_threshold("high").is_err());
    }

    #[test]
    fn test_timer_fires() {
        let stop = Arc::new(AtomicBool::new(false));
        let (cancel, handle) = spawn_timer(Duration::from_millis(10), Arc::clone(&stop));
        handle.join().unwrap();
        drop(cancel);
        assert!(stop.load(Ordering::Relaxed));
    }

    #[test]
    fn test_stop_timer_reports_panicked_thread() {
        let (cancel, _wait) = mpsc::channel::<()>();
        let handle: thread::JoinHandle<()> = thread::spawn(|| panic!("timer failure"));
        let err = stop_timer(cancel, handle).unwrap_err();
        assert!(err.to_string().contains("panicked"));
    }

    #[test]
    fn test_stop_timer_after_cancel() {
        let stop = Arc::new(AtomicBool::new(false));
        let (cancel, handle) = spawn_timer(Duration::from_secs(60), Arc::clone(&stop));
        stop_timer(cancel, handle).unwrap();
        assert!(!stop.load(Ordering::Relaxed));
    }

    #[test]
    fn test_timer_cancelled() {
        let stop = Arc::new(AtomicBool::new(false));
        let (cancel, handle) = spawn_timer(Duration::from_secs(60), Arc::clone(&stop));
        drop(cancel);
        handle.join().unwrap();
        assert!(!stop.load(Ordering::Relaxed));
    }
}
