use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::features::FeatureVector;
use crate::core::record::PersonRecord;
use crate::core::types::{RecordId, Recommendation};
use crate::matching::engine::{DuplicateDetector, DEFAULT_THRESHOLD};
use crate::matching::strings::soundex;

/// A pair reported by a batch scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchMatch {
    pub record1_id: RecordId,
    pub record2_id: RecordId,
    pub duplicate_probability: f64,
    pub features: FeatureVector,
    pub recommendation: Recommendation,
}

/// Everything a batch scan produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanOutcome {
    /// Pairs at or above the threshold, ordered by (i, j)
    pub matches: Vec<BatchMatch>,
    /// Records left after scope filtering
    pub records_considered: usize,
    /// Pairs evaluated, including those that failed
    pub comparisons: usize,
    /// Pairs skipped because of a hard contract violation
    pub failures: usize,
    /// True if the stop signal ended the scan early
    pub cancelled: bool,
}

/// Groups records so that only records sharing a key are compared.
///
/// A record without a key is never paired.
pub trait BlockingStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn block_key(&self, record: &PersonRecord) -> Option<String>;
}

/// Exhaustive pairing: every record lands in the same block
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBlocking;

impl BlockingStrategy for NoBlocking {
    fn name(&self) -> &str {
        "none"
    }

    fn block_key(&self, _record: &PersonRecord) -> Option<String> {
        Some(String::new())
    }
}

/// Blocks on the Soundex code of the first name token
#[derive(Debug, Clone, Copy, Default)]
pub struct SoundexBlocking;

impl BlockingStrategy for SoundexBlocking {
    fn name(&self) -> &str {
        "soundex"
    }

    fn block_key(&self, record: &PersonRecord) -> Option<String> {
        let token = record.name.split_whitespace().next()?;
        let code = soundex(token);
        (!code.is_empty()).then_some(code)
    }
}

/// Blocks on the address pin code, ignoring embedded whitespace
#[derive(Debug, Clone, Copy, Default)]
pub struct PinCodeBlocking;

impl BlockingStrategy for PinCodeBlocking {
    fn name(&self) -> &str {
        "pin_code"
    }

    fn block_key(&self, record: &PersonRecord) -> Option<String> {
        let pin: String = record
            .address
            .pin_code
            .as_deref()?
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        (!pin.is_empty()).then_some(pin)
    }
}

/// Built-in blocking strategies, selectable from config and the CLI
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum BlockingKind {
    /// Compare every pair
    #[default]
    None,
    /// Compare only records whose first names share a Soundex code
    Soundex,
    /// Compare only records with the same pin code
    PinCode,
}

impl BlockingKind {
    #[must_use]
    pub fn strategy(self) -> Arc<dyn BlockingStrategy> {
        match self {
            Self::None => Arc::new(NoBlocking),
            Self::Soundex => Arc::new(SoundexBlocking),
            Self::PinCode => Arc::new(PinCodeBlocking),
        }
    }
}

/// Restricts a scan to part of the roll
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Scope {
    #[default]
    All,
    District(String),
    State(String),
}

impl Scope {
    /// Case-insensitive comparison against the record's address
    #[must_use]
    pub fn contains(&self, record: &PersonRecord) -> bool {
        let (wanted, actual) = match self {
            Self::All => return true,
            Self::District(d) => (d, record.address.district.as_deref()),
            Self::State(s) => (s, record.address.state.as_deref()),
        };
        actual.is_some_and(|actual| actual.trim().eq_ignore_ascii_case(wanted.trim()))
    }
}

/// Per-row results, merged in row order
#[derive(Default)]
struct RowOutcome {
    matches: Vec<BatchMatch>,
    comparisons: usize,
    failures: usize,
    cancelled: bool,
}

/// Compares all unordered record pairs and keeps the likely duplicates.
///
/// Pairs (i, j) with i < j are enumerated row by row. Rows are independent,
/// so in parallel mode each row runs as its own task and the rows are
/// concatenated in order; the output is identical to a sequential scan.
pub struct BatchScanner<'a> {
    detector: &'a DuplicateDetector,
    threshold: f64,
    blocking: Arc<dyn BlockingStrategy>,
    scope: Scope,
    parallel: bool,
}

impl<'a> BatchScanner<'a> {
    #[must_use]
    pub fn new(detector: &'a DuplicateDetector) -> Self {
        Self {
            detector,
            threshold: DEFAULT_THRESHOLD,
            blocking: Arc::new(NoBlocking),
            scope: Scope::All,
            parallel: true,
        }
    }

    /// Minimum probability for a pair to be reported.
    ///
    /// Values outside [0, 1] are clamped into it; NaN falls back to the
    /// default threshold. Both cases are logged at `warn`.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = if threshold.is_nan() {
            warn!(
                "Threshold is NaN; using default {:.2}",
                DEFAULT_THRESHOLD
            );
            DEFAULT_THRESHOLD
        } else if (0.0..=1.0).contains(&threshold) {
            threshold
        } else {
            let clamped = threshold.clamp(0.0, 1.0);
            warn!("Threshold {} is outside [0, 1]; using {:.2}", threshold, clamped);
            clamped
        };
        self
    }

    #[must_use]
    pub fn with_blocking(mut self, blocking: Arc<dyn BlockingStrategy>) -> Self {
        self.blocking = blocking;
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Run rows on the current rayon pool (true) or on the calling thread
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Scan `records`, checking `stop` before every pair.
    ///
    /// Matches found before the stop signal is raised are kept.
    #[must_use]
    pub fn scan(&self, records: &[PersonRecord], stop: Option<&AtomicBool>) -> ScanOutcome {
        let records: Vec<&PersonRecord> = records
            .iter()
            .filter(|r| self.scope.contains(r))
            .collect();

        info!(
            "Scanning {} records (blocking: {}, threshold: {:.2}, classifier: {})",
            records.len(),
            self.blocking.name(),
            self.threshold,
            self.detector.classifier().name()
        );

        let keys: Vec<Option<String>> = records
            .iter()
            .map(|r| self.blocking.block_key(r))
            .collect();

        // Member lists are built in index order, so they stay sorted
        let mut blocks: HashMap<&str, Vec<usize>> = HashMap::new();
        for (i, key) in keys.iter().enumerate() {
            if let Some(key) = key {
                blocks.entry(key.as_str()).or_default().push(i);
            }
        }
        debug!("{} blocks", blocks.len());

        let row = |i: usize| -> RowOutcome {
            let Some(key) = keys[i].as_deref() else {
                return RowOutcome::default();
            };
            let members = blocks.get(key).map_or(&[][..], Vec::as_slice);
            let start = members.partition_point(|&j| j <= i);
            self.scan_row(&records, i, &members[start..], stop)
        };

        let rows: Vec<RowOutcome> = if self.parallel {
            (0..records.len()).into_par_iter().map(row).collect()
        } else {
            (0..records.len()).map(row).collect()
        };

        let mut outcome = ScanOutcome {
            records_considered: records.len(),
            ..ScanOutcome::default()
        };
        for row in rows {
            outcome.matches.extend(row.matches);
            outcome.comparisons += row.comparisons;
            outcome.failures += row.failures;
            outcome.cancelled |= row.cancelled;
        }

        if outcome.cancelled {
            info!(
                "Scan stopped early after {} comparisons",
                outcome.comparisons
            );
        }
        info!(
            "Scan finished: {} comparisons, {} matches, {} failed pairs",
            outcome.comparisons,
            outcome.matches.len(),
            outcome.failures
        );

        outcome
    }

    fn scan_row(
        &self,
        records: &[&PersonRecord],
        i: usize,
        partners: &[usize],
        stop: Option<&AtomicBool>,
    ) -> RowOutcome {
        let mut outcome = RowOutcome::default();
        let a = records[i];

        for &j in partners {
            if stop.is_some_and(|s| s.load(Ordering::Relaxed)) {
                outcome.cancelled = true;
                break;
            }

            let b = records[j];
            outcome.comparisons += 1;

            match self.detector.compare(a, b) {
                Ok(result) if result.duplicate_probability >= self.threshold => {
                    outcome.matches.push(BatchMatch {
                        record1_id: a.id.clone(),
                        record2_id: b.id.clone(),
                        duplicate_probability: result.duplicate_probability,
                        features: result.features,
                        recommendation: result.recommendation,
                    });
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Skipping pair ({}, {}): {}", a.id, b.id, e);
                    outcome.failures += 1;
                }
            }
        }

        outcome
    }
}
