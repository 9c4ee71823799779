//! Baseline management
//!
//! This module maintains a 14-day rolling window of daily values per metric
//! and derives personal baseline statistics from it. Short histories are
//! blended toward population defaults so early z-scores stay sane, and
//! stored standard deviations are floored to keep division well-behaved.

use crate::storage::{BaselineStorage, MemoryStorage};
use crate::types::Metric;
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Rolling window length in days
pub const BASELINE_WINDOW_DAYS: i64 = 14;

/// Days of history after which population defaults stop contributing
pub const BLEND_HORIZON: usize = 7;

/// Assumed stddev for a population default, as a fraction of its mean
const POPULATION_STDDEV_FRACTION: f64 = 0.15;

/// Floor applied to personal stddevs to avoid division blow-ups
const STDDEV_FLOOR: f64 = 0.01;

/// One recorded daily value inside a metric's rolling window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineEntry {
    pub date: NaiveDate,
    pub value: f64,
}

/// Derived baseline statistics for one metric (never stored)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub average: f64,
    pub stddev: f64,
    /// Number of recorded days backing the personal component
    pub count: usize,
}

/// Store for per-metric rolling baselines
pub struct BaselineStore {
    storage: Arc<dyn BaselineStorage>,
}

impl BaselineStore {
    /// Create a store over an injected blob storage
    pub fn new(storage: Arc<dyn BaselineStorage>) -> Self {
        Self { storage }
    }

    /// Create a store backed by in-memory storage
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Record today's value for a metric
    pub fn record(&mut self, metric: Metric, value: f64) {
        self.record_on(metric, value, Utc::now().date_naive());
    }

    /// Record a value for a metric on a specific day.
    ///
    /// Upserts the same-day entry, then re-persists the window trimmed to
    /// the trailing 14 days. Trimming runs on every write, anchored to
    /// wall-clock today.
    pub fn record_on(&mut self, metric: Metric, value: f64, date: NaiveDate) {
        let mut entries = self.load_entries(metric);

        match entries.iter_mut().find(|e| e.date == date) {
            Some(entry) => entry.value = value,
            None => entries.push(BaselineEntry { date, value }),
        }

        let cutoff = Utc::now().date_naive() - Duration::days(BASELINE_WINDOW_DAYS);
        entries.retain(|e| e.date >= cutoff);
        entries.sort_by_key(|e| e.date);

        self.save_entries(metric, &entries);
    }

    /// Current baseline statistics for a metric.
    ///
    /// With no history this is the population default (stddev 15% of the
    /// mean). With fewer than 7 recorded days the personal statistics are
    /// linearly blended toward the default with weight `count / 7`.
    pub fn baseline(&self, metric: Metric) -> Baseline {
        let entries = self.load_entries(metric);
        let pop = metric.population_default();

        if entries.is_empty() {
            return match pop {
                Some(pop) => Baseline {
                    average: pop,
                    stddev: pop * POPULATION_STDDEV_FRACTION,
                    count: 0,
                },
                None => Baseline {
                    average: 0.0,
                    stddev: 0.0,
                    count: 0,
                },
            };
        }

        let count = entries.len();
        let mean = entries.iter().map(|e| e.value).sum::<f64>() / count as f64;
        // Population (not sample) standard deviation over the window
        let variance =
            entries.iter().map(|e| (e.value - mean).powi(2)).sum::<f64>() / count as f64;
        let stddev = variance.sqrt();

        if count < BLEND_HORIZON {
            if let Some(pop) = pop {
                let w = count as f64 / BLEND_HORIZON as f64;
                return Baseline {
                    average: w * mean + (1.0 - w) * pop,
                    stddev: w * stddev.max(STDDEV_FLOOR)
                        + (1.0 - w) * (pop * POPULATION_STDDEV_FRACTION),
                    count,
                };
            }
        }

        Baseline {
            average: mean,
            stddev: stddev.max(STDDEV_FLOOR),
            count,
        }
    }

    /// Z-score of a value against the metric's baseline, clamped to [-3, 3].
    ///
    /// Returns 0 when the baseline stddev is not positive.
    pub fn z_score(&self, metric: Metric, value: f64) -> f64 {
        let baseline = self.baseline(metric);
        if baseline.stddev <= 0.0 {
            return 0.0;
        }
        ((value - baseline.average) / baseline.stddev).clamp(-3.0, 3.0)
    }

    fn storage_key(metric: Metric) -> String {
        format!("baseline_{}", metric.key())
    }

    fn load_entries(&self, metric: Metric) -> Vec<BaselineEntry> {
        let Some(blob) = self.storage.get(&Self::storage_key(metric)) else {
            return Vec::new();
        };
        match serde_json::from_str(&blob) {
            Ok(entries) => entries,
            Err(e) => {
                // Corrupt state falls back to population defaults
                warn!(metric = metric.key(), error = %e, "unreadable baseline blob, treating as empty");
                Vec::new()
            }
        }
    }

    fn save_entries(&self, metric: Metric, entries: &[BaselineEntry]) {
        match serde_json::to_string(entries) {
            Ok(blob) => self.storage.set(&Self::storage_key(metric), &blob),
            Err(e) => warn!(metric = metric.key(), error = %e, "failed to serialize baseline window"),
        }
    }
}
