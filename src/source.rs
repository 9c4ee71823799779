//! Health data source seam
//!
//! The scoring core reads raw daily values through the `HealthDataSource`
//! trait. All calls are read-only and fail soft: any collaborator-side
//! failure surfaces as absent data, never as an error into the core.
//! `ReplaySource` is the in-crate implementation over static day records,
//! used by tests and the CLI.

use crate::error::PulseError;
use crate::night;
use crate::types::{DayRecord, DetailedSleepData, Metric, SleepInterval};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

/// Read-only access to raw daily health data
#[async_trait]
pub trait HealthDataSource: Send + Sync {
    /// Today's value for a metric, `None` when absent or unreadable
    async fn today_value(&self, metric: Metric) -> Option<f64>;

    /// A specific day's value for a metric
    async fn day_value(&self, metric: Metric, date: NaiveDate) -> Option<f64>;

    /// Aggregated sleep data for one night (keyed by its evening's date)
    async fn detailed_sleep_data(&self, night: NaiveDate) -> DetailedSleepData;
}

/// Data source over in-memory day records
#[derive(Debug)]
pub struct ReplaySource {
    records: Vec<DayRecord>,
}

impl ReplaySource {
    pub fn new(records: Vec<DayRecord>) -> Self {
        Self { records }
    }

    /// Parse a JSON array of day records
    pub fn from_json(json: &str) -> Result<Self, PulseError> {
        let records: Vec<DayRecord> = serde_json::from_str(json)
            .map_err(|e| PulseError::ParseError(e.to_string()))?;
        Ok(Self::new(records))
    }

    /// Date range covered by the records, `None` when empty
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some((min, max))
    }

    /// All sleep intervals falling inside one night's query window
    fn night_intervals(&self, night: NaiveDate) -> Vec<SleepInterval> {
        let (start, end) = night::query_window(night);
        self.records
            .iter()
            .flat_map(|r| r.sleep.iter())
            .filter(|i| i.start < end && i.end > start)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl HealthDataSource for ReplaySource {
    async fn today_value(&self, metric: Metric) -> Option<f64> {
        self.day_value(metric, Utc::now().date_naive()).await
    }

    async fn day_value(&self, metric: Metric, date: NaiveDate) -> Option<f64> {
        self.records
            .iter()
            .find(|r| r.date == date)
            .and_then(|r| r.metrics.get(&metric).copied())
    }

    async fn detailed_sleep_data(&self, night: NaiveDate) -> DetailedSleepData {
        night::build_sleep_data(&self.night_intervals(night))
    }
}
