//! Core types for the Synheart Pulse scoring engine
//!
//! This module defines the data structures that flow through scoring:
//! metric identifiers, nightly sleep data, score components and results,
//! and the time-series types produced by historical replay.

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Identifier for one of the daily signals the engine consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Hrv,
    RestingHr,
    RespiratoryRate,
    SleepHours,
    ActiveEnergy,
    ExerciseMinutes,
    Steps,
    HeartRate,
}

impl Metric {
    /// Stable identifier, also used as the baseline storage key suffix
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Hrv => "hrv",
            Metric::RestingHr => "resting_hr",
            Metric::RespiratoryRate => "respiratory_rate",
            Metric::SleepHours => "sleep_hours",
            Metric::ActiveEnergy => "active_energy",
            Metric::ExerciseMinutes => "exercise_minutes",
            Metric::Steps => "steps",
            Metric::HeartRate => "heart_rate",
        }
    }

    /// Display unit for raw values
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Hrv => "ms",
            Metric::RestingHr => "bpm",
            Metric::RespiratoryRate => "br/min",
            Metric::SleepHours => "hrs",
            Metric::ActiveEnergy => "kcal",
            Metric::ExerciseMinutes => "min",
            Metric::Steps => "steps",
            Metric::HeartRate => "bpm",
        }
    }

    /// Population-typical mean used to seed baselines during cold start.
    ///
    /// Metrics without a default never blend and fall back to an empty
    /// baseline when no history exists.
    pub fn population_default(&self) -> Option<f64> {
        match self {
            Metric::Hrv => Some(40.0),
            Metric::RestingHr => Some(65.0),
            Metric::RespiratoryRate => Some(15.0),
            Metric::SleepHours => Some(7.0),
            Metric::ActiveEnergy => Some(500.0),
            Metric::ExerciseMinutes => Some(30.0),
            Metric::Steps => Some(8000.0),
            Metric::HeartRate => None,
        }
    }
}

/// Sleep stage classification for category-interval samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepStage {
    InBed,
    AsleepCore,
    AsleepDeep,
    AsleepRem,
    AsleepUnspecified,
    Awake,
}

/// One contiguous sleep-stage interval as delivered by the data source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepInterval {
    pub stage: SleepStage,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SleepInterval {
    pub fn new(stage: SleepStage, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { stage, start, end }
    }

    /// Interval length in seconds, zero when end precedes start
    pub fn duration_secs(&self) -> f64 {
        ((self.end - self.start).num_milliseconds().max(0) as f64) / 1000.0
    }
}

/// Aggregated data for one night of sleep.
///
/// Built fresh per query from interval samples; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedSleepData {
    /// Total asleep time (hours)
    pub total_hours: f64,
    /// Core/light sleep (hours)
    pub core_hours: f64,
    /// Deep sleep (hours)
    pub deep_hours: f64,
    /// REM sleep (hours)
    pub rem_hours: f64,
    /// Total time in bed (hours); 0 when no in-bed intervals were recorded
    pub in_bed_hours: f64,
    /// True when any deep or REM time was recorded
    pub has_stage_data: bool,
    /// Earliest in-bed start (estimated from asleep intervals if absent)
    pub bedtime: Option<DateTime<Utc>>,
    /// Latest in-bed end (estimated from asleep intervals if absent)
    pub wake_time: Option<DateTime<Utc>>,
    /// Bedtimes from recent nights, consumed only by the consistency score
    pub recent_bedtimes: Vec<DateTime<Utc>>,
    /// Wake times from recent nights, consumed only by the consistency score
    pub recent_wake_times: Vec<DateTime<Utc>>,
}

impl DetailedSleepData {
    /// A night with no recorded sleep
    pub fn empty() -> Self {
        Self {
            total_hours: 0.0,
            core_hours: 0.0,
            deep_hours: 0.0,
            rem_hours: 0.0,
            in_bed_hours: 0.0,
            has_stage_data: false,
            bedtime: None,
            wake_time: None,
            recent_bedtimes: Vec::new(),
            recent_wake_times: Vec::new(),
        }
    }
}

impl Default for DetailedSleepData {
    fn default() -> Self {
        Self::empty()
    }
}

/// The three composite score families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreKind {
    Sleep,
    Recovery,
    Effort,
}

impl ScoreKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ScoreKind::Sleep => "Sleep",
            ScoreKind::Recovery => "Recovery",
            ScoreKind::Effort => "Effort",
        }
    }

    /// Upper bound of the score scale (effort is strain, 0-21)
    pub fn max_value(&self) -> f64 {
        match self {
            ScoreKind::Sleep | ScoreKind::Recovery => 100.0,
            ScoreKind::Effort => 21.0,
        }
    }

    /// Qualitative band for a score value
    pub fn label(&self, value: f64) -> &'static str {
        match self {
            ScoreKind::Sleep => {
                if value >= 85.0 {
                    "Excellent"
                } else if value >= 70.0 {
                    "Good"
                } else if value >= 50.0 {
                    "Fair"
                } else {
                    "Poor"
                }
            }
            ScoreKind::Recovery => {
                if value >= 67.0 {
                    "Recovered"
                } else if value >= 34.0 {
                    "Moderate"
                } else {
                    "Low"
                }
            }
            ScoreKind::Effort => {
                if value >= 18.0 {
                    "All-Out"
                } else if value >= 14.0 {
                    "High"
                } else if value >= 7.0 {
                    "Moderate"
                } else {
                    "Light"
                }
            }
        }
    }

    /// Format a score value for display (strain keeps one decimal)
    pub fn format_value(&self, value: f64) -> String {
        match self {
            ScoreKind::Sleep | ScoreKind::Recovery => format!("{}", value.round() as i64),
            ScoreKind::Effort => format!("{value:.1}"),
        }
    }
}

/// One weighted contributor to a composite score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub id: Uuid,
    /// Human-readable factor name (e.g. "Duration", "HRV")
    pub name: String,
    /// Raw input value, absent when the underlying metric was missing
    pub raw_value: Option<f64>,
    /// Display unit for the raw value
    pub raw_unit: String,
    /// Factor score, 0-100
    pub score: f64,
    /// Weight after redistribution, 0-1
    pub weight: f64,
}

impl ScoreComponent {
    pub fn new(
        name: impl Into<String>,
        raw_value: Option<f64>,
        raw_unit: impl Into<String>,
        score: f64,
        weight: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            raw_value,
            raw_unit: raw_unit.into(),
            score,
            weight,
        }
    }

    /// Contribution of this component to the composite
    pub fn weighted_score(&self) -> f64 {
        self.score * self.weight
    }

    /// Raw value rendered for display, `None` when no raw value exists
    pub fn formatted_raw(&self) -> Option<String> {
        let value = self.raw_value?;
        Some(match self.raw_unit.as_str() {
            "hrs" => {
                let total_minutes = (value * 60.0).round() as i64;
                format!("{}h {}m", total_minutes / 60, total_minutes % 60)
            }
            "%" => format!("{value:.1}%"),
            "" => format!("{value:.1}"),
            unit => format!("{value:.1} {unit}"),
        })
    }
}

/// A computed composite score with its component breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    pub id: Uuid,
    pub kind: ScoreKind,
    /// Composite value: 0-100 for sleep/recovery, 0-21 for effort
    pub value: f64,
    pub components: Vec<ScoreComponent>,
    /// When this result was computed (UTC)
    pub date: DateTime<Utc>,
    /// Short human-readable interpretation
    pub insight: Option<String>,
}

impl ScoreResult {
    pub fn new(
        kind: ScoreKind,
        value: f64,
        components: Vec<ScoreComponent>,
        insight: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            value,
            components,
            date: Utc::now(),
            insight,
        }
    }
}

/// One day's value in a historical score series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreTimeSeriesPoint {
    pub id: Uuid,
    pub date: NaiveDate,
    pub value: f64,
}

impl ScoreTimeSeriesPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            value,
        }
    }
}

/// Summary statistics over a score series
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeriesStats {
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

impl SeriesStats {
    /// Compute stats over a series; `None` when the series is empty
    pub fn from_points(points: &[ScoreTimeSeriesPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let sum: f64 = points.iter().map(|p| p.value).sum();
        let min = points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
        let max = points
            .iter()
            .map(|p| p.value)
            .fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            average: sum / points.len() as f64,
            min,
            max,
        })
    }
}

/// Preset lookback ranges for historical series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    Week,
    Month,
    ThreeMonths,
    Year,
}

impl TimeRange {
    pub fn days(&self) -> i64 {
        match self {
            TimeRange::Week => 7,
            TimeRange::Month => 30,
            TimeRange::ThreeMonths => 90,
            TimeRange::Year => 365,
        }
    }

    /// First day of the range, relative to today (UTC)
    pub fn start_date(&self) -> NaiveDate {
        Utc::now().date_naive() - Duration::days(self.days())
    }
}

/// One day's fetched raw inputs, bundled for uniform score dispatch
#[derive(Debug, Clone, Default)]
pub struct DayInputs {
    pub sleep: DetailedSleepData,
    pub hrv: Option<f64>,
    pub resting_hr: Option<f64>,
    pub respiratory_rate: Option<f64>,
    pub active_energy: Option<f64>,
    pub exercise_minutes: Option<f64>,
    pub steps: Option<f64>,
    pub avg_hr: Option<f64>,
}

/// One day of raw source data, the replay-source input row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    /// Day-level numeric metrics keyed by metric identifier
    #[serde(default)]
    pub metrics: HashMap<Metric, f64>,
    /// Sleep-stage intervals overlapping this calendar day
    #[serde(default)]
    pub sleep: Vec<SleepInterval>,
}

/// Seconds since midnight for a timestamp, used by the consistency score.
///
/// Times before 06:00 are shifted forward a day so a bedtime spread that
/// straddles midnight does not produce an artificial wrap-around jump.
pub(crate) fn seconds_since_midnight_shifted(t: &DateTime<Utc>) -> f64 {
    let secs = f64::from(t.num_seconds_from_midnight());
    if secs < 6.0 * 3600.0 {
        secs + 24.0 * 3600.0
    } else {
        secs
    }
}
