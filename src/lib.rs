//! Synheart Pulse - On-device scoring engine for daily physiology
//!
//! Pulse turns raw daily measurements (sleep stages, heart rate, HRV,
//! respiratory rate, activity energy, steps) into three normalized,
//! explainable composite scores - Sleep, Recovery, Effort - plus a derived
//! Readiness blend. Scores are normalized against a personal 14-day rolling
//! baseline rather than fixed population thresholds, and degrade gracefully
//! when inputs are missing.
//!
//! ## Modules
//!
//! - **baseline**: rolling per-metric statistics with cold-start blending
//! - **night**: sleep-interval aggregation across day boundaries
//! - **sleep / recovery / effort**: the three score calculators
//! - **engine**: today's scores and historical per-day series

pub mod baseline;
pub mod effort;
pub mod engine;
pub mod error;
pub mod night;
pub mod recovery;
pub mod sleep;
pub mod source;
pub mod storage;
pub mod types;

pub use baseline::{Baseline, BaselineEntry, BaselineStore, BASELINE_WINDOW_DAYS};
pub use effort::EffortScoreCalculator;
pub use engine::{readiness, readiness_label, DayScores, ScoreEngine, TodayScores};
pub use error::PulseError;
pub use recovery::RecoveryScoreCalculator;
pub use sleep::SleepScoreCalculator;
pub use source::{HealthDataSource, ReplaySource};
pub use storage::{BaselineStorage, MemoryStorage};
pub use types::{
    DayInputs, DayRecord, DetailedSleepData, Metric, ScoreComponent, ScoreKind, ScoreResult,
    ScoreTimeSeriesPoint, SeriesStats, SleepInterval, SleepStage, TimeRange,
};

/// Pulse version embedded in CLI output
pub const PULSE_VERSION: &str = env!("CARGO_PKG_VERSION");
