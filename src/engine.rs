//! Score orchestration
//!
//! `ScoreEngine` ties the pieces together: it fetches one day's raw inputs
//! from the data source (the eight today-scoped fetches run concurrently),
//! feeds the baseline store, runs the calculators in dependency order, and
//! replays arbitrary date ranges into per-day score series.

use crate::baseline::BaselineStore;
use crate::effort::EffortScoreCalculator;
use crate::recovery::RecoveryScoreCalculator;
use crate::sleep::SleepScoreCalculator;
use crate::source::HealthDataSource;
use crate::types::{
    DayInputs, Metric, ScoreKind, ScoreResult, ScoreTimeSeriesPoint,
};
use chrono::{Duration, NaiveDate, Utc};
use std::sync::Arc;
use tracing::debug;

/// Readiness blend weights over the three scores
const READINESS_SLEEP_WEIGHT: f64 = 0.35;
const READINESS_RECOVERY_WEIGHT: f64 = 0.40;
const READINESS_EFFORT_WEIGHT: f64 = 0.25;

/// Derived readiness blend: high effort lowers readiness via its inverse.
pub fn readiness(sleep: f64, recovery: f64, effort: f64) -> f64 {
    let effort_inverse = (100.0 - effort / 21.0 * 100.0).max(0.0);
    sleep * READINESS_SLEEP_WEIGHT
        + recovery * READINESS_RECOVERY_WEIGHT
        + effort_inverse * READINESS_EFFORT_WEIGHT
}

/// Qualitative band for a readiness value
pub fn readiness_label(value: f64) -> &'static str {
    if value >= 70.0 {
        "Ready"
    } else if value >= 40.0 {
        "Moderate"
    } else {
        "Low"
    }
}

/// The three scores computed for today
#[derive(Debug, Clone)]
pub struct TodayScores {
    pub sleep: ScoreResult,
    pub recovery: ScoreResult,
    pub effort: ScoreResult,
}

impl TodayScores {
    /// Readiness blend over the three values
    pub fn readiness(&self) -> f64 {
        readiness(self.sleep.value, self.recovery.value, self.effort.value)
    }
}

/// Guarded per-day scores produced by historical replay; a score is absent
/// when the day lacks its prerequisite data
#[derive(Debug, Clone, Default)]
pub struct DayScores {
    pub sleep: Option<ScoreResult>,
    pub recovery: Option<ScoreResult>,
    pub effort: Option<ScoreResult>,
}

impl ScoreKind {
    /// Compute this kind of score from one day's inputs, or `None` when
    /// the day lacks the prerequisite data. Replay dispatches through this
    /// uniformly, with no kind-specific branching outside the calculators.
    pub fn compute(
        self,
        store: &mut BaselineStore,
        date: NaiveDate,
        inputs: &DayInputs,
    ) -> Option<ScoreResult> {
        match self {
            ScoreKind::Sleep => {
                if inputs.sleep.total_hours <= 0.0 {
                    return None;
                }
                store.record_on(Metric::SleepHours, inputs.sleep.total_hours, date);
                Some(SleepScoreCalculator::calculate(&inputs.sleep))
            }
            ScoreKind::Recovery => {
                if inputs.sleep.total_hours <= 0.0 {
                    return None;
                }
                store.record_on(Metric::SleepHours, inputs.sleep.total_hours, date);
                let sleep_score = SleepScoreCalculator::calculate(&inputs.sleep);
                Some(RecoveryScoreCalculator::calculate(
                    store,
                    date,
                    inputs.hrv,
                    inputs.resting_hr,
                    inputs.respiratory_rate,
                    sleep_score.value,
                ))
            }
            ScoreKind::Effort => {
                if inputs.active_energy.is_none()
                    && inputs.exercise_minutes.is_none()
                    && inputs.steps.is_none()
                {
                    return None;
                }
                Some(EffortScoreCalculator::calculate(
                    store,
                    date,
                    inputs.active_energy,
                    inputs.exercise_minutes,
                    inputs.steps,
                    inputs.avg_hr,
                    inputs.resting_hr,
                ))
            }
        }
    }
}

/// Orchestrator over a data source and a baseline store
pub struct ScoreEngine {
    source: Arc<dyn HealthDataSource>,
    baselines: BaselineStore,
    latest: Option<TodayScores>,
}

impl ScoreEngine {
    /// Create an engine with an in-memory baseline store
    pub fn new(source: Arc<dyn HealthDataSource>) -> Self {
        Self::with_baselines(source, BaselineStore::in_memory())
    }

    /// Create an engine over an existing baseline store
    pub fn with_baselines(source: Arc<dyn HealthDataSource>, baselines: BaselineStore) -> Self {
        Self {
            source,
            baselines,
            latest: None,
        }
    }

    /// Most recently computed today-scores, if any
    pub fn latest(&self) -> Option<&TodayScores> {
        self.latest.as_ref()
    }

    /// Compute today's three scores.
    ///
    /// The eight inputs are fetched concurrently and joined before any
    /// calculator runs; each fetch fails soft to absent on its own. The
    /// calculators then run in dependency order: sleep feeds recovery,
    /// effort is independent.
    pub async fn compute_today(&mut self) -> TodayScores {
        let today = Utc::now().date_naive();
        let last_night = today - Duration::days(1);

        let (sleep, hrv, resting_hr, respiratory_rate, active_energy, exercise_minutes, steps, avg_hr) = tokio::join!(
            self.source.detailed_sleep_data(last_night),
            self.source.today_value(Metric::Hrv),
            self.source.today_value(Metric::RestingHr),
            self.source.today_value(Metric::RespiratoryRate),
            self.source.today_value(Metric::ActiveEnergy),
            self.source.today_value(Metric::ExerciseMinutes),
            self.source.today_value(Metric::Steps),
            self.source.today_value(Metric::HeartRate),
        );

        if sleep.total_hours > 0.0 {
            self.baselines
                .record_on(Metric::SleepHours, sleep.total_hours, today);
        }

        let sleep_result = SleepScoreCalculator::calculate(&sleep);
        let recovery_result = RecoveryScoreCalculator::calculate(
            &mut self.baselines,
            today,
            hrv,
            resting_hr,
            respiratory_rate,
            sleep_result.value,
        );
        let effort_result = EffortScoreCalculator::calculate(
            &mut self.baselines,
            today,
            active_energy,
            exercise_minutes,
            steps,
            avg_hr,
            resting_hr,
        );

        let scores = TodayScores {
            sleep: sleep_result,
            recovery: recovery_result,
            effort: effort_result,
        };
        self.latest = Some(scores.clone());
        scores
    }

    /// Fetch one day's raw inputs. The numeric fetches and the night's
    /// sleep aggregation are joined concurrently, like the today path.
    pub async fn fetch_day_inputs(&self, date: NaiveDate) -> DayInputs {
        let night = date - Duration::days(1);
        let (sleep, hrv, resting_hr, respiratory_rate, active_energy, exercise_minutes, steps, avg_hr) = tokio::join!(
            self.source.detailed_sleep_data(night),
            self.source.day_value(Metric::Hrv, date),
            self.source.day_value(Metric::RestingHr, date),
            self.source.day_value(Metric::RespiratoryRate, date),
            self.source.day_value(Metric::ActiveEnergy, date),
            self.source.day_value(Metric::ExerciseMinutes, date),
            self.source.day_value(Metric::Steps, date),
            self.source.day_value(Metric::HeartRate, date),
        );

        DayInputs {
            sleep,
            hrv,
            resting_hr,
            respiratory_rate,
            active_energy,
            exercise_minutes,
            steps,
            avg_hr,
        }
    }

    /// Replay one day through all three calculators with the guards
    /// applied. Baseline entries are recorded under the replayed date.
    pub async fn replay_day(&mut self, date: NaiveDate) -> DayScores {
        let inputs = self.fetch_day_inputs(date).await;
        DayScores {
            sleep: ScoreKind::Sleep.compute(&mut self.baselines, date, &inputs),
            recovery: ScoreKind::Recovery.compute(&mut self.baselines, date, &inputs),
            effort: ScoreKind::Effort.compute(&mut self.baselines, date, &inputs),
        }
    }

    /// Historical per-day series for one score kind, from `since` through
    /// today inclusive.
    ///
    /// Days run sequentially so baseline mutation order matches calendar
    /// order; the rolling statistics legitimately drift across the sweep.
    /// Days without prerequisite data are omitted, never zero-filled.
    pub async fn score_time_series(
        &mut self,
        kind: ScoreKind,
        since: NaiveDate,
    ) -> Vec<ScoreTimeSeriesPoint> {
        let today = Utc::now().date_naive();
        let mut points = Vec::new();

        let mut date = since;
        while date <= today {
            let inputs = self.fetch_day_inputs(date).await;
            match kind.compute(&mut self.baselines, date, &inputs) {
                Some(result) => points.push(ScoreTimeSeriesPoint::new(date, result.value)),
                None => debug!(kind = ?kind, %date, "skipping day without prerequisite data"),
            }
            date += Duration::days(1);
        }

        points
    }
}
