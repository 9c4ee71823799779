//! Sleep score calculation
//!
//! Composite 0-100 sleep score over four weighted factors: duration, stage
//! quality, efficiency, and schedule consistency. Factors whose inputs are
//! missing fold their weight into duration before anything is scored, so
//! the remaining weights always sum to 1.0.

use crate::types::{seconds_since_midnight_shifted, DetailedSleepData, ScoreComponent, ScoreKind, ScoreResult};
use chrono::{DateTime, Utc};

/// Nominal factor weights
const DURATION_WEIGHT: f64 = 0.40;
const STAGE_WEIGHT: f64 = 0.25;
const EFFICIENCY_WEIGHT: f64 = 0.15;
const CONSISTENCY_WEIGHT: f64 = 0.20;

/// Target deep and REM shares of total sleep (percent)
const DEEP_TARGET_PCT: f64 = 17.5;
const REM_TARGET_PCT: f64 = 22.5;

/// Calculator for the nightly sleep score
pub struct SleepScoreCalculator;

impl SleepScoreCalculator {
    /// Compute the sleep score for one night. Pure: reads only its input.
    pub fn calculate(data: &DetailedSleepData) -> ScoreResult {
        let mut duration_weight = DURATION_WEIGHT;
        let mut stage_weight = STAGE_WEIGHT;
        let mut efficiency_weight = EFFICIENCY_WEIGHT;

        // Missing inputs fold into duration before any factor is scored.
        // Consistency always produces a score and keeps its weight.
        if !data.has_stage_data {
            duration_weight += stage_weight;
            stage_weight = 0.0;
        }
        if data.in_bed_hours <= 0.0 {
            duration_weight += efficiency_weight;
            efficiency_weight = 0.0;
        }

        let mut components = Vec::new();

        let duration_score = score_duration(data.total_hours);
        components.push(ScoreComponent::new(
            "Duration",
            Some(data.total_hours),
            "hrs",
            duration_score,
            duration_weight,
        ));

        if data.has_stage_data {
            let total_sleep = data.total_hours.max(0.01);
            let deep_pct = data.deep_hours / total_sleep * 100.0;
            let rem_pct = data.rem_hours / total_sleep * 100.0;
            let stage_score = (stage_sub_score(deep_pct, DEEP_TARGET_PCT)
                + stage_sub_score(rem_pct, REM_TARGET_PCT))
                / 2.0;
            components.push(ScoreComponent::new(
                "Stage Quality",
                Some(deep_pct + rem_pct),
                "%",
                stage_score,
                stage_weight,
            ));
        }

        if data.in_bed_hours > 0.0 {
            let efficiency = data.total_hours / data.in_bed_hours;
            let efficiency_score = ((efficiency - 0.70) / 0.25 * 100.0).clamp(0.0, 100.0);
            components.push(ScoreComponent::new(
                "Efficiency",
                Some(efficiency * 100.0),
                "%",
                efficiency_score,
                efficiency_weight,
            ));
        }

        let consistency_score =
            score_consistency(&data.recent_bedtimes, &data.recent_wake_times);
        components.push(ScoreComponent::new(
            "Consistency",
            None,
            "",
            consistency_score,
            CONSISTENCY_WEIGHT,
        ));

        let value = components
            .iter()
            .map(ScoreComponent::weighted_score)
            .sum::<f64>()
            .clamp(0.0, 100.0);

        let insight = insight_for(value, data.total_hours);
        ScoreResult::new(ScoreKind::Sleep, value, components, Some(insight))
    }
}

/// Duration factor: 7-9 hours scores 100, linear penalties outside the band
fn score_duration(hours: f64) -> f64 {
    if hours < 7.0 {
        (100.0 - (7.0 - hours) * 33.0).max(0.0)
    } else if hours > 9.0 {
        (100.0 - (hours - 9.0) * 20.0).max(0.0)
    } else {
        100.0
    }
}

/// Sub-score for one stage's share against its target percentage
fn stage_sub_score(pct: f64, target: f64) -> f64 {
    (100.0 - (pct - target).abs() / target * 100.0).max(0.0)
}

/// Consistency factor over recent bed/wake times.
///
/// With at least two samples in each list, scores the average spread of
/// bed and wake clock times (0h spread -> 100, 1.5h -> 0). Otherwise a
/// neutral 50: the fetch path never populates these lists today, so the
/// neutral branch is what live data takes.
fn score_consistency(bedtimes: &[DateTime<Utc>], wake_times: &[DateTime<Utc>]) -> f64 {
    if bedtimes.len() < 2 || wake_times.len() < 2 {
        return 50.0;
    }

    let bed_stddev_hours = clock_stddev_seconds(bedtimes) / 3600.0;
    let wake_stddev_hours = clock_stddev_seconds(wake_times) / 3600.0;
    let avg_spread = (bed_stddev_hours + wake_stddev_hours) / 2.0;

    ((1.0 - avg_spread / 1.5) * 100.0).clamp(0.0, 100.0)
}

/// Population stddev of clock times in seconds since midnight, with the
/// pre-06:00 shift applied so spreads straddling midnight stay continuous
fn clock_stddev_seconds(times: &[DateTime<Utc>]) -> f64 {
    let seconds: Vec<f64> = times.iter().map(seconds_since_midnight_shifted).collect();
    let mean = seconds.iter().sum::<f64>() / seconds.len() as f64;
    let variance =
        seconds.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / seconds.len() as f64;
    variance.sqrt()
}

fn insight_for(value: f64, total_hours: f64) -> String {
    if total_hours < 0.1 {
        return "No sleep data recorded for last night.".to_string();
    }
    if value >= 85.0 {
        "Excellent sleep. You're well rested and ready for a demanding day.".to_string()
    } else if value >= 70.0 {
        "Good sleep overall. You should feel ready for moderate to high intensity.".to_string()
    } else if value >= 50.0 {
        if total_hours < 7.0 {
            "Your sleep was shorter than ideal. Try to prioritize rest tonight.".to_string()
        } else {
            "Fair sleep quality. Consider adjusting your sleep environment.".to_string()
        }
    } else if total_hours < 5.0 {
        "Significantly under-slept. Take it easy today and prioritize recovery.".to_string()
    } else {
        "Poor sleep quality. Avoid high intensity and focus on recovery.".to_string()
    }
}
