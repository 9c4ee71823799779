//! Recovery score calculation
//!
//! Composite 0-100 recovery score over HRV, resting heart rate, last
//! night's sleep score, and respiratory rate. HRV and respiratory rate are
//! scored as clamped z-scores against the personal baseline; missing
//! inputs hand their weight to the remaining factors through a fixed
//! decision table so the weights always sum to 1.0.

use crate::baseline::BaselineStore;
use crate::types::{Metric, ScoreComponent, ScoreKind, ScoreResult};
use chrono::NaiveDate;
use tracing::debug;

/// Resolved factor weights for one computation
#[derive(Debug, Clone, Copy, PartialEq)]
struct Weights {
    hrv: f64,
    rhr: f64,
    sleep: f64,
    rr: f64,
}

/// Weight table keyed by which optional inputs are present.
///
/// Encodes the redistribution cascade as literal rows rather than
/// re-deriving it procedurally; the cascade is easy to get subtly wrong.
/// The sleep input is always present and is never redistributed away.
fn resolve_weights(hrv_present: bool, rr_present: bool) -> Weights {
    match (hrv_present, rr_present) {
        (true, true) => Weights { hrv: 0.50, rhr: 0.20, sleep: 0.20, rr: 0.10 },
        (true, false) => Weights { hrv: 0.55, rhr: 0.20, sleep: 0.25, rr: 0.0 },
        (false, true) => Weights { hrv: 0.0, rhr: 0.35, sleep: 0.45, rr: 0.20 },
        (false, false) => Weights { hrv: 0.0, rhr: 0.45, sleep: 0.55, rr: 0.0 },
    }
}

/// Calculator for the daily recovery score
pub struct RecoveryScoreCalculator;

impl RecoveryScoreCalculator {
    /// Compute the recovery score for one day.
    ///
    /// Each present metric is recorded into the baseline store (dated
    /// `date`) before its z-score is read, so a single call both updates
    /// and consumes history.
    pub fn calculate(
        store: &mut BaselineStore,
        date: NaiveDate,
        hrv: Option<f64>,
        resting_hr: Option<f64>,
        respiratory_rate: Option<f64>,
        sleep_score: f64,
    ) -> ScoreResult {
        let mut weights = resolve_weights(hrv.is_some(), respiratory_rate.is_some());

        // A missing resting HR folds its resolved weight into sleep.
        if resting_hr.is_none() {
            weights.sleep += weights.rhr;
            weights.rhr = 0.0;
        }
        debug!(?weights, "resolved recovery weights");

        let mut components = Vec::new();
        let mut hrv_z = None;

        if let Some(hrv) = hrv {
            store.record_on(Metric::Hrv, hrv, date);
            let z = store.z_score(Metric::Hrv, hrv);
            hrv_z = Some(z);
            // Baseline HRV scores 60; each stddev above adds 20
            let score = (60.0 + z * 20.0).clamp(0.0, 100.0);
            components.push(ScoreComponent::new("HRV", Some(hrv), "ms", score, weights.hrv));
        }

        if let Some(rhr) = resting_hr {
            store.record_on(Metric::RestingHr, rhr, date);
            let z = store.z_score(Metric::RestingHr, rhr);
            // Lower resting HR is better, so the z-score inverts
            let score = (60.0 - z * 20.0).clamp(0.0, 100.0);
            components.push(ScoreComponent::new(
                "Resting HR",
                Some(rhr),
                "bpm",
                score,
                weights.rhr,
            ));
        }

        components.push(ScoreComponent::new(
            "Sleep",
            Some(sleep_score),
            "",
            sleep_score,
            weights.sleep,
        ));

        if let Some(rr) = respiratory_rate {
            store.record_on(Metric::RespiratoryRate, rr, date);
            let z = store.z_score(Metric::RespiratoryRate, rr);
            // Inverted like resting HR, but from a 70 intercept
            let score = (70.0 - z * 20.0).clamp(0.0, 100.0);
            components.push(ScoreComponent::new(
                "Respiratory Rate",
                Some(rr),
                "br/min",
                score,
                weights.rr,
            ));
        }

        let value = components
            .iter()
            .map(ScoreComponent::weighted_score)
            .sum::<f64>()
            .clamp(0.0, 100.0);

        let insight = insight_for(value, hrv_z);
        ScoreResult::new(ScoreKind::Recovery, value, components, Some(insight))
    }
}

fn insight_for(value: f64, hrv_z: Option<f64>) -> String {
    if value >= 67.0 {
        "Your body is well recovered. Good day for intensity.".to_string()
    } else if value >= 34.0 {
        if hrv_z.is_some_and(|z| z < -1.0) {
            "HRV is below baseline. Consider moderate activity and focus on recovery."
                .to_string()
        } else {
            "Moderate recovery. Listen to your body and avoid overtraining.".to_string()
        }
    } else {
        "Low recovery detected. Prioritize rest, hydration, and easy movement.".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    fn component<'a>(result: &'a ScoreResult, name: &str) -> &'a ScoreComponent {
        result
            .components
            .iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("missing component {name}"))
    }

    fn weight_sum(result: &ScoreResult) -> f64 {
        result.components.iter().map(|c| c.weight).sum()
    }

    #[test]
    fn test_weight_table_rows_sum_to_one() {
        for (hrv, rr) in [(true, true), (true, false), (false, true), (false, false)] {
            let w = resolve_weights(hrv, rr);
            assert!((w.hrv + w.rhr + w.sleep + w.rr - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_all_inputs_present_nominal_weights() {
        let mut store = BaselineStore::in_memory();
        let result = RecoveryScoreCalculator::calculate(
            &mut store,
            today(),
            Some(48.0),
            Some(55.0),
            Some(14.0),
            80.0,
        );

        assert!((component(&result, "HRV").weight - 0.50).abs() < 1e-9);
        assert!((component(&result, "Resting HR").weight - 0.20).abs() < 1e-9);
        assert!((component(&result, "Sleep").weight - 0.20).abs() < 1e-9);
        assert!((component(&result, "Respiratory Rate").weight - 0.10).abs() < 1e-9);
        assert!((weight_sum(&result) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_hrv_redistribution() {
        let mut store = BaselineStore::in_memory();
        let result = RecoveryScoreCalculator::calculate(
            &mut store,
            today(),
            None,
            Some(60.0),
            Some(14.0),
            80.0,
        );

        assert!(result.components.iter().all(|c| c.name != "HRV"));
        assert!((component(&result, "Resting HR").weight - 0.35).abs() < 1e-9);
        assert!((component(&result, "Sleep").weight - 0.45).abs() < 1e-9);
        assert!((component(&result, "Respiratory Rate").weight - 0.20).abs() < 1e-9);
        assert!((weight_sum(&result) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_respiratory_rate_redistribution() {
        let mut store = BaselineStore::in_memory();
        let result = RecoveryScoreCalculator::calculate(
            &mut store,
            today(),
            Some(48.0),
            Some(55.0),
            None,
            80.0,
        );

        assert!((component(&result, "HRV").weight - 0.55).abs() < 1e-9);
        assert!((component(&result, "Resting HR").weight - 0.20).abs() < 1e-9);
        assert!((component(&result, "Sleep").weight - 0.25).abs() < 1e-9);
        assert!((weight_sum(&result) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_rhr_folds_into_sleep() {
        let mut store = BaselineStore::in_memory();
        let result = RecoveryScoreCalculator::calculate(
            &mut store,
            today(),
            Some(48.0),
            None,
            Some(14.0),
            80.0,
        );

        assert!(result.components.iter().all(|c| c.name != "Resting HR"));
        assert!((component(&result, "HRV").weight - 0.50).abs() < 1e-9);
        assert!((component(&result, "Sleep").weight - 0.30).abs() < 1e-9);
        assert!((weight_sum(&result) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_sleep_only() {
        let mut store = BaselineStore::in_memory();
        let result =
            RecoveryScoreCalculator::calculate(&mut store, today(), None, None, None, 80.0);

        assert_eq!(result.components.len(), 1);
        assert!((component(&result, "Sleep").weight - 1.0).abs() < 1e-9);
        assert!((result.value - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_call_records_into_baseline() {
        let mut store = BaselineStore::in_memory();
        RecoveryScoreCalculator::calculate(
            &mut store,
            today(),
            Some(48.0),
            Some(55.0),
            Some(14.0),
            80.0,
        );

        assert_eq!(store.baseline(Metric::Hrv).count, 1);
        assert_eq!(store.baseline(Metric::RestingHr).count, 1);
        assert_eq!(store.baseline(Metric::RespiratoryRate).count, 1);
    }

    #[test]
    fn test_hrv_at_baseline_scores_60() {
        let mut store = BaselineStore::in_memory();
        // Seven days of identical HRV pin the baseline to the sample value
        for i in 1..=7 {
            store.record_on(Metric::Hrv, 50.0, today() - Duration::days(i));
        }
        let result = RecoveryScoreCalculator::calculate(
            &mut store,
            today(),
            Some(50.0),
            None,
            None,
            80.0,
        );
        assert!((component(&result, "HRV").score - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_low_hrv_insight() {
        let mut store = BaselineStore::in_memory();
        // Stable baseline around 60, then a sharply lower reading
        for i in 1..=7 {
            store.record_on(Metric::Hrv, 60.0 + (i % 2) as f64, today() - Duration::days(i));
        }
        let result = RecoveryScoreCalculator::calculate(
            &mut store,
            today(),
            Some(40.0),
            None,
            None,
            80.0,
        );

        assert!(result.value < 67.0 && result.value >= 34.0);
        assert_eq!(
            result.insight.as_deref(),
            Some("HRV is below baseline. Consider moderate activity and focus on recovery.")
        );
    }

    #[test]
    fn test_idempotent_against_unmodified_store() {
        // Same-day records upsert, so repeating the call leaves the store
        // in the same state and the value bit-identical
        let mut store = BaselineStore::in_memory();
        let a = RecoveryScoreCalculator::calculate(
            &mut store,
            today(),
            Some(48.0),
            Some(55.0),
            Some(14.0),
            80.0,
        );
        let b = RecoveryScoreCalculator::calculate(
            &mut store,
            today(),
            Some(48.0),
            Some(55.0),
            Some(14.0),
            80.0,
        );
        assert_eq!(a.value, b.value);
    }
}
