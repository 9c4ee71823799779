//! Effort score calculation
//!
//! Daily strain on a 0-21 scale. Activity volume factors (energy, exercise
//! time, steps) are scored as ratios against the personal baseline average
//! and heart-rate intensity as the gap over resting HR; the weighted linear
//! sum is then compressed logarithmically so diminishing returns apply at
//! high exertion. Weights are fixed: an absent input scores zero rather
//! than handing its weight to the others.

use crate::baseline::BaselineStore;
use crate::types::{Metric, ScoreComponent, ScoreKind, ScoreResult};
use chrono::NaiveDate;

/// Fixed factor weights
const ENERGY_WEIGHT: f64 = 0.35;
const EXERCISE_WEIGHT: f64 = 0.30;
const HR_INTENSITY_WEIGHT: f64 = 0.25;
const STEPS_WEIGHT: f64 = 0.10;

/// Upper bound of the strain scale
pub const MAX_STRAIN: f64 = 21.0;

/// Calculator for the daily effort (strain) score
pub struct EffortScoreCalculator;

impl EffortScoreCalculator {
    /// Compute the effort score for one day.
    ///
    /// Present activity values are recorded into the baseline store (dated
    /// `date`) before their baseline average is read.
    pub fn calculate(
        store: &mut BaselineStore,
        date: NaiveDate,
        active_energy: Option<f64>,
        exercise_minutes: Option<f64>,
        steps: Option<f64>,
        avg_hr: Option<f64>,
        resting_hr: Option<f64>,
    ) -> ScoreResult {
        let components = vec![
            ratio_component(store, date, "Active Energy", Metric::ActiveEnergy, active_energy, ENERGY_WEIGHT),
            ratio_component(store, date, "Exercise Time", Metric::ExerciseMinutes, exercise_minutes, EXERCISE_WEIGHT),
            hr_intensity_component(avg_hr, resting_hr),
            ratio_component(store, date, "Steps", Metric::Steps, steps, STEPS_WEIGHT),
        ];

        let linear: f64 = components.iter().map(ScoreComponent::weighted_score).sum();
        let value = strain_from_linear(linear);

        let insight = insight_for(value);
        ScoreResult::new(ScoreKind::Effort, value, components, Some(insight))
    }
}

/// Compress an open-ended linear effort sum onto the 0-21 strain scale
pub fn strain_from_linear(linear: f64) -> f64 {
    (7.0 * (1.0 + linear / 12.0).ln()).clamp(0.0, MAX_STRAIN)
}

/// Score an activity-volume factor against its personal baseline average.
///
/// Hitting the baseline average exactly scores 50; double the average caps
/// at 100. Absent or non-positive values score zero but keep their weight.
fn ratio_component(
    store: &mut BaselineStore,
    date: NaiveDate,
    name: &str,
    metric: Metric,
    value: Option<f64>,
    weight: f64,
) -> ScoreComponent {
    let score = match value {
        Some(v) if v > 0.0 => {
            store.record_on(metric, v, date);
            let avg = store.baseline(metric).average;
            let ratio = v / avg.max(1.0);
            (ratio * 50.0).min(100.0)
        }
        _ => 0.0,
    };
    ScoreComponent::new(name, value, metric.unit(), score, weight)
}

/// Score heart-rate intensity from the gap between average and resting HR.
///
/// A 50 bpm gap maps to 80 points, leaving headroom below the cap.
fn hr_intensity_component(avg_hr: Option<f64>, resting_hr: Option<f64>) -> ScoreComponent {
    let gap = match (avg_hr, resting_hr) {
        (Some(avg), Some(rest)) if avg > rest => Some(avg - rest),
        _ => None,
    };
    let score = gap.map_or(0.0, |gap| (gap / 50.0 * 80.0).min(100.0));
    ScoreComponent::new("HR Intensity", gap, "bpm", score, HR_INTENSITY_WEIGHT)
}

fn insight_for(value: f64) -> String {
    if value >= 18.0 {
        "All-out effort today. Make sure to prioritize recovery tomorrow.".to_string()
    } else if value >= 14.0 {
        "High strain day. Great work pushing your limits.".to_string()
    } else if value >= 7.0 {
        "Moderate activity. Solid day of movement and exercise.".to_string()
    } else {
        "Light activity so far. A good opportunity to get moving or rest up.".to_string()
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

    #[test]
    fn test_double_the_baseline_average_caps_at_100() {
        let mut store = BaselineStore::in_memory();
        // Six prior days chosen so the window mean lands at exactly 500
        // once today's 1000 kcal is recorded (7 entries, no blending)
        for i in 1..=6 {
            store.record_on(Metric::ActiveEnergy, 2500.0 / 6.0, today() - Duration::days(i));
        }

        let result = EffortScoreCalculator::calculate(
            &mut store,
            today(),
            Some(1000.0),
            None,
            None,
            None,
            None,
        );
        assert!((component(&result, "Active Energy").score - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_baseline_average_scores_50() {
        let mut store = BaselineStore::in_memory();
        for i in 1..=7 {
            store.record_on(Metric::Steps, 8000.0, today() - Duration::days(i));
        }

        let result = EffortScoreCalculator::calculate(
            &mut store,
            today(),
            None,
            None,
            Some(8000.0),
            None,
            None,
        );
        assert!((component(&result, "Steps").score - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_absent_inputs_score_zero_and_keep_weight() {
        let mut store = BaselineStore::in_memory();
        let result =
            EffortScoreCalculator::calculate(&mut store, today(), None, None, None, None, None);

        assert_eq!(result.components.len(), 4);
        for c in &result.components {
            assert_eq!(c.score, 0.0);
            assert!(c.weight > 0.0);
        }
        assert_eq!(result.value, 0.0);
        let total_weight: f64 = result.components.iter().map(|c| c.weight).sum();
        assert!((total_weight - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_hr_intensity_gap_mapping() {
        let mut store = BaselineStore::in_memory();
        // 50 bpm gap maps to 80 points, not 100
        let result = EffortScoreCalculator::calculate(
            &mut store,
            today(),
            None,
            None,
            None,
            Some(110.0),
            Some(60.0),
        );
        let hr = component(&result, "HR Intensity");
        assert!((hr.score - 80.0).abs() < 1e-9);
        assert_eq!(hr.raw_value, Some(50.0));
    }

    #[test]
    fn test_hr_intensity_requires_positive_gap() {
        let mut store = BaselineStore::in_memory();
        let result = EffortScoreCalculator::calculate(
            &mut store,
            today(),
            None,
            None,
            None,
            Some(55.0),
            Some(60.0),
        );
        let hr = component(&result, "HR Intensity");
        assert_eq!(hr.score, 0.0);
        assert_eq!(hr.raw_value, None);
    }

    #[test]
    fn test_strain_never_exceeds_21() {
        for l in [0.0, 12.0, 100.0, 1000.0, 1e9] {
            let strain = strain_from_linear(l);
            assert!((0.0..=MAX_STRAIN).contains(&strain), "strain {strain} for L={l}");
        }
        assert_eq!(strain_from_linear(0.0), 0.0);
        // Compression is monotonic
        assert!(strain_from_linear(50.0) < strain_from_linear(100.0));
    }

    #[test]
    fn test_known_strain_value() {
        // L = 100 -> 7 * ln(1 + 100/12)
        let expected = 7.0 * (1.0_f64 + 100.0 / 12.0).ln();
        assert!((strain_from_linear(100.0) - expected).abs() < 1e-9);
        assert!(expected < MAX_STRAIN);
    }

    #[test]
    fn test_idempotent_against_unmodified_store() {
        let mut store = BaselineStore::in_memory();
        let a = EffortScoreCalculator::calculate(
            &mut store,
            today(),
            Some(600.0),
            Some(40.0),
            Some(9000.0),
            Some(95.0),
            Some(58.0),
        );
        let b = EffortScoreCalculator::calculate(
            &mut store,
            today(),
            Some(600.0),
            Some(40.0),
            Some(9000.0),
            Some(95.0),
            Some(58.0),
        );
        assert_eq!(a.value, b.value);
    }
}
