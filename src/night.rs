//! Nightly sleep aggregation
//!
//! Sleep-stage intervals arrive as raw category samples that can cross the
//! midnight boundary. This module attributes intervals to a "night" (keyed
//! by the calendar date of its evening, with a noon cutoff) and aggregates
//! them into `DetailedSleepData` for scoring.

use crate::types::{DetailedSleepData, SleepInterval, SleepStage};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use std::collections::BTreeMap;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Query window for one night: 18:00 of the night's date to noon the next
/// day (18 hours later).
pub fn query_window(night: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let evening = NaiveTime::from_hms_opt(18, 0, 0).expect("valid time");
    let start = Utc.from_utc_datetime(&night.and_time(evening));
    (start, start + Duration::hours(18))
}

/// Night a sleep interval belongs to, keyed by the calendar date of the
/// evening it started. Intervals starting before noon belong to the
/// previous day's night; the noon cutoff is a deliberate policy.
pub fn night_of(start: DateTime<Utc>) -> NaiveDate {
    let noon = NaiveTime::from_hms_opt(12, 0, 0).expect("valid time");
    let date = start.date_naive();
    if start.time() < noon {
        date - Duration::days(1)
    } else {
        date
    }
}

/// Aggregate one night's intervals into `DetailedSleepData`.
///
/// Asleep stages accumulate toward total sleep; in-bed intervals provide
/// `in_bed_hours` plus bedtime/wake time. When no in-bed intervals exist,
/// bedtime and wake time are estimated from the asleep intervals but
/// `in_bed_hours` stays 0 so the efficiency weight redistributes. Awake
/// intervals are ignored.
pub fn build_sleep_data(intervals: &[SleepInterval]) -> DetailedSleepData {
    let mut core_secs = 0.0;
    let mut deep_secs = 0.0;
    let mut rem_secs = 0.0;
    let mut unspecified_secs = 0.0;
    let mut in_bed_secs = 0.0;

    let mut in_bed_start: Option<DateTime<Utc>> = None;
    let mut in_bed_end: Option<DateTime<Utc>> = None;
    let mut asleep_start: Option<DateTime<Utc>> = None;
    let mut asleep_end: Option<DateTime<Utc>> = None;

    for interval in intervals {
        let secs = interval.duration_secs();
        match interval.stage {
            SleepStage::InBed => {
                in_bed_secs += secs;
                in_bed_start = Some(match in_bed_start {
                    Some(t) => t.min(interval.start),
                    None => interval.start,
                });
                in_bed_end = Some(match in_bed_end {
                    Some(t) => t.max(interval.end),
                    None => interval.end,
                });
            }
            SleepStage::AsleepCore => core_secs += secs,
            SleepStage::AsleepDeep => deep_secs += secs,
            SleepStage::AsleepRem => rem_secs += secs,
            SleepStage::AsleepUnspecified => unspecified_secs += secs,
            SleepStage::Awake => continue,
        }

        if interval.stage != SleepStage::InBed {
            asleep_start = Some(match asleep_start {
                Some(t) => t.min(interval.start),
                None => interval.start,
            });
            asleep_end = Some(match asleep_end {
                Some(t) => t.max(interval.end),
                None => interval.end,
            });
        }
    }

    let total_secs = core_secs + deep_secs + rem_secs + unspecified_secs;

    DetailedSleepData {
        total_hours: total_secs / SECONDS_PER_HOUR,
        core_hours: core_secs / SECONDS_PER_HOUR,
        deep_hours: deep_secs / SECONDS_PER_HOUR,
        rem_hours: rem_secs / SECONDS_PER_HOUR,
        in_bed_hours: in_bed_secs / SECONDS_PER_HOUR,
        has_stage_data: deep_secs > 0.0 || rem_secs > 0.0,
        bedtime: in_bed_start.or(asleep_start),
        wake_time: in_bed_end.or(asleep_end),
        recent_bedtimes: Vec::new(),
        recent_wake_times: Vec::new(),
    }
}

/// Asleep hours grouped by night, sorted by night date.
///
/// Used by multi-night series where only per-night totals are needed.
pub fn nightly_totals(intervals: &[SleepInterval]) -> Vec<(NaiveDate, f64)> {
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for interval in intervals {
        let asleep = matches!(
            interval.stage,
            SleepStage::AsleepCore
                | SleepStage::AsleepDeep
                | SleepStage::AsleepRem
                | SleepStage::AsleepUnspecified
        );
        if !asleep {
            continue;
        }
        *totals.entry(night_of(interval.start)).or_insert(0.0) +=
            interval.duration_secs() / SECONDS_PER_HOUR;
    }
    totals.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn night(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_query_window_is_evening_to_noon() {
        let (start, end) = query_window(night(2024, 1, 15));
        assert_eq!(start, ts(2024, 1, 15, 18, 0));
        assert_eq!(end, ts(2024, 1, 16, 12, 0));
    }

    #[test]
    fn test_noon_cutoff_attribution() {
        // 02:00 belongs to the previous evening's night
        assert_eq!(night_of(ts(2024, 1, 16, 2, 0)), night(2024, 1, 15));
        // 11:59 still the previous night, 12:00 starts a new one
        assert_eq!(night_of(ts(2024, 1, 16, 11, 59)), night(2024, 1, 15));
        assert_eq!(night_of(ts(2024, 1, 16, 12, 0)), night(2024, 1, 16));
        assert_eq!(night_of(ts(2024, 1, 15, 22, 30)), night(2024, 1, 15));
    }

    #[test]
    fn test_build_sleep_data_with_stages() {
        let intervals = vec![
            SleepInterval::new(SleepStage::InBed, ts(2024, 1, 15, 22, 30), ts(2024, 1, 16, 7, 0)),
            SleepInterval::new(SleepStage::AsleepCore, ts(2024, 1, 15, 23, 0), ts(2024, 1, 16, 3, 0)),
            SleepInterval::new(SleepStage::AsleepDeep, ts(2024, 1, 16, 3, 0), ts(2024, 1, 16, 4, 24)),
            SleepInterval::new(SleepStage::AsleepRem, ts(2024, 1, 16, 4, 24), ts(2024, 1, 16, 6, 12)),
            SleepInterval::new(SleepStage::Awake, ts(2024, 1, 16, 6, 12), ts(2024, 1, 16, 6, 30)),
        ];

        let data = build_sleep_data(&intervals);
        assert!((data.total_hours - 7.2).abs() < 1e-9);
        assert!((data.core_hours - 4.0).abs() < 1e-9);
        assert!((data.deep_hours - 1.4).abs() < 1e-9);
        assert!((data.rem_hours - 1.8).abs() < 1e-9);
        assert!((data.in_bed_hours - 8.5).abs() < 1e-9);
        assert!(data.has_stage_data);
        assert_eq!(data.bedtime, Some(ts(2024, 1, 15, 22, 30)));
        assert_eq!(data.wake_time, Some(ts(2024, 1, 16, 7, 0)));
    }

    #[test]
    fn test_build_sleep_data_without_in_bed() {
        let intervals = vec![SleepInterval::new(
            SleepStage::AsleepUnspecified,
            ts(2024, 1, 15, 23, 0),
            ts(2024, 1, 16, 6, 0),
        )];

        let data = build_sleep_data(&intervals);
        assert!((data.total_hours - 7.0).abs() < 1e-9);
        // Estimated from the asleep interval; in-bed time stays zero
        assert_eq!(data.in_bed_hours, 0.0);
        assert_eq!(data.bedtime, Some(ts(2024, 1, 15, 23, 0)));
        assert_eq!(data.wake_time, Some(ts(2024, 1, 16, 6, 0)));
        assert!(!data.has_stage_data);
    }

    #[test]
    fn test_build_sleep_data_empty() {
        let data = build_sleep_data(&[]);
        assert_eq!(data.total_hours, 0.0);
        assert!(data.bedtime.is_none());
        assert!(!data.has_stage_data);
    }

    #[test]
    fn test_nightly_totals_groups_by_night() {
        let intervals = vec![
            // Night of Jan 14: starts before midnight
            SleepInterval::new(SleepStage::AsleepCore, ts(2024, 1, 14, 23, 0), ts(2024, 1, 15, 6, 0)),
            // Night of Jan 15: starts after midnight, attributed back
            SleepInterval::new(SleepStage::AsleepCore, ts(2024, 1, 16, 0, 30), ts(2024, 1, 16, 7, 0)),
            // In-bed intervals do not count toward asleep totals
            SleepInterval::new(SleepStage::InBed, ts(2024, 1, 16, 0, 0), ts(2024, 1, 16, 7, 30)),
        ];

        let totals = nightly_totals(&intervals);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].0, night(2024, 1, 14));
        assert!((totals[0].1 - 7.0).abs() < 1e-9);
        assert_eq!(totals[1].0, night(2024, 1, 15));
        assert!((totals[1].1 - 6.5).abs() < 1e-9);
    }
}
