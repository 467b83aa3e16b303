use crate::model::{PredictionAnnotation, Series};

/// Number of trailing records that must all sit below the goal.
pub const LOOKBACK_DAYS: usize = 4;

/// Flags each record whose 4 preceding records were all strictly below `goal`.
///
/// Returns one annotation per record. The first `LOOKBACK_DAYS` records have
/// no full window and are always false. A missing value anywhere in the
/// window fails it.
pub fn predict(series: &Series, goal: f64) -> Vec<PredictionAnnotation> {
    let records = &series.records;

    if records.len() <= LOOKBACK_DAYS {
        log::info!(
            "Calorie prediction needs more than {} records, got {}; nothing flagged",
            LOOKBACK_DAYS,
            records.len()
        );
    }

    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let predicted = i >= LOOKBACK_DAYS
                && records[i - LOOKBACK_DAYS..i].iter().all(|r| r.is_below(goal));
            PredictionAnnotation {
                date: record.date,
                predicted,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DailyRecord;
    use chrono::{Duration, NaiveDate};

    const GOAL: f64 = 2100.0;

    fn series(values: &[Option<f64>]) -> Series {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        Series::from_records(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| DailyRecord::new(start + Duration::days(i as i64), v))
                .collect(),
        )
    }

    fn flags(series: &Series) -> Vec<bool> {
        predict(series, GOAL).iter().map(|p| p.predicted).collect()
    }

    #[test]
    fn test_short_series_never_flags() {
        for len in 0..=LOOKBACK_DAYS {
            let s = series(&vec![Some(1000.0); len]);
            let out = predict(&s, GOAL);
            assert_eq!(out.len(), len);
            assert!(out.iter().all(|p| !p.predicted));
        }
    }

    #[test]
    fn test_fifth_day_flagged_after_four_below() {
        let s = series(&[Some(1800.0), Some(1900.0), Some(1500.0), Some(2000.0), Some(2600.0)]);
        assert_eq!(flags(&s), vec![false, false, false, false, true]);
    }

    #[test]
    fn test_goal_itself_is_not_below() {
        let s = series(&[Some(1800.0), Some(GOAL), Some(1500.0), Some(2000.0), Some(1000.0)]);
        assert_eq!(flags(&s), vec![false; 5]);
    }

    #[test]
    fn test_missing_value_breaks_window() {
        let s = series(&[Some(1800.0), None, Some(1500.0), Some(2000.0), Some(1000.0)]);
        assert_eq!(flags(&s), vec![false; 5]);
    }

    #[test]
    fn test_rolling_window_moves() {
        // Day 5 sees days 1-4 (all below), day 6 sees days 2-5 (day 5 over goal)
        let s = series(&[
            Some(1500.0),
            Some(1500.0),
            Some(1500.0),
            Some(1500.0),
            Some(2500.0),
            Some(1500.0),
            Some(1500.0),
            Some(1500.0),
            Some(1500.0),
            Some(1500.0),
        ]);
        assert_eq!(
            flags(&s),
            vec![false, false, false, false, true, false, false, false, false, true]
        );
    }

    #[test]
    fn test_annotation_dates_follow_series() {
        let s = series(&[Some(1.0); 6]);
        let out = predict(&s, GOAL);
        for (annotation, record) in out.iter().zip(&s.records) {
            assert_eq!(annotation.date, record.date);
        }
    }
}
