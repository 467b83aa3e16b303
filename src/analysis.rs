use crate::config::AnalysisConfig;
use crate::model::{AnalysisRun, AnnotatedRow, Series};
use crate::predictor::predict;
use crate::stats::mean_present;
use crate::trend::detect_trends;

pub fn analyze(series: Series, config: &AnalysisConfig) -> AnalysisRun {
    let predictions = predict(&series, config.goal);
    let weekly = detect_trends(&series, config);
    let overall_mean = mean_present(&series.calories());

    if overall_mean.is_none() && !series.is_empty() {
        log::warn!("No calorie values in the log; average is unavailable");
    }

    AnalysisRun {
        series,
        predictions,
        weekly,
        overall_mean,
    }
}

/// The input series with every annotation column joined back on.
///
/// Records in a trailing partial week were never analysed for trends and
/// carry `false` / `0`.
pub fn annotated_rows(run: &AnalysisRun) -> Vec<AnnotatedRow> {
    let mut rows: Vec<AnnotatedRow> = run
        .series
        .records
        .iter()
        .zip(&run.predictions)
        .map(|(record, prediction)| AnnotatedRow {
            date: record.date,
            calories_in: record.calories_in,
            calorie_prediction: prediction.predicted,
            trend_before_binge: false,
            rebound: 0.0,
        })
        .collect();

    for week in &run.weekly {
        for (offset, (&flag, &rebound)) in week
            .trend_flags
            .iter()
            .zip(&week.rebound_percent)
            .enumerate()
        {
            if let Some(row) = rows.get_mut(week.start_index + offset) {
                row.trend_before_binge = flag;
                row.rebound = rebound;
            }
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DailyRecord;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn series(values: &[Option<f64>]) -> Series {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Series::from_records(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| DailyRecord::new(start + Duration::days(i as i64), v))
                .collect(),
        )
    }

    #[test]
    fn test_run_bundles_both_analyses() {
        let mut values = vec![Some(1500.0); 8];
        values.extend([Some(2600.0), Some(2400.0)]);
        let run = analyze(series(&values), &AnalysisConfig::default());

        assert_eq!(run.predictions.len(), 10);
        assert_eq!(run.weekly.len(), 1);
        assert_eq!(run.predicted_dates().len(), 5);
        assert_eq!(run.flagged_weeks().count(), 1);
        assert_relative_eq!(run.overall_mean.unwrap(), 1700.0, epsilon = 1e-9);
    }

    #[test]
    fn test_all_missing_log() {
        let run = analyze(series(&[None; 9]), &AnalysisConfig::default());
        assert_eq!(run.overall_mean, None);
        assert!(run.predicted_dates().is_empty());
        assert_eq!(run.flagged_weeks().count(), 0);
    }

    #[test]
    fn test_annotated_rows_cover_whole_series() {
        let mut values = vec![Some(1500.0), Some(1600.0), Some(2500.0)];
        values.extend([Some(2200.0); 4]);
        values.extend([Some(1000.0); 2]);
        let run = analyze(series(&values), &AnalysisConfig::default());
        let rows = annotated_rows(&run);

        assert_eq!(rows.len(), 9);
        assert!(rows[0].trend_before_binge);
        assert_eq!(rows[0].rebound, 0.0);
        assert!(rows[1].trend_before_binge);
        assert!(rows[1].rebound > 6.0);
        assert!(!rows[2].trend_before_binge);
        // Trailing partial week is not analysed
        assert!(!rows[7].trend_before_binge);
        assert!(!rows[8].trend_before_binge);
    }
}
