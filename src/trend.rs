//! Weekly "trend before binge" detection.
//!
//! The series is cut into consecutive, non-overlapping blocks of seven
//! records. Inside each block, days under `target_fraction * goal` are
//! flagged and their rebound is measured against the block's lowest intake.
//!
//! The lowest intake is taken over the whole block before any rebound is
//! assigned, so an earlier flagged day is measured against a minimum that may
//! only occur later in the week. Rebound is the distance above the week's
//! trough wherever it falls, not above the lowest value seen so far.

use crate::config::AnalysisConfig;
use crate::model::{Series, WeeklyReport};
use crate::stats::{mean_present, min_present};

pub const BLOCK_DAYS: usize = 7;

pub fn detect_trends(series: &Series, config: &AnalysisConfig) -> Vec<WeeklyReport> {
    let records = &series.records;

    if records.len() < BLOCK_DAYS {
        log::info!(
            "Weekly trend detection needs {} records, got {}; no blocks analysed",
            BLOCK_DAYS,
            records.len()
        );
    }

    let mut reports = Vec::new();

    // Trailing partial blocks are dropped, never analysed short
    let mut start = 0;
    while start + BLOCK_DAYS <= records.len() {
        let block = &records[start..start + BLOCK_DAYS];
        let values: Vec<Option<f64>> = block.iter().map(|r| r.calories_in).collect();

        let lowest_value = min_present(&values);
        let trend_flags: Vec<bool> = block
            .iter()
            .map(|r| r.is_below(config.target_calories()))
            .collect();
        let rebound_percent = rebound_percentages(&values, &trend_flags, lowest_value);
        let mean_calories = mean_present(&values);

        let mut report = WeeklyReport {
            start_date: block[0].date,
            end_date: block[BLOCK_DAYS - 1].date,
            start_index: start,
            records: block.to_vec(),
            trend_flags,
            lowest_value,
            rebound_percent,
            mean_calories,
            summary: None,
        };
        report.summary = summarize(&report, config);

        log::debug!(
            "Block {}: lowest={:?} mean={:?} flagged={}",
            report.date_range(),
            report.lowest_value,
            report.mean_calories,
            report.flagged_count()
        );

        reports.push(report);
        start += BLOCK_DAYS;
    }

    let dropped = records.len() - start;
    if dropped > 0 && start > 0 {
        log::debug!("Dropped {} trailing records that do not fill a week", dropped);
    }

    reports
}

/// Rebound of each flagged day above the block minimum, in percent.
///
/// The first day of the block is never assigned a rebound. Unflagged days
/// stay at 0. A missing or zero baseline leaves every rebound at 0.
pub fn rebound_percentages(
    values: &[Option<f64>],
    flags: &[bool],
    lowest: Option<f64>,
) -> Vec<f64> {
    let mut rebound = vec![0.0; values.len()];

    let lowest = match lowest {
        Some(low) if low != 0.0 => low,
        Some(_) => {
            log::warn!("Block minimum is 0 kcal; rebound left at 0");
            return rebound;
        }
        None => return rebound,
    };

    for j in 1..values.len() {
        if let (true, Some(v)) = (flags[j], values[j]) {
            rebound[j] = (v - lowest) / lowest * 100.0;
        }
    }

    rebound
}

/// Natural-language summary for a block with at least one flagged day.
pub fn summarize(report: &WeeklyReport, config: &AnalysisConfig) -> Option<String> {
    if !report.has_trend() {
        return None;
    }
    let mean = report.mean_calories?;
    let days = report.flagged_count();

    Some(format!(
        "{}: When you eat {} kcals under your goal for {} days, \
         you rebound eating {} calories \
         ({}% higher than the goal) for {} days. \
         Meaning in any 7-day period, you could have instead eaten {} \
         mean calories for the same impact.",
        report.date_range(),
        (config.goal - mean).trunc() as i64,
        days,
        (config.rebound_fraction * config.goal).trunc() as i64,
        percent_label(config.rebound_fraction),
        days,
        mean.trunc() as i64,
    ))
}

// 0.2 -> "20.0", 0.125 -> "12.5"
fn percent_label(fraction: f64) -> String {
    let label = format!("{}", fraction * 100.0);
    if label.contains('.') {
        label
    } else {
        format!("{}.0", label)
    }
}

/// Contiguous runs of flagged days as inclusive (first, last) index pairs.
pub fn flagged_spans(flags: &[bool]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut run_start: Option<usize> = None;

    for (i, &flag) in flags.iter().enumerate() {
        match (flag, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(s)) => {
                spans.push((s, i - 1));
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = run_start {
        spans.push((s, flags.len() - 1));
    }

    spans
}
