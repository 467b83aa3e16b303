use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub calories_in: Option<f64>,  // None = blank / NaN in the log
    #[serde(skip)]
    pub extra: Vec<String>,  // Raw text of the other input columns, in header order
}

impl DailyRecord {
    pub fn new(date: NaiveDate, calories_in: Option<f64>) -> Self {
        DailyRecord {
            date,
            calories_in,
            extra: Vec::new(),
        }
    }

    /// Present and strictly below `threshold`. Missing values never pass.
    pub fn is_below(&self, threshold: f64) -> bool {
        matches!(self.calories_in, Some(v) if v < threshold)
    }
}

/// Date-ascending daily log with no duplicate dates.
///
/// "Consecutive days" throughout the analysis means consecutive records;
/// calendar gaps are not filled in.
#[derive(Debug, Clone, Default)]
pub struct Series {
    pub extra_headers: Vec<String>,
    pub records: Vec<DailyRecord>,
}

impl Series {
    pub fn from_records(mut records: Vec<DailyRecord>) -> Self {
        records.sort_by_key(|r| r.date);
        Series {
            extra_headers: Vec::new(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn calories(&self) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.calories_in).collect()
    }

    pub fn missing_count(&self) -> usize {
        self.records.iter().filter(|r| r.calories_in.is_none()).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionAnnotation {
    pub date: NaiveDate,
    pub predicted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_index: usize,
    pub records: Vec<DailyRecord>,
    pub trend_flags: Vec<bool>,
    pub lowest_value: Option<f64>,
    pub rebound_percent: Vec<f64>,
    pub mean_calories: Option<f64>,
    pub summary: Option<String>,
}

impl WeeklyReport {
    pub fn has_trend(&self) -> bool {
        self.trend_flags.iter().any(|&f| f)
    }

    pub fn flagged_count(&self) -> usize {
        self.trend_flags.iter().filter(|&&f| f).count()
    }

    pub fn date_range(&self) -> String {
        format!(
            "{} - {}",
            self.start_date.format("%d %b"),
            self.end_date.format("%d %b")
        )
    }
}

/// Everything one run produces; reporting, export and the chart window all
/// read from this.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub series: Series,
    pub predictions: Vec<PredictionAnnotation>,
    pub weekly: Vec<WeeklyReport>,
    pub overall_mean: Option<f64>,
}

impl AnalysisRun {
    pub fn predicted_dates(&self) -> Vec<NaiveDate> {
        self.predictions
            .iter()
            .filter(|p| p.predicted)
            .map(|p| p.date)
            .collect()
    }

    pub fn flagged_weeks(&self) -> impl Iterator<Item = &WeeklyReport> {
        self.weekly.iter().filter(|w| w.has_trend())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedRow {
    pub date: NaiveDate,
    pub calories_in: Option<f64>,
    pub calorie_prediction: bool,
    pub trend_before_binge: bool,
    pub rebound: f64,
}
