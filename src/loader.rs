use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use regex::Regex;

use crate::error::{AnalyzerError, Result};
use crate::model::{DailyRecord, Series};

pub const DATE_COLUMN: &str = "Date";
pub const CALORIES_COLUMN: &str = "Kcals in";

// Day comes before month. Two-digit years are tried first because %Y would
// also accept "24" as the year 24. ISO cannot be misread so it is allowed.
const DATE_FORMATS: [&str; 5] = ["%d/%m/%y", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d"];

const MISSING_MARKERS: [&str; 5] = ["", "nan", "na", "n/a", "null"];

// "2,150" or "12,345.5"
static THOUSANDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d{1,3}(,\d{3})+(\.\d+)?$").expect("valid pattern"));
// "1850,5"
static DECIMAL_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+,\d+$").expect("valid pattern"));

pub fn load_series(path: impl AsRef<Path>, delimiter: u8) -> Result<Series> {
    let path = path.as_ref();
    log::info!("Loading calorie log from {}", path.display());
    let file = std::fs::File::open(path)?;
    load_series_from_reader(file, delimiter)
}

pub fn load_series_from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Series> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let date_idx = column_index(&headers, DATE_COLUMN)?;
    let kcal_idx = column_index(&headers, CALORIES_COLUMN)?;

    let extra_idx: Vec<usize> = (0..headers.len())
        .filter(|&i| i != date_idx && i != kcal_idx)
        .collect();
    let extra_headers = extra_idx.iter().map(|&i| headers[i].to_string()).collect();

    let mut records = Vec::new();

    for (n, row) in rdr.records().enumerate() {
        let row = row?;
        // 1-based, counting the header line
        let line = n + 2;

        let date_text = row.get(date_idx).unwrap_or("");
        // Fully blank trailing lines are common in spreadsheet exports
        if date_text.is_empty() && row.iter().all(|f| f.is_empty()) {
            continue;
        }

        let date = parse_date(date_text).ok_or_else(|| AnalyzerError::UnparseableDate {
            row: line,
            value: date_text.to_string(),
        })?;
        let calories_in = parse_calories(row.get(kcal_idx).unwrap_or(""), line, delimiter)?;

        let mut record = DailyRecord::new(date, calories_in);
        record.extra = extra_idx
            .iter()
            .map(|&i| row.get(i).unwrap_or("").to_string())
            .collect();
        records.push(record);
    }

    let mut series = Series::from_records(records);
    series.extra_headers = extra_headers;

    if let Some(dup) = series.records.windows(2).find(|w| w[0].date == w[1].date) {
        return Err(AnalyzerError::DuplicateDate(dup[0].date));
    }

    log::info!(
        "Loaded {} daily records ({} without calories)",
        series.len(),
        series.missing_count()
    );

    Ok(series)
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| AnalyzerError::MissingColumn(name.to_string()))
}

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

fn parse_calories(text: &str, line: usize, delimiter: u8) -> Result<Option<f64>> {
    if MISSING_MARKERS.contains(&text.to_lowercase().as_str()) {
        return Ok(None);
    }

    let invalid = || AnalyzerError::InvalidCalories {
        row: line,
        value: text.to_string(),
    };

    // Grouped thousands win over a decimal comma; a decimal comma is only
    // possible when the comma is not the field delimiter.
    let cleaned = if !text.contains(',') {
        text.to_string()
    } else if THOUSANDS.is_match(text) {
        text.replace(',', "")
    } else if delimiter != b',' && DECIMAL_COMMA.is_match(text) {
        text.replace(',', ".")
    } else {
        return Err(invalid());
    };

    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(invalid()),
    }
}
