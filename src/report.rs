use std::io::Write;
use std::path::Path;

use clap::ValueEnum;
use serde::Serialize;

use crate::analysis::annotated_rows;
use crate::error::Result;
use crate::model::AnalysisRun;

pub const NO_PREDICTIONS: &str = "No predictions of exceeding the calorie goal in the data.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

/// Console report: weekly summaries, then the predicted dates.
pub fn write_report<W: Write>(out: &mut W, run: &AnalysisRun) -> Result<()> {
    for week in run.flagged_weeks() {
        if let Some(summary) = &week.summary {
            writeln!(out, "{}", summary)?;
            writeln!(out)?;
        }
    }

    let dates = run.predicted_dates();
    if dates.is_empty() {
        writeln!(out, "{}", NO_PREDICTIONS)?;
    } else {
        writeln!(out, "Dates when exceeding the calorie goal is predicted:")?;
        for date in dates {
            writeln!(out, "  {}", date.format("%Y-%m-%d"))?;
        }
    }

    match run.overall_mean {
        Some(mean) => writeln!(
            out,
            "{} days logged, average {:.2} kcal",
            run.series.len(),
            mean
        )?,
        None => writeln!(out, "{} days logged, average unavailable", run.series.len())?,
    }

    Ok(())
}

#[derive(Serialize)]
struct JsonRow<'a> {
    date: chrono::NaiveDate,
    kcals_in: Option<f64>,
    calorie_prediction: bool,
    trend_before_binge: bool,
    rebound: f64,
    #[serde(flatten)]
    extra: std::collections::BTreeMap<&'a str, &'a str>,
}

/// Writes the input columns plus `Calorie Prediction`, `Trend Before Binge`
/// and `Rebound`.
pub fn export<W: Write>(out: W, run: &AnalysisRun, format: ExportFormat) -> Result<()> {
    let rows = annotated_rows(run);
    let headers = &run.series.extra_headers;

    match format {
        ExportFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(out);

            let mut header = vec!["Date", "Kcals in"];
            header.extend(headers.iter().map(String::as_str));
            header.extend(["Calorie Prediction", "Trend Before Binge", "Rebound"]);
            wtr.write_record(&header)?;

            for (row, record) in rows.iter().zip(&run.series.records) {
                let mut fields = vec![
                    row.date.format("%d/%m/%Y").to_string(),
                    row.calories_in.map(|v| v.to_string()).unwrap_or_default(),
                ];
                fields.extend(record.extra.iter().cloned());
                fields.push(row.calorie_prediction.to_string());
                fields.push(row.trend_before_binge.to_string());
                fields.push(format!("{:.2}", row.rebound));
                wtr.write_record(&fields)?;
            }
            wtr.flush()?;
        }
        ExportFormat::Json => {
            let json_rows: Vec<JsonRow> = rows
                .iter()
                .zip(&run.series.records)
                .map(|(row, record)| JsonRow {
                    date: row.date,
                    kcals_in: row.calories_in,
                    calorie_prediction: row.calorie_prediction,
                    trend_before_binge: row.trend_before_binge,
                    rebound: row.rebound,
                    extra: headers
                        .iter()
                        .map(String::as_str)
                        .zip(record.extra.iter().map(String::as_str))
                        .collect(),
                })
                .collect();
            serde_json::to_writer_pretty(out, &json_rows)?;
        }
    }

    Ok(())
}

pub fn export_to_file(path: &Path, run: &AnalysisRun, format: ExportFormat) -> Result<()> {
    let file = std::fs::File::create(path)?;
    export(std::io::BufWriter::new(file), run, format)?;
    log::info!("Annotated data written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::config::AnalysisConfig;
    use crate::loader::load_series_from_reader;

    const LOG: &str = "Date,Kcals in,Notes\n\
        01/03/2024,1500,\n\
        02/03/2024,1600,gym\n\
        03/03/2024,1650,\n\
        04/03/2024,1600,\n\
        05/03/2024,1700,\n\
        06/03/2024,1800,\n\
        07/03/2024,1900,party\n\
        08/03/2024,,\n";

    fn run() -> AnalysisRun {
        let series = load_series_from_reader(LOG.as_bytes(), b',').unwrap();
        analyze(series, &AnalysisConfig::default())
    }

    fn report_text(run: &AnalysisRun) -> String {
        let mut out = Vec::new();
        write_report(&mut out, run).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_report_lists_summary_and_dates() {
        let text = report_text(&run());

        assert!(text.starts_with("01 Mar - 07 Mar: When you eat"));
        assert!(text.contains(
            "Dates when exceeding the calorie goal is predicted:\n  \
             2024-03-05\n  2024-03-06\n  2024-03-07\n  2024-03-08\n"
        ));
        assert!(!text.contains(NO_PREDICTIONS));
        assert!(text.contains("8 days logged"));
    }

    #[test]
    fn test_report_without_flags() {
        let series = load_series_from_reader(
            "Date,Kcals in\n01/01/2024,2500\n02/01/2024,2600\n".as_bytes(),
            b',',
        )
        .unwrap();
        let text = report_text(&analyze(series, &AnalysisConfig::default()));

        assert!(!text.contains("When you eat"));
        assert!(text.contains(NO_PREDICTIONS));
    }

    #[test]
    fn test_csv_export_keeps_input_columns() {
        let mut out = Vec::new();
        export(&mut out, &run(), ExportFormat::Csv).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Date,Kcals in,Notes,Calorie Prediction,Trend Before Binge,Rebound");
        assert_eq!(lines[2], "02/03/2024,1600,gym,false,true,6.67");
        assert_eq!(lines[5], "05/03/2024,1700,,true,false,0.00");
        assert_eq!(lines[8], "08/03/2024,,,true,false,0.00");
    }

    #[test]
    fn test_json_export() {
        let mut out = Vec::new();
        export(&mut out, &run(), ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0]["date"], "2024-03-01");
        assert_eq!(rows[1]["Notes"], "gym");
        assert_eq!(rows[3]["trend_before_binge"], true);
        assert!(rows[7]["kcals_in"].is_null());
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotated.csv");
        export_to_file(&path, &run(), ExportFormat::Csv).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 9);
    }
}
