mod analysis;
mod config;
mod error;
mod loader;
mod model;
mod predictor;
mod report;
mod stats;
mod trend;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use eframe::egui;

use config::{AnalysisConfig, DEFAULT_GOAL, DEFAULT_REBOUND_FRACTION, DEFAULT_TARGET_FRACTION};
use error::{AnalyzerError, Result};
use report::ExportFormat;
use ui::CalorieApp;

/// Spot under-eating streaks that come before going over a calorie goal.
#[derive(Debug, Parser)]
#[command(name = "calorie-trends", version)]
struct Cli {
    /// Calorie log with "Date" (day first) and "Kcals in" columns
    #[arg(default_value = "data.csv")]
    input: PathBuf,

    /// Daily calorie goal in kcal
    #[arg(long, env = "CALORIE_GOAL", default_value_t = DEFAULT_GOAL)]
    goal: f64,

    /// Fraction of the goal below which a day counts toward a trend
    #[arg(long, env = "CALORIE_TARGET_FRACTION", default_value_t = DEFAULT_TARGET_FRACTION)]
    target_fraction: f64,

    /// Rebound size quoted in weekly summaries, as a fraction of the goal
    #[arg(long, env = "CALORIE_REBOUND_FRACTION", default_value_t = DEFAULT_REBOUND_FRACTION)]
    rebound_fraction: f64,

    /// Field delimiter of the input file
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Write the annotated data set to this path
    #[arg(long)]
    export: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    format: ExportFormat,

    /// Print the report only, without opening the chart window
    #[arg(long)]
    no_plot: bool,
}

impl Cli {
    fn config(&self) -> AnalysisConfig {
        AnalysisConfig {
            goal: self.goal,
            target_fraction: self.target_fraction,
            rebound_fraction: self.rebound_fraction,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.config();
    config.validate()?;

    if !cli.delimiter.is_ascii() {
        return Err(AnalyzerError::InvalidConfig(format!(
            "delimiter must be a single ASCII character, got '{}'",
            cli.delimiter
        )));
    }

    let series = loader::load_series(&cli.input, cli.delimiter as u8)?;
    let analysis = analysis::analyze(series, &config);

    let stdout = std::io::stdout();
    report::write_report(&mut stdout.lock(), &analysis)?;

    if let Some(path) = &cli.export {
        report::export_to_file(path, &analysis, cli.format)?;
    }

    if cli.no_plot {
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 720.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Calorie Trends",
        options,
        Box::new(move |cc| {
            ui::set_custom_style(&cc.egui_ctx);
            Ok(Box::new(CalorieApp::new(analysis, config)))
        }),
    )
    .map_err(|e| AnalyzerError::Plot(e.to_string()))
}
