use crate::analysis::annotated_rows;
use crate::config::AnalysisConfig;
use crate::model::{AnalysisRun, AnnotatedRow, DailyRecord, WeeklyReport};
use crate::trend::flagged_spans;
use chrono::{Datelike, NaiveDate};
use eframe::egui;
use egui::{Color32, Context, FontFamily, FontId, Margin, RichText, Stroke, Visuals};
use egui_extras::{Column, TableBuilder};
use egui_plot::{GridMark, HLine, Legend, Line, LineStyle, MarkerShape, Plot, PlotPoints, Points, Polygon};
use std::ops::RangeInclusive;

const SERIES_COLOR: Color32 = Color32::from_rgb(70, 130, 200);
const GOAL_COLOR: Color32 = Color32::from_rgb(220, 60, 60);
const MEAN_COLOR: Color32 = Color32::from_rgb(60, 170, 80);
const PREDICTED_COLOR: Color32 = Color32::from_rgb(255, 170, 40);
const TREND_FILL: Color32 = Color32::from_rgba_premultiplied(64, 64, 64, 128);

pub fn set_custom_style(ctx: &Context) {
    let mut visuals = Visuals::light();

    visuals.panel_fill = Color32::from_rgb(250, 250, 248);
    visuals.window_fill = Color32::from_rgb(255, 255, 255);
    visuals.faint_bg_color = Color32::from_rgb(240, 242, 245);

    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, SERIES_COLOR);
    visuals.selection.bg_fill = Color32::from_rgb(200, 220, 240);

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();

    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.window_margin = Margin::same(12);

    style.text_styles.insert(
        egui::TextStyle::Heading,
        FontId::new(20.0, FontFamily::Proportional),
    );
    style.text_styles.insert(
        egui::TextStyle::Body,
        FontId::new(14.0, FontFamily::Proportional),
    );

    ctx.set_style(style);
}

pub struct CalorieApp {
    run: AnalysisRun,
    config: AnalysisConfig,
    rows: Vec<AnnotatedRow>,

    // One entry per weekly report; only flagged weeks ever open
    open_weeks: Vec<bool>,
    show_table: bool,
}

impl CalorieApp {
    pub fn new(run: AnalysisRun, config: AnalysisConfig) -> Self {
        let rows = annotated_rows(&run);
        let open_weeks = run.weekly.iter().map(|w| w.has_trend()).collect();
        Self {
            run,
            config,
            rows,
            open_weeks,
            show_table: false,
        }
    }

    fn overview_plot(&self, ui: &mut egui::Ui) {
        let goal = self.config.goal;
        let segments = line_segments(&self.run.series.records);
        let predicted: Vec<[f64; 2]> = self
            .run
            .series
            .records
            .iter()
            .zip(&self.run.predictions)
            .filter(|(_, p)| p.predicted)
            .filter_map(|(r, _)| r.calories_in.map(|v| [date_x(r.date), v]))
            .collect();

        Plot::new("overview")
            .legend(Legend::default())
            .x_axis_label("Date")
            .y_axis_label("Kcals")
            .x_axis_formatter(date_axis_label)
            .height(ui.available_height().max(240.0))
            .show(ui, |plot_ui| {
                for segment in segments {
                    plot_ui.line(
                        Line::new("Kcals in", PlotPoints::from(segment.clone()))
                            .color(SERIES_COLOR)
                            .width(1.5),
                    );
                    plot_ui.points(
                        Points::new("Kcals in", PlotPoints::from(segment))
                            .color(SERIES_COLOR)
                            .shape(MarkerShape::Circle)
                            .radius(2.5),
                    );
                }

                plot_ui.hline(
                    HLine::new(goal_label(goal), goal)
                        .color(GOAL_COLOR)
                        .style(LineStyle::dashed_loose()),
                );

                if let Some(mean) = self.run.overall_mean {
                    plot_ui.hline(HLine::new(mean_label(mean), mean).color(MEAN_COLOR));
                }

                if !predicted.is_empty() {
                    plot_ui.points(
                        Points::new("Calorie Prediction", PlotPoints::from(predicted))
                            .color(PREDICTED_COLOR)
                            .shape(MarkerShape::Diamond)
                            .radius(5.0),
                    );
                }
            });
    }

    fn data_table(&self, ui: &mut egui::Ui) {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::exact(110.0))  // Date
            .column(Column::exact(90.0))   // Kcals in
            .column(Column::exact(140.0))  // Prediction
            .column(Column::exact(150.0))  // Trend
            .column(Column::remainder())   // Rebound
            .header(24.0, |mut header| {
                for title in ["Date", "Kcals in", "Calorie Prediction", "Trend Before Binge", "Rebound %"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(22.0, self.rows.len(), |mut row| {
                    let r = &self.rows[row.index()];

                    row.col(|ui| {
                        ui.label(r.date.format("%d/%m/%Y").to_string());
                    });
                    row.col(|ui| {
                        match r.calories_in {
                            Some(v) => ui.label(format!("{:.0}", v)),
                            None => ui.label(RichText::new("-").weak()),
                        };
                    });
                    row.col(|ui| {
                        if r.calorie_prediction {
                            ui.label(RichText::new("predicted").color(PREDICTED_COLOR).strong());
                        }
                    });
                    row.col(|ui| {
                        if r.trend_before_binge {
                            ui.label(RichText::new("trend").color(Color32::DARK_GRAY).strong());
                        }
                    });
                    row.col(|ui| {
                        if r.rebound != 0.0 {
                            ui.label(format!("{:.2}", r.rebound));
                        }
                    });
                });
            });
    }
}

fn week_plot(ui: &mut egui::Ui, week: &WeeklyReport, goal: f64) {
    let segments = line_segments(&week.records);
    let shading = shade_polygons(week, goal);

    Plot::new(("week", week.start_index))
        .legend(Legend::default())
        .x_axis_label("Date")
        .y_axis_label("Kcals")
        .x_axis_formatter(date_axis_label)
        .include_y(0.0)
        .height(300.0)
        .show(ui, |plot_ui| {
            for polygon in shading {
                plot_ui.polygon(
                    Polygon::new("Trend Before Binge", PlotPoints::from(polygon))
                        .fill_color(TREND_FILL)
                        .stroke(Stroke::NONE),
                );
            }

            for segment in segments {
                plot_ui.line(
                    Line::new("Kcals in", PlotPoints::from(segment.clone()))
                        .color(SERIES_COLOR)
                        .width(1.5),
                );
                plot_ui.points(
                    Points::new("Kcals in", PlotPoints::from(segment))
                        .color(SERIES_COLOR)
                        .shape(MarkerShape::Circle)
                        .radius(3.0),
                );
            }

            plot_ui.hline(
                HLine::new(goal_label(goal), goal)
                    .color(GOAL_COLOR)
                    .style(LineStyle::dashed_loose()),
            );
        });
}

impl eframe::App for CalorieApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.heading("Caloric Trends and Calorie Prediction");
                ui.separator();
                ui.checkbox(&mut self.show_table, "Show data table");
            });
            ui.add_space(4.0);
        });

        egui::SidePanel::left("weeks")
            .min_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Trend weeks");
                ui.separator();

                let mut any = false;
                for (open, week) in self.open_weeks.iter_mut().zip(&self.run.weekly) {
                    if week.has_trend() {
                        any = true;
                        ui.checkbox(open, week.date_range());
                    }
                }
                if !any {
                    ui.label(RichText::new("No trend before a binge detected").weak());
                }

                ui.add_space(10.0);
                ui.separator();

                let predicted = self.run.predicted_dates();
                ui.label(RichText::new(format!("{} predicted days", predicted.len())).strong());
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for date in predicted {
                        ui.label(date.format("%d %b %Y").to_string());
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.run.series.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label("The calorie log is empty");
                });
                return;
            }

            if self.show_table {
                self.data_table(ui);
            } else {
                self.overview_plot(ui);
            }
        });

        let goal = self.config.goal;
        for (open, week) in self.open_weeks.iter_mut().zip(&self.run.weekly) {
            if !*open {
                continue;
            }
            egui::Window::new(week_title(week))
                .id(egui::Id::new(("week_window", week.start_index)))
                .open(open)
                .default_size([760.0, 420.0])
                .show(ctx, |ui| {
                    week_plot(ui, week, goal);
                    if let Some(summary) = &week.summary {
                        ui.add_space(6.0);
                        ui.label(RichText::new(summary).italics());
                    }
                });
        }
    }
}

pub fn date_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn date_axis_label(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    NaiveDate::from_num_days_from_ce_opt(mark.value.round() as i32)
        .map(|d| d.format("%d %b").to_string())
        .unwrap_or_default()
}

pub fn goal_label(goal: f64) -> String {
    format!("Calorie Goal ({} kcal)", goal)
}

pub fn mean_label(mean: f64) -> String {
    format!("Average Kcals in ({:.2} kcal)", mean)
}

pub fn week_title(week: &WeeklyReport) -> String {
    format!("Caloric Trends with Trend Before a Binge ({})", week.date_range())
}

/// Plot points split wherever a value is missing, so gaps stay visible
/// instead of being bridged.
pub fn line_segments(records: &[DailyRecord]) -> Vec<Vec<[f64; 2]>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();

    for record in records {
        match record.calories_in {
            Some(v) => current.push([date_x(record.date), v]),
            None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

/// Rectangles from 0 up to `goal` over each run of flagged days.
///
/// Height is always the goal, never the day's intake. Each run is widened
/// by half a day on both sides so a single flagged day still shows.
pub fn shade_polygons(week: &WeeklyReport, goal: f64) -> Vec<Vec<[f64; 2]>> {
    flagged_spans(&week.trend_flags)
        .into_iter()
        .map(|(first, last)| {
            let x0 = date_x(week.records[first].date) - 0.5;
            let x1 = date_x(week.records[last].date) + 0.5;
            vec![[x0, 0.0], [x1, 0.0], [x1, goal], [x0, goal]]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::model::Series;
    use crate::trend::detect_trends;
    use chrono::Duration;

    fn records(values: &[Option<f64>]) -> Vec<DailyRecord> {
        let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| DailyRecord::new(start + Duration::days(i as i64), v))
            .collect()
    }

    #[test]
    fn test_consecutive_days_are_one_apart() {
        let a = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(date_x(b) - date_x(a), 2.0);
    }

    #[test]
    fn test_axis_label_round_trips_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let mark = GridMark { value: date_x(date), step_size: 1.0 };
        assert_eq!(date_axis_label(mark, &(0.0..=1.0)), "05 Mar");
    }

    #[test]
    fn test_line_breaks_at_missing_values() {
        let recs = records(&[Some(1.0), Some(2.0), None, None, Some(3.0), None]);
        let segments = line_segments(&recs);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].len(), 2);
        assert_eq!(segments[1][0][1], 3.0);

        assert!(line_segments(&records(&[None, None])).is_empty());
    }

    #[test]
    fn test_shading_reaches_goal() {
        let series = Series::from_records(records(&[
            Some(1500.0),
            Some(1600.0),
            Some(2000.0),
            Some(1000.0),
            Some(2000.0),
            Some(2000.0),
            Some(2000.0),
        ]));
        let config = AnalysisConfig::default();
        let week = &detect_trends(&series, &config)[0];
        let polygons = shade_polygons(week, config.goal);

        assert_eq!(polygons.len(), 2);
        let first_x = date_x(week.records[0].date);
        assert_eq!(polygons[0][0], [first_x - 0.5, 0.0]);
        assert_eq!(polygons[0][1][0], first_x + 1.5);
        assert!(polygons.iter().all(|p| p[2][1] == 2100.0 && p[3][1] == 2100.0));
    }

    #[test]
    fn test_labels() {
        assert_eq!(goal_label(2100.0), "Calorie Goal (2100 kcal)");
        assert_eq!(mean_label(1834.456), "Average Kcals in (1834.46 kcal)");
    }

    #[test]
    fn test_only_flagged_weeks_open_a_chart() {
        let mut values = vec![Some(1500.0); 7];
        values.extend([Some(2200.0); 7]);
        let series = Series::from_records(records(&values));
        let run = crate::analysis::analyze(series, &AnalysisConfig::default());

        let app = CalorieApp::new(run, AnalysisConfig::default());
        assert_eq!(app.open_weeks, vec![true, false]);
    }
}
