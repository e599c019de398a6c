use eframe::egui::{RichText, Ui};
use egui_plot::{
    Bar, BarChart, HPlacement, Legend, Line, Plot, PlotPoint, PlotPoints, PlotUi,
    uniform_grid_spacer,
};

use crate::color::{self, ColorMap};
use crate::data::aggregate::{
    CustomerType, MonthlySummary, PeriodSummary, SeasonSummary, WorkingDaySummary, best_periods,
    worst_periods,
};
use crate::ui::{format_count, working_day_label};

/// Bars shown in each of the best / worst time period panels.
pub const RANKED_BARS: usize = 5;

const CHART_HEIGHT: f32 = 300.0;
const BAR_CHART_HEIGHT: f32 = 180.0;

// ---------------------------------------------------------------------------
// Categorical axes
// ---------------------------------------------------------------------------

/// Places named categories at integer plot coordinates and labels them back.
#[derive(Debug, Clone)]
pub struct CategoryAxis {
    labels: Vec<String>,
    top_down: bool,
}

impl CategoryAxis {
    /// First category at x = 0, growing to the right.
    pub fn left_to_right(labels: Vec<String>) -> Self {
        Self {
            labels,
            top_down: false,
        }
    }

    /// First category at the top of a vertical axis.
    pub fn top_down(labels: Vec<String>) -> Self {
        Self {
            labels,
            top_down: true,
        }
    }

    pub fn position(&self, index: usize) -> f64 {
        if self.top_down {
            self.labels.len().saturating_sub(index + 1) as f64
        } else {
            index as f64
        }
    }

    /// Label for a grid mark; empty for marks between or outside categories.
    pub fn label_at(&self, value: f64) -> String {
        let rounded = value.round();
        if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
            return String::new();
        }
        let pos = rounded as usize;
        if pos >= self.labels.len() {
            return String::new();
        }
        let index = if self.top_down {
            self.labels.len() - 1 - pos
        } else {
            pos
        };
        self.labels[index].clone()
    }
}

fn no_data(ui: &mut Ui) {
    ui.add_space(8.0);
    ui.label(RichText::new("No data for the selected year").italics().weak());
    ui.add_space(8.0);
}

// ---------------------------------------------------------------------------
// Monthly line chart
// ---------------------------------------------------------------------------

/// Casual, registered and total rentals across the months of the year.
pub fn monthly_chart(ui: &mut Ui, rows: &[MonthlySummary]) {
    if rows.is_empty() {
        no_data(ui);
        return;
    }

    let axis = CategoryAxis::left_to_right(rows.iter().map(|r| r.month.clone()).collect());
    let series: [(&str, &str, fn(&MonthlySummary) -> u64); 3] = [
        ("casual", color::CASUAL_HEX, |r| r.casual),
        ("registered", color::REGISTERED_HEX, |r| r.registered),
        ("total", color::TOTAL_HEX, |r| r.total),
    ];
    let lines: Vec<Line> = series
        .iter()
        .map(|&(name, hex, value)| {
            let points: PlotPoints = rows
                .iter()
                .enumerate()
                .map(|(i, r)| [axis.position(i), value(r) as f64])
                .collect();
            Line::new(points)
                .name(name)
                .color(color::hex(hex))
                .width(3.0)
        })
        .collect();

    Plot::new("monthly_plot")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Month")
        .y_axis_label("Rent")
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 2.0, 4.0]))
        .x_axis_formatter(move |mark, _range| axis.label_at(mark.value))
        .include_y(0.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            for line in lines {
                plot_ui.line(line);
            }
        });
}

// ---------------------------------------------------------------------------
// Horizontal bar charts
// ---------------------------------------------------------------------------

/// Show a horizontal bar plot whose y axis carries `axis`'s category labels.
///
/// A mirrored plot expects negated values: bars grow to the left, the value
/// axis and hover labels show magnitudes, and the category labels sit on the
/// right.
fn show_bar_plot(
    ui: &mut Ui,
    id: &str,
    axis: CategoryAxis,
    mirrored: bool,
    add_contents: impl FnOnce(&mut PlotUi),
) {
    let mut plot = Plot::new(id)
        .height(BAR_CHART_HEIGHT)
        .y_grid_spacer(uniform_grid_spacer(|_| [1.0, 2.0, 4.0]))
        .y_axis_formatter(move |mark, _range| axis.label_at(mark.value))
        .include_x(0.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false);

    if mirrored {
        plot = plot
            .x_axis_formatter(|mark, _range| format_count(mark.value.abs().round() as u64))
            .label_formatter(mirrored_cursor_label)
            .y_axis_position(HPlacement::Right);
    }

    plot.show(ui, add_contents);
}

/// Hover text for a negated value: the name, then the magnitude.
fn magnitude_label(name: &str, value: f64) -> String {
    let count = format_count(value.abs().round() as u64);
    if name.is_empty() {
        count
    } else {
        format!("{name}\n{count}")
    }
}

fn mirrored_cursor_label(name: &str, point: &PlotPoint) -> String {
    magnitude_label(name, point.x)
}

fn mirrored_bar_label(bar: &Bar, _chart: &BarChart) -> String {
    magnitude_label(&bar.name, bar.value)
}

/// Ranked bars, first row on top and highlighted.
fn ranked_bars(axis: &CategoryAxis, rows: &[(String, u64)], sign: f64) -> Vec<Bar> {
    rows.iter()
        .zip(color::highlight_palette(rows.len()))
        .enumerate()
        .map(|(i, ((label, total), fill))| {
            Bar::new(axis.position(i), sign * *total as f64)
                .name(label)
                .fill(fill)
        })
        .collect()
}

/// Seasons ordered by volume, the busiest one highlighted.
pub fn season_chart(ui: &mut Ui, rows: &[SeasonSummary]) {
    if rows.is_empty() {
        no_data(ui);
        return;
    }

    let ranked: Vec<(String, u64)> = rows.iter().map(|r| (r.season.to_string(), r.total)).collect();
    let axis = CategoryAxis::top_down(ranked.iter().map(|(l, _)| l.clone()).collect());
    let bars = ranked_bars(&axis, &ranked, 1.0);

    show_bar_plot(ui, "season_plot", axis, false, |plot_ui| {
        plot_ui.bar_chart(BarChart::new(bars).horizontal().width(0.6));
    });
}

/// Casual vs registered rentals for each working-day category.
pub fn working_day_chart(ui: &mut Ui, rows: &[WorkingDaySummary]) {
    if rows.is_empty() {
        no_data(ui);
        return;
    }

    let mut flags: Vec<bool> = rows.iter().map(|r| r.working_day).collect();
    flags.sort();
    flags.dedup();

    let axis = CategoryAxis::top_down(
        flags
            .iter()
            .map(|&f| working_day_label(f).to_string())
            .collect(),
    );
    let colors = ColorMap::new(&CustomerType::ALL);

    let charts: Vec<BarChart> = CustomerType::ALL
        .iter()
        .map(|&customer_type| {
            // casual above registered within each group
            let offset = match customer_type {
                CustomerType::Casual => 0.2,
                CustomerType::Registered => -0.2,
            };
            let bars = rows
                .iter()
                .filter(|r| r.customer_type == customer_type)
                .filter_map(|r| {
                    let idx = flags.iter().position(|&f| f == r.working_day)?;
                    Some(
                        Bar::new(axis.position(idx) + offset, r.rent as f64)
                            .name(working_day_label(r.working_day)),
                    )
                })
                .collect();
            BarChart::new(bars)
                .horizontal()
                .width(0.4)
                .name(customer_type.label())
                .color(colors.color_for(&customer_type))
        })
        .collect();

    ui.horizontal(|ui| {
        for customer_type in CustomerType::ALL {
            ui.colored_label(colors.color_for(&customer_type), format!("■ {customer_type}"));
        }
    });
    show_bar_plot(ui, "working_day_plot", axis, false, |plot_ui| {
        for chart in charts {
            plot_ui.bar_chart(chart);
        }
    });
}

/// Paired best / worst time period panels; the worst panel is mirrored.
pub fn period_charts(ui: &mut Ui, rows: &[PeriodSummary]) {
    if rows.is_empty() {
        no_data(ui);
        return;
    }

    let best = best_periods(rows, RANKED_BARS);
    let worst = worst_periods(rows, RANKED_BARS);

    ui.columns(2, |cols| {
        cols[0].vertical_centered(|ui| ui.strong("Best Performing Time"));
        period_bars(&mut cols[0], "best_periods_plot", &best, false);

        cols[1].vertical_centered(|ui| ui.strong("Worst Performing Time"));
        period_bars(&mut cols[1], "worst_periods_plot", &worst, true);
    });
}

fn period_bars(ui: &mut Ui, id: &str, rows: &[PeriodSummary], mirrored: bool) {
    let ranked: Vec<(String, u64)> = rows
        .iter()
        .map(|r| (r.time_period.clone(), r.total))
        .collect();
    let axis = CategoryAxis::top_down(ranked.iter().map(|(l, _)| l.clone()).collect());
    let sign = if mirrored { -1.0 } else { 1.0 };
    let bars = ranked_bars(&axis, &ranked, sign);

    let mut chart = BarChart::new(bars).horizontal().width(0.6);
    if mirrored {
        chart = chart.element_formatter(Box::new(mirrored_bar_label));
    }

    show_bar_plot(ui, id, axis, mirrored, |plot_ui| {
        plot_ui.bar_chart(chart);
    });
}
