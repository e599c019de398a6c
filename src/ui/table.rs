use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::{MonthlySummary, PeriodSummary, SeasonSummary, WorkingDaySummary};
use crate::ui::{format_count, working_day_label};

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Collapsible data table under each chart
// ---------------------------------------------------------------------------

/// Render the rows behind a chart in a collapsed "Data" section.
pub fn data_table(ui: &mut Ui, id: &str, headers: &[&str], rows: &[Vec<String>]) {
    egui::CollapsingHeader::new("Data")
        .id_salt(id)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if rows.is_empty() {
                ui.weak("No rows");
                return;
            }
            ui.push_id(id, |ui: &mut Ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .vscroll(false)
                    .columns(Column::auto().at_least(90.0), headers.len())
                    .header(ROW_HEIGHT + 2.0, |mut header| {
                        for h in headers {
                            header.col(|ui: &mut Ui| {
                                ui.strong(*h);
                            });
                        }
                    })
                    .body(|mut body| {
                        for row in rows {
                            body.row(ROW_HEIGHT, |mut table_row| {
                                for cell in row {
                                    table_row.col(|ui: &mut Ui| {
                                        ui.label(cell);
                                    });
                                }
                            });
                        }
                    });
            });
        });
}

// -- Row builders --

pub const MONTHLY_HEADERS: &[&str] = &["Month", "Casual", "Registered", "Total"];
pub const SEASON_HEADERS: &[&str] = &["Season", "Total"];
pub const WORKING_DAY_HEADERS: &[&str] = &["Working day", "Customer type", "Rent"];
pub const PERIOD_HEADERS: &[&str] = &["Time period", "Total"];

pub fn monthly_rows(rows: &[MonthlySummary]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| {
            vec![
                r.month.clone(),
                format_count(r.casual),
                format_count(r.registered),
                format_count(r.total),
            ]
        })
        .collect()
}

pub fn season_rows(rows: &[SeasonSummary]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| vec![r.season.to_string(), format_count(r.total)])
        .collect()
}

pub fn working_day_rows(rows: &[WorkingDaySummary]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| {
            vec![
                working_day_label(r.working_day).to_string(),
                r.customer_type.to_string(),
                format_count(r.rent),
            ]
        })
        .collect()
}

pub fn period_rows(rows: &[PeriodSummary]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| vec![r.time_period.clone(), format_count(r.total)])
        .collect()
}
