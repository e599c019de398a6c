use eframe::egui::{self, Color32, Margin, RichText, Ui};

use crate::state::AppState;
use crate::ui::{format_count, plot, table};

// ---------------------------------------------------------------------------
// Left side panel – year selector
// ---------------------------------------------------------------------------

/// Render the left panel with the year toggle.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Bike Sharing");
    ui.separator();

    ui.strong("Choose Year to see data");
    let years = state.years();
    let mut chosen = state.selected_year;
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for year in &years {
            ui.radio_value(&mut chosen, *year, year.to_string());
        }
    });
    if chosen != state.selected_year {
        log::info!("Year changed to {chosen}");
        state.select_year(chosen);
    }

    ui.separator();
    ui.label(format!(
        "{} records in {}",
        format_count(state.records_in_selected_year() as u64),
        state.selected_year
    ));
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} records loaded from {}",
            format_count(state.dataset.len() as u64),
            state.source.display()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

/// Footer caption.
pub fn footer(ui: &mut Ui, state: &AppState) {
    let name = state
        .source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    ui.label(RichText::new(format!("Data source: {name}")).small().weak());
}

// ---------------------------------------------------------------------------
// Central dashboard
// ---------------------------------------------------------------------------

/// Metric tiles, the four charts and their data tables.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let summary = &state.summary;

    ui.heading("Bike Sharing Data Dashboard");
    ui.add_space(8.0);

    ui.horizontal(|ui: &mut Ui| {
        metric_tile(ui, "Current Data Info Year", state.selected_year.to_string());
        metric_tile(ui, "Total Rent", format_count(summary.total_rentals()));
    });

    if summary.is_empty() {
        ui.add_space(8.0);
        ui.label(
            RichText::new(format!("No usage records for {}", state.selected_year))
                .color(Color32::YELLOW),
        );
    }

    section(ui, "Monthly Bike Sharing Performance Analysis");
    plot::monthly_chart(ui, &summary.monthly);
    table::data_table(
        ui,
        "monthly_table",
        table::MONTHLY_HEADERS,
        &table::monthly_rows(&summary.monthly),
    );

    section(ui, "Seasonal Bike Sharing Performance Analysis");
    plot::season_chart(ui, &summary.seasons);
    table::data_table(
        ui,
        "season_table",
        table::SEASON_HEADERS,
        &table::season_rows(&summary.seasons),
    );

    section(ui, "Working Day Bike Sharing Performance");
    plot::working_day_chart(ui, &summary.working_days);
    table::data_table(
        ui,
        "working_day_table",
        table::WORKING_DAY_HEADERS,
        &table::working_day_rows(&summary.working_days),
    );

    section(ui, "Best and Worst Performing Time by Number of Rent");
    plot::period_charts(ui, &summary.periods);
    table::data_table(
        ui,
        "period_table",
        table::PERIOD_HEADERS,
        &table::period_rows(&summary.periods),
    );
}

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(16.0);
    ui.separator();
    ui.heading(RichText::new(title).size(18.0));
    ui.add_space(4.0);
}

fn metric_tile(ui: &mut Ui, label: &str, value: String) {
    egui::Frame::group(ui.style())
        .inner_margin(Margin::same(12))
        .show(ui, |ui: &mut Ui| {
            ui.set_min_width(180.0);
            ui.vertical(|ui: &mut Ui| {
                ui.label(RichText::new(label).weak());
                ui.label(RichText::new(value).size(28.0).strong());
            });
        });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open bike-sharing data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} records for years {:?} from {}",
                    dataset.len(),
                    dataset.years(),
                    path.display()
                );
                state.set_dataset(dataset, path);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
