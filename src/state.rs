use std::path::PathBuf;

use crate::data::aggregate::{YearSummary, summarize};
use crate::data::model::UsageTable;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset.
    pub dataset: UsageTable,

    /// File the dataset was read from.
    pub source: PathBuf,

    /// Year chosen in the year selector.
    pub selected_year: i32,

    /// Summaries for `selected_year` (recomputed on every year change).
    pub summary: YearSummary,

    /// Records in `selected_year`, counted alongside `summary`.
    selected_records: usize,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(dataset: UsageTable, source: PathBuf, requested_year: Option<i32>) -> Self {
        let selected_year = initial_year(&dataset, requested_year);
        let mut state = Self {
            dataset,
            source,
            selected_year,
            summary: YearSummary::default(),
            selected_records: 0,
            status_message: None,
        };
        state.recompute();
        state
    }

    /// Distinct years offered by the year selector.
    pub fn years(&self) -> Vec<i32> {
        self.dataset.years().iter().copied().collect()
    }

    /// Number of records behind the current summaries.
    pub fn records_in_selected_year(&self) -> usize {
        self.selected_records
    }

    /// Switch to another year and rebuild the summaries.
    pub fn select_year(&mut self, year: i32) {
        if year == self.selected_year {
            return;
        }
        self.selected_year = year;
        self.recompute();
    }

    /// Replace the dataset, keeping the selected year when the new data has it.
    pub fn set_dataset(&mut self, dataset: UsageTable, source: PathBuf) {
        let keep = dataset.years().contains(&self.selected_year);
        self.selected_year = if keep {
            self.selected_year
        } else {
            initial_year(&dataset, None)
        };
        self.dataset = dataset;
        self.source = source;
        self.status_message = None;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.summary = summarize(&self.dataset, self.selected_year);
        self.selected_records = self.dataset.records_in(self.selected_year).count();
        log::debug!(
            "Summarised {} records of {} for {}: {} months, {} seasons, {} periods",
            self.selected_records,
            self.source.display(),
            self.selected_year,
            self.summary.monthly.len(),
            self.summary.seasons.len(),
            self.summary.periods.len()
        );
    }
}

/// Requested year if the data has it, otherwise the earliest year.
fn initial_year(dataset: &UsageTable, requested: Option<i32>) -> i32 {
    let first = dataset.years().iter().next().copied();
    match requested {
        Some(year) if dataset.years().contains(&year) => year,
        Some(year) => {
            log::warn!("No records for year {year}; showing {first:?} instead");
            first.unwrap_or(year)
        }
        None => first.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Season, UsageRecord};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn table(years: &[i32]) -> UsageTable {
        let records = years
            .iter()
            .map(|&y| {
                let date = NaiveDate::from_ymd_opt(y, 7, 1).unwrap();
                UsageRecord::new(date, None, Season::Summer, true, "Morning", y as u64 % 10, 10, None)
                    .unwrap()
            })
            .collect();
        UsageTable::from_records(records)
    }

    #[test]
    fn starts_on_first_year() {
        let state = AppState::new(table(&[2012, 2011]), "hour.csv".into(), None);
        assert_eq!(state.selected_year, 2011);
        assert_eq!(state.records_in_selected_year(), 1);
        assert_eq!(state.years(), vec![2011, 2012]);
        assert_eq!(state.summary.year, 2011);
        assert_eq!(state.summary.total_rentals(), 11);
    }

    #[test]
    fn honours_requested_year_when_present() {
        let state = AppState::new(table(&[2011, 2012]), "hour.csv".into(), Some(2012));
        assert_eq!(state.selected_year, 2012);

        let state = AppState::new(table(&[2011, 2012]), "hour.csv".into(), Some(1999));
        assert_eq!(state.selected_year, 2011);
    }

    #[test]
    fn selecting_a_year_recomputes() {
        let mut state = AppState::new(table(&[2011, 2012, 2012]), "hour.csv".into(), None);
        state.select_year(2012);
        assert_eq!(state.summary.year, 2012);
        assert_eq!(state.summary.total_rentals(), 24);
        assert_eq!(state.records_in_selected_year(), 2);

        state.select_year(2030);
        assert!(state.summary.is_empty());
        assert_eq!(state.records_in_selected_year(), 0);
    }

    #[test]
    fn new_dataset_keeps_year_if_possible() {
        let mut state = AppState::new(table(&[2011, 2012]), "a.csv".into(), Some(2012));
        state.status_message = Some("Error: earlier failure".into());

        state.set_dataset(table(&[2012, 2013]), "b.csv".into());
        assert_eq!(state.selected_year, 2012);
        assert_eq!(state.source, PathBuf::from("b.csv"));
        assert_eq!(state.status_message, None);
        assert_eq!(state.records_in_selected_year(), 1);

        state.set_dataset(table(&[2015, 2015, 2015]), "c.csv".into());
        assert_eq!(state.selected_year, 2015);
        assert_eq!(state.summary.year, 2015);
        assert_eq!(state.records_in_selected_year(), 3);
    }
}
