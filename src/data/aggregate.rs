use std::collections::BTreeMap;
use std::fmt;

use chrono::Datelike;

use super::model::{Season, UsageTable};

// ---------------------------------------------------------------------------
// Summary rows
// ---------------------------------------------------------------------------

/// Sums for one calendar month of the selected year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlySummary {
    /// `YYYY-MM`
    pub month: String,
    pub casual: u64,
    pub registered: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonSummary {
    pub season: Season,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CustomerType {
    Casual,
    Registered,
}

impl CustomerType {
    pub const ALL: [CustomerType; 2] = [CustomerType::Casual, CustomerType::Registered];

    pub fn label(self) -> &'static str {
        match self {
            CustomerType::Casual => "casual",
            CustomerType::Registered => "registered",
        }
    }
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One (working day, customer type) cell of the long-form working-day table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingDaySummary {
    pub working_day: bool,
    pub customer_type: CustomerType,
    pub rent: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodSummary {
    pub time_period: String,
    pub total: u64,
}

/// Everything the dashboard shows for one year.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearSummary {
    pub year: i32,
    pub monthly: Vec<MonthlySummary>,
    pub seasons: Vec<SeasonSummary>,
    pub working_days: Vec<WorkingDaySummary>,
    pub periods: Vec<PeriodSummary>,
}

impl YearSummary {
    /// Total rentals for the year (sum of the monthly totals).
    pub fn total_rentals(&self) -> u64 {
        self.monthly.iter().fold(0u64, |acc, m| acc.saturating_add(m.total))
    }

    pub fn is_empty(&self) -> bool {
        self.monthly.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Accumulator
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy)]
struct Counts {
    casual: u64,
    registered: u64,
    total: u64,
}

// Each record's counts are range-checked on load, but a group sum is not, so
// sums saturate at `u64::MAX` instead of wrapping.
impl Counts {
    fn add(&mut self, casual: u64, registered: u64, total: u64) {
        self.casual = self.casual.saturating_add(casual);
        self.registered = self.registered.saturating_add(registered);
        self.total = self.total.saturating_add(total);
    }
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

/// Monthly casual/registered/total sums for `year`, oldest month first.
///
/// Months between the first and last month with data that have no records of
/// their own are emitted with zero counts, so the series stays contiguous.
pub fn monthly(table: &UsageTable, year: i32) -> Vec<MonthlySummary> {
    let mut by_month: BTreeMap<(i32, u32), Counts> = BTreeMap::new();
    for rec in table.records_in(year) {
        by_month
            .entry((rec.date.year(), rec.date.month()))
            .or_default()
            .add(rec.casual, rec.registered, rec.total);
    }

    let (Some(&first), Some(&last)) = (by_month.keys().next(), by_month.keys().next_back()) else {
        return Vec::new();
    };

    let mut rows = Vec::with_capacity(by_month.len());
    let mut key = first;
    while key <= last {
        let counts = by_month.get(&key).copied().unwrap_or_default();
        rows.push(MonthlySummary {
            month: format!("{:04}-{:02}", key.0, key.1),
            casual: counts.casual,
            registered: counts.registered,
            total: counts.total,
        });
        key = next_month(key);
    }
    rows
}

fn next_month((year, month): (i32, u32)) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Total rentals per season for `year`, busiest season first.
///
/// Equal totals are listed in calendar order (spring, summer, fall, winter)
/// as given by [`Season`]'s `Ord`. Grouping on the season label would order
/// them alphabetically instead, so "Fall" would come before "Spring".
pub fn by_season(table: &UsageTable, year: i32) -> Vec<SeasonSummary> {
    let mut totals: BTreeMap<Season, u64> = BTreeMap::new();
    for rec in table.records_in(year) {
        let total = totals.entry(rec.season).or_default();
        *total = total.saturating_add(rec.total);
    }

    let mut rows: Vec<SeasonSummary> = totals
        .into_iter()
        .map(|(season, total)| SeasonSummary { season, total })
        .collect();
    // stable: equal totals keep season order
    rows.sort_by(|a, b| b.total.cmp(&a.total));
    rows
}

/// Casual and registered rentals per working-day flag for `year`, in long form.
///
/// All casual rows come first, then all registered rows; within each block
/// non-working days precede working days.
pub fn by_working_day(table: &UsageTable, year: i32) -> Vec<WorkingDaySummary> {
    let mut groups: BTreeMap<bool, Counts> = BTreeMap::new();
    for rec in table.records_in(year) {
        groups
            .entry(rec.working_day)
            .or_default()
            .add(rec.casual, rec.registered, rec.total);
    }

    // The per-group total is accumulated but not part of the long form.
    CustomerType::ALL
        .iter()
        .flat_map(|&customer_type| {
            groups.iter().map(move |(&working_day, counts)| WorkingDaySummary {
                working_day,
                customer_type,
                rent: match customer_type {
                    CustomerType::Casual => counts.casual,
                    CustomerType::Registered => counts.registered,
                },
            })
        })
        .collect()
}

/// Total rentals per time period for `year`, best period first.
pub fn by_time_period(table: &UsageTable, year: i32) -> Vec<PeriodSummary> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for rec in table.records_in(year) {
        let total = totals.entry(rec.time_period.as_str()).or_default();
        *total = total.saturating_add(rec.total);
    }

    let mut rows: Vec<PeriodSummary> = totals
        .into_iter()
        .map(|(period, total)| PeriodSummary {
            time_period: period.to_string(),
            total,
        })
        .collect();
    // stable: equal totals keep lexicographic period order
    rows.sort_by(|a, b| b.total.cmp(&a.total));
    rows
}

/// Run all four aggregations for `year`.
pub fn summarize(table: &UsageTable, year: i32) -> YearSummary {
    YearSummary {
        year,
        monthly: monthly(table, year),
        seasons: by_season(table, year),
        working_days: by_working_day(table, year),
        periods: by_time_period(table, year),
    }
}

/// The `n` best periods of a table produced by [`by_time_period`].
pub fn best_periods(rows: &[PeriodSummary], n: usize) -> Vec<PeriodSummary> {
    rows.iter().take(n).cloned().collect()
}

/// The `n` worst periods, lowest first. Equal totals keep their order in `rows`.
pub fn worst_periods(rows: &[PeriodSummary], n: usize) -> Vec<PeriodSummary> {
    let mut ascending = rows.to_vec();
    ascending.sort_by(|a, b| a.total.cmp(&b.total));
    ascending.truncate(n);
    ascending
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::UsageRecord;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn rec(
        ymd: (i32, u32, u32),
        season: Season,
        working_day: bool,
        period: &str,
        casual: u64,
        registered: u64,
    ) -> UsageRecord {
        let date = NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).unwrap();
        UsageRecord::new(date, None, season, working_day, period, casual, registered, None).unwrap()
    }

    fn sample_table() -> UsageTable {
        UsageTable::from_records(vec![
            rec((2011, 1, 3), Season::Spring, true, "Morning", 10, 90),
            rec((2011, 1, 9), Season::Spring, false, "Evening", 5, 95),
            rec((2011, 2, 1), Season::Spring, true, "Night", 20, 80),
            rec((2011, 6, 1), Season::Summer, false, "Morning", 60, 140),
            rec((2011, 10, 1), Season::Fall, true, "Evening", 30, 90),
            rec((2012, 1, 1), Season::Spring, true, "Morning", 1, 1),
        ])
    }

    #[test]
    fn absent_year_yields_empty_results() {
        let table = sample_table();
        assert!(monthly(&table, 1999).is_empty());
        assert!(by_season(&table, 1999).is_empty());
        assert!(by_working_day(&table, 1999).is_empty());
        assert!(by_time_period(&table, 1999).is_empty());

        let summary = summarize(&table, 1999);
        assert!(summary.is_empty());
        assert_eq!(summary.total_rentals(), 0);
    }

    #[test]
    fn empty_table_yields_empty_results() {
        let table = UsageTable::default();
        assert_eq!(summarize(&table, 2011), YearSummary { year: 2011, ..Default::default() });
    }

    #[test]
    fn monthly_groups_by_calendar_month() {
        let table = UsageTable::from_records(vec![
            rec((2011, 1, 1), Season::Spring, true, "Morning", 10, 90),
            rec((2011, 1, 20), Season::Spring, true, "Morning", 5, 95),
            rec((2011, 2, 2), Season::Spring, true, "Morning", 20, 80),
        ]);
        assert_eq!(
            monthly(&table, 2011),
            vec![
                MonthlySummary {
                    month: "2011-01".into(),
                    casual: 15,
                    registered: 185,
                    total: 200
                },
                MonthlySummary {
                    month: "2011-02".into(),
                    casual: 20,
                    registered: 80,
                    total: 100
                },
            ]
        );
    }

    #[test]
    fn monthly_is_chronological_and_consistent() {
        let table = UsageTable::from_records(vec![
            rec((2011, 12, 1), Season::Winter, true, "Morning", 4, 4),
            rec((2011, 3, 1), Season::Spring, true, "Morning", 1, 2),
            rec((2011, 5, 1), Season::Spring, true, "Morning", 3, 3),
        ]);
        let rows = monthly(&table, 2011);
        let labels: Vec<&str> = rows.iter().map(|r| r.month.as_str()).collect();
        assert_eq!(labels.first(), Some(&"2011-03"));
        assert_eq!(labels.last(), Some(&"2011-12"));
        assert!(labels.windows(2).all(|w| w[0] <= w[1]));
        assert!(rows.iter().all(|r| r.total == r.casual + r.registered));
    }

    #[test]
    fn monthly_fills_gaps_with_zero_rows() {
        let table = UsageTable::from_records(vec![
            rec((2011, 1, 1), Season::Spring, true, "Morning", 1, 1),
            rec((2011, 3, 1), Season::Spring, true, "Morning", 2, 2),
        ]);
        let rows = monthly(&table, 2011);
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[1],
            MonthlySummary {
                month: "2011-02".into(),
                casual: 0,
                registered: 0,
                total: 0
            }
        );
    }

    #[test]
    fn seasons_sorted_by_total_descending() {
        let table = UsageTable::from_records(vec![
            rec((2011, 4, 1), Season::Spring, true, "Morning", 10, 40),
            rec((2011, 7, 1), Season::Summer, true, "Morning", 50, 150),
            rec((2011, 10, 1), Season::Fall, true, "Morning", 20, 100),
        ]);
        assert_eq!(
            by_season(&table, 2011),
            vec![
                SeasonSummary { season: Season::Summer, total: 200 },
                SeasonSummary { season: Season::Fall, total: 120 },
                SeasonSummary { season: Season::Spring, total: 50 },
            ]
        );
    }

    #[test]
    fn season_ties_keep_calendar_order() {
        // Alphabetical order would put Fall first.
        let table = UsageTable::from_records(vec![
            rec((2011, 10, 1), Season::Fall, true, "Morning", 5, 5),
            rec((2011, 4, 1), Season::Spring, true, "Morning", 5, 5),
            rec((2011, 7, 1), Season::Summer, true, "Morning", 1, 1),
        ]);
        assert_eq!(
            by_season(&table, 2011),
            vec![
                SeasonSummary { season: Season::Spring, total: 10 },
                SeasonSummary { season: Season::Fall, total: 10 },
                SeasonSummary { season: Season::Summer, total: 2 },
            ]
        );

        let table = UsageTable::from_records(vec![
            rec((2011, 12, 1), Season::Winter, true, "Morning", 5, 5),
            rec((2011, 10, 1), Season::Fall, true, "Morning", 5, 5),
            rec((2011, 7, 1), Season::Summer, true, "Morning", 5, 5),
            rec((2011, 4, 1), Season::Spring, true, "Morning", 5, 5),
        ]);
        let seasons: Vec<Season> = by_season(&table, 2011).iter().map(|s| s.season).collect();
        assert_eq!(seasons, vec![Season::Spring, Season::Summer, Season::Fall, Season::Winter]);
    }

    #[test]
    fn period_ties_keep_lexicographic_order() {
        let table = UsageTable::from_records(vec![
            rec((2011, 1, 3), Season::Spring, true, "Night", 10, 10),
            rec((2011, 1, 4), Season::Spring, true, "Morning", 50, 50),
            rec((2011, 1, 5), Season::Spring, true, "Evening", 5, 15),
            rec((2011, 1, 6), Season::Spring, true, "Afternoon", 1, 1),
        ]);
        assert_eq!(
            by_time_period(&table, 2011),
            vec![
                PeriodSummary { time_period: "Morning".into(), total: 100 },
                PeriodSummary { time_period: "Evening".into(), total: 20 },
                PeriodSummary { time_period: "Night".into(), total: 20 },
                PeriodSummary { time_period: "Afternoon".into(), total: 2 },
            ]
        );
    }

    #[test]
    fn worst_period_ties_keep_table_order() {
        let rows: Vec<PeriodSummary> = [("Morning", 90), ("Evening", 40), ("Night", 40), ("Midday", 10)]
            .iter()
            .map(|&(p, t)| PeriodSummary { time_period: p.into(), total: t })
            .collect();

        let worst: Vec<String> = worst_periods(&rows, 3).into_iter().map(|r| r.time_period).collect();
        assert_eq!(worst, vec!["Midday", "Evening", "Night"]);

        let worst: Vec<String> = worst_periods(&rows, 2).into_iter().map(|r| r.time_period).collect();
        assert_eq!(worst, vec!["Midday", "Evening"]);
    }

    #[test]
    fn group_sums_saturate_instead_of_wrapping() {
        let table = UsageTable::from_records(vec![
            rec((2011, 1, 3), Season::Spring, true, "Night", u64::MAX - 1, 0),
            rec((2011, 1, 4), Season::Spring, true, "Night", 5, 0),
        ]);
        let summary = summarize(&table, 2011);
        assert_eq!(summary.monthly[0].casual, u64::MAX);
        assert_eq!(summary.monthly[0].total, u64::MAX);
        assert_eq!(summary.seasons, vec![SeasonSummary { season: Season::Spring, total: u64::MAX }]);
        assert_eq!(summary.periods[0].total, u64::MAX);
        assert_eq!(summary.total_rentals(), u64::MAX);
    }

    #[test]
    fn working_day_long_form() {
        let table = sample_table();
        assert_eq!(
            by_working_day(&table, 2011),
            vec![
                WorkingDaySummary {
                    working_day: false,
                    customer_type: CustomerType::Casual,
                    rent: 65
                },
                WorkingDaySummary {
                    working_day: true,
                    customer_type: CustomerType::Casual,
                    rent: 60
                },
                WorkingDaySummary {
                    working_day: false,
                    customer_type: CustomerType::Registered,
                    rent: 235
                },
                WorkingDaySummary {
                    working_day: true,
                    customer_type: CustomerType::Registered,
                    rent: 260
                },
            ]
        );
    }

    #[test]
    fn working_day_rows_cover_each_flag_twice() {
        let table = sample_table();
        let rows = by_working_day(&table, 2012);
        assert_eq!(rows.len(), 2);

        let rows = by_working_day(&table, 2011);
        let casual: u64 = rows
            .iter()
            .filter(|r| r.customer_type == CustomerType::Casual)
            .map(|r| r.rent)
            .sum();
        let raw: u64 = table.records_in(2011).map(|r| r.casual).sum();
        assert_eq!(casual, raw);
    }

    #[test]
    fn periods_sorted_best_first() {
        let table = sample_table();
        let rows = by_time_period(&table, 2011);
        assert_eq!(
            rows,
            vec![
                PeriodSummary { time_period: "Morning".into(), total: 300 },
                PeriodSummary { time_period: "Evening".into(), total: 220 },
                PeriodSummary { time_period: "Night".into(), total: 100 },
            ]
        );
        let max = rows.iter().map(|r| r.total).max();
        let min = rows.iter().map(|r| r.total).min();
        assert_eq!(rows.first().map(|r| r.total), max);
        assert_eq!(rows.last().map(|r| r.total), min);
    }

    #[test]
    fn best_and_worst_periods() {
        let rows: Vec<PeriodSummary> = [("A", 70), ("B", 60), ("C", 50), ("D", 40), ("E", 30), ("F", 20)]
            .iter()
            .map(|&(p, t)| PeriodSummary { time_period: p.into(), total: t })
            .collect();

        let best: Vec<String> = best_periods(&rows, 5).into_iter().map(|r| r.time_period).collect();
        assert_eq!(best, vec!["A", "B", "C", "D", "E"]);

        let worst: Vec<String> = worst_periods(&rows, 5).into_iter().map(|r| r.time_period).collect();
        assert_eq!(worst, vec!["F", "E", "D", "C", "B"]);

        assert_eq!(worst_periods(&rows[..2], 5).len(), 2);
    }

    #[test]
    fn summary_total_matches_filtered_records() {
        let table = sample_table();
        let summary = summarize(&table, 2011);
        let raw: u64 = table.records_in(2011).map(|r| r.total).sum();
        assert_eq!(summary.year, 2011);
        assert_eq!(summary.total_rentals(), raw);
        assert_eq!(summary.seasons[0].season, Season::Spring);
    }
}
