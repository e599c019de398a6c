use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{BooleanArray, Date32Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate, Weekday};
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One generated hour, in the column layout the dashboard reads.
#[derive(Debug, Serialize)]
struct HourRow {
    dteday: NaiveDate,
    season: &'static str,
    yr: i32,
    mnth: u32,
    hr: u32,
    workingday: u8,
    timeperiod: &'static str,
    casual: i64,
    registered: i64,
    cnt: i64,
}

fn season_of(month: u32) -> &'static str {
    match month {
        3..=5 => "Spring",
        6..=8 => "Summer",
        9..=11 => "Fall",
        _ => "Winter",
    }
}

fn time_period_of(hour: u32) -> &'static str {
    match hour {
        0..=4 => "Late Night",
        5..=7 => "Early Morning",
        8..=10 => "Morning",
        11..=13 => "Midday",
        14..=16 => "Afternoon",
        17..=19 => "Evening",
        _ => "Night",
    }
}

fn season_factor(season: &str) -> f64 {
    match season {
        "Summer" => 1.3,
        "Fall" => 1.15,
        "Spring" => 0.9,
        _ => 0.55,
    }
}

/// Expected (casual, registered) riders for an hour.
fn hourly_profile(hour: u32, working_day: bool) -> (f64, f64) {
    if working_day {
        let registered = match hour {
            7..=8 | 17..=18 => 320.0,
            6 | 9 | 16 | 19 => 180.0,
            10..=15 => 110.0,
            20..=22 => 90.0,
            _ => 15.0,
        };
        let casual = match hour {
            10..=19 => 35.0,
            _ => 6.0,
        };
        (casual, registered)
    } else {
        let bell = (-((hour as f64 - 14.0).powi(2)) / 18.0).exp();
        (15.0 + 140.0 * bell, 25.0 + 190.0 * bell)
    }
}

fn generate(rng: &mut SimpleRng) -> Vec<HourRow> {
    let start = NaiveDate::from_ymd_opt(2011, 1, 1).expect("valid start date");
    let end = NaiveDate::from_ymd_opt(2012, 12, 31).expect("valid end date");

    let mut rows = Vec::new();
    let mut day = start;
    while day <= end {
        let season = season_of(day.month());
        let working_day = !matches!(day.weekday(), Weekday::Sat | Weekday::Sun);
        // ridership grows in the second year
        let growth = if day.year() == 2012 { 1.6 } else { 1.0 };
        let scale = season_factor(season) * growth;

        for hour in 0..24 {
            let (casual_mean, registered_mean) = hourly_profile(hour, working_day);
            let casual = rng.gauss(casual_mean * scale, casual_mean * 0.2).round().max(0.0) as i64;
            let registered = rng
                .gauss(registered_mean * scale, registered_mean * 0.15)
                .round()
                .max(0.0) as i64;

            rows.push(HourRow {
                dteday: day,
                season,
                yr: day.year(),
                mnth: day.month(),
                hr: hour,
                workingday: working_day as u8,
                timeperiod: time_period_of(hour),
                casual,
                registered,
                cnt: casual + registered,
            });
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    rows
}

fn write_csv(rows: &[HourRow], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_parquet(rows: &[HourRow], path: &str) -> Result<()> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch");

    let schema = Arc::new(Schema::new(vec![
        Field::new("dteday", DataType::Date32, false),
        Field::new("season", DataType::Utf8, false),
        Field::new("yr", DataType::Int32, false),
        Field::new("hr", DataType::Int32, false),
        Field::new("workingday", DataType::Boolean, false),
        Field::new("timeperiod", DataType::Utf8, false),
        Field::new("casual", DataType::Int64, false),
        Field::new("registered", DataType::Int64, false),
        Field::new("cnt", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Date32Array::from(
                rows.iter()
                    .map(|r| (r.dteday - epoch).num_days() as i32)
                    .collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(rows.iter().map(|r| r.season).collect::<Vec<_>>())),
            Arc::new(Int32Array::from(rows.iter().map(|r| r.yr).collect::<Vec<_>>())),
            Arc::new(Int32Array::from(rows.iter().map(|r| r.hr as i32).collect::<Vec<_>>())),
            Arc::new(BooleanArray::from(
                rows.iter().map(|r| r.workingday == 1).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(rows.iter().map(|r| r.timeperiod).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.casual).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.registered).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.cnt).collect::<Vec<_>>())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    write_csv(&rows, "sample_hour.csv")?;
    write_parquet(&rows, "sample_hour.parquet")?;

    println!(
        "Wrote {} hourly records to sample_hour.csv and sample_hour.parquet",
        rows.len()
    );
    Ok(())
}
