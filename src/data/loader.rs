use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type,
    Int64Type, UInt8Type, UInt16Type, UInt32Type, UInt64Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::model::{
    RecordError, Season, UsageRecord, UsageTable, parse_count, parse_date, parse_working_day,
    parse_year,
};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a usage table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one usage record per line (recommended)
/// * `.json`    – `[{ "dteday": "2011-01-01", "yr": 2011, ... }, ...]`
/// * `.parquet` – one column per field; dates as Utf8 or Date32
///
/// Any malformed row rejects the whole file.
pub fn load_file(path: &Path) -> Result<UsageTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;

    if table.is_empty() {
        bail!("{} contains no usage records", path.display());
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// Column mapping shared by all formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Date,
    Year,
    Season,
    WorkingDay,
    TimePeriod,
    Casual,
    Registered,
    Total,
}

const COLUMN_COUNT: usize = 8;

impl Column {
    const ALL: [Column; COLUMN_COUNT] = [
        Column::Date,
        Column::Year,
        Column::Season,
        Column::WorkingDay,
        Column::TimePeriod,
        Column::Casual,
        Column::Registered,
        Column::Total,
    ];

    /// Accepted header names, lowercase. The first one is canonical.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::Date => &["dteday", "date"],
            Column::Year => &["yr", "year"],
            Column::Season => &["season"],
            Column::WorkingDay => &["workingday", "working_day"],
            Column::TimePeriod => &["timeperiod", "time_period"],
            Column::Casual => &["casual"],
            Column::Registered => &["registered"],
            Column::Total => &["cnt", "total", "total_count"],
        }
    }

    fn name(self) -> &'static str {
        self.aliases()[0]
    }

    /// `yr` falls back to the date's year and `cnt` to casual + registered.
    fn required(self) -> bool {
        !matches!(self, Column::Year | Column::Total)
    }

    fn matches(self, header: &str) -> bool {
        let header = header.trim().to_ascii_lowercase();
        self.aliases().contains(&header.as_str())
    }
}

/// Position of each known column in a header; extra columns are ignored.
#[derive(Debug)]
struct ColumnMap([Option<usize>; COLUMN_COUNT]);

impl ColumnMap {
    fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>, source: &str) -> Result<Self> {
        let headers: Vec<&str> = headers.into_iter().collect();
        let mut slots = [None; COLUMN_COUNT];
        for col in Column::ALL {
            slots[col as usize] = headers.iter().position(|h| col.matches(h));
            if slots[col as usize].is_none() && col.required() {
                bail!("{source} missing '{}' column", col.name());
            }
        }
        Ok(ColumnMap(slots))
    }

    /// Collect the cells of one row given a per-position cell reader.
    fn row(&self, mut cell: impl FnMut(usize) -> Result<Option<String>>) -> Result<RawRow> {
        let mut raw = RawRow::default();
        for col in Column::ALL {
            if let Some(idx) = self.0[col as usize] {
                raw.0[col as usize] = cell(idx)
                    .with_context(|| format!("reading '{}'", col.name()))?;
            }
        }
        Ok(raw)
    }
}

/// Untyped cell text of one source row, indexed by [`Column`].
#[derive(Debug, Default)]
struct RawRow([Option<String>; COLUMN_COUNT]);

impl RawRow {
    fn get(&self, col: Column) -> Option<&str> {
        self.0[col as usize]
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn required(&self, col: Column) -> Result<&str, RecordError> {
        self.get(col).ok_or(RecordError::MissingField(col.name()))
    }

    fn to_record(&self) -> Result<UsageRecord, RecordError> {
        let date = parse_date(self.required(Column::Date)?)?;
        let year = self.get(Column::Year).map(parse_year).transpose()?;
        let season: Season = self.required(Column::Season)?.parse()?;
        let working_day = parse_working_day(self.required(Column::WorkingDay)?)?;
        let time_period = self.required(Column::TimePeriod)?;
        let casual = parse_count("casual", self.required(Column::Casual)?)?;
        let registered = parse_count("registered", self.required(Column::Registered)?)?;
        let total = self
            .get(Column::Total)
            .map(|s| parse_count("cnt", s))
            .transpose()?;

        UsageRecord::new(
            date,
            year,
            season,
            working_day,
            time_period,
            casual,
            registered,
            total,
        )
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, matched case-insensitively.
fn load_csv(path: &Path) -> Result<UsageTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();
    let columns = ColumnMap::from_headers(headers.iter(), "CSV")?;

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row_no = i + 1;
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let raw = columns.row(|idx| Ok(record.get(idx).map(str::to_string)))?;
        let rec = raw
            .to_record()
            .with_context(|| format!("CSV row {row_no}"))?;
        records.push(rec);
    }

    Ok(UsageTable::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "dteday": "2011-01-01",
///     "yr": 2011,
///     "season": "Spring",
///     "workingday": 0,
///     "timeperiod": "Night",
///     "casual": 3,
///     "registered": 13,
///     "cnt": 16
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<UsageTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let row_no = i + 1;
        let obj = row
            .as_object()
            .with_context(|| format!("JSON row {row_no} is not an object"))?;
        let rec = json_row(obj)
            .to_record()
            .with_context(|| format!("JSON row {row_no}"))?;
        records.push(rec);
    }

    Ok(UsageTable::from_records(records))
}

fn json_row(obj: &Map<String, JsonValue>) -> RawRow {
    let mut raw = RawRow::default();
    for col in Column::ALL {
        raw.0[col as usize] = obj
            .iter()
            .find(|(key, _)| col.matches(key))
            .and_then(|(_, val)| json_cell(val));
    }
    raw
}

fn json_cell(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Null => None,
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of usage records.
///
/// Works with files written by **Pandas** (`df.to_parquet()`), **Polars**
/// (`df.write_parquet()`) and the bundled `generate_sample` tool. Integer
/// widths are not fixed; dictionary-encoded (categorical) columns are decoded
/// to strings.
fn load_parquet(path: &Path) -> Result<UsageTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    let mut row_offset = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let columns =
            ColumnMap::from_headers(schema.fields().iter().map(|f| f.name().as_str()), "Parquet file")?;

        let arrays: Vec<ArrayRef> = batch
            .columns()
            .iter()
            .map(decode_dictionary)
            .collect::<Result<_>>()?;

        for row in 0..batch.num_rows() {
            let row_no = row_offset + row + 1;
            let raw = columns
                .row(|idx| cell_text(&arrays[idx], row))
                .with_context(|| format!("Parquet row {row_no}"))?;
            let rec = raw
                .to_record()
                .with_context(|| format!("Parquet row {row_no}"))?;
            records.push(rec);
        }
        row_offset += batch.num_rows();
    }

    Ok(UsageTable::from_records(records))
}

// -- Parquet / Arrow helpers --

fn decode_dictionary(col: &ArrayRef) -> Result<ArrayRef> {
    match col.data_type() {
        DataType::Dictionary(_, _) => arrow::compute::cast(col.as_ref(), &DataType::Utf8)
            .context("decoding dictionary column"),
        _ => Ok(col.clone()),
    }
}

/// Render a single Arrow cell as text for the shared row parser.
fn cell_text(col: &ArrayRef, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let text = match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(row).to_string(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        DataType::Boolean => col.as_boolean().value(row).to_string(),
        DataType::Int8 => col.as_primitive::<Int8Type>().value(row).to_string(),
        DataType::Int16 => col.as_primitive::<Int16Type>().value(row).to_string(),
        DataType::Int32 => col.as_primitive::<Int32Type>().value(row).to_string(),
        DataType::Int64 => col.as_primitive::<Int64Type>().value(row).to_string(),
        DataType::UInt8 => col.as_primitive::<UInt8Type>().value(row).to_string(),
        DataType::UInt16 => col.as_primitive::<UInt16Type>().value(row).to_string(),
        DataType::UInt32 => col.as_primitive::<UInt32Type>().value(row).to_string(),
        DataType::UInt64 => col.as_primitive::<UInt64Type>().value(row).to_string(),
        DataType::Float32 => col.as_primitive::<Float32Type>().value(row).to_string(),
        DataType::Float64 => col.as_primitive::<Float64Type>().value(row).to_string(),
        DataType::Date32 => col
            .as_primitive::<Date32Type>()
            .value_as_date(row)
            .context("Date32 value out of range")?
            .format("%Y-%m-%d")
            .to_string(),
        DataType::Date64 => col
            .as_primitive::<Date64Type>()
            .value_as_date(row)
            .context("Date64 value out of range")?
            .format("%Y-%m-%d")
            .to_string(),
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(Some(text))
}
