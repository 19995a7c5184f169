use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, Float64Array};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use super::table::Table;
use crate::persist::whitespace_records;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a numeric table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – flat numeric columns (recommended)
/// * `.json`    – `[{ "a": 1.0, "b": 2.0 }, ...]` or `{ "a": [...], "b": [...] }`
/// * anything else – delimited text with a header row; comma-delimited when
///   the header holds a comma, whitespace-delimited otherwise
///
/// Non-numeric columns are skipped with a warning.
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        _ => load_text(path)?,
    };
    log::info!(
        "Loaded {} rows with columns {:?} from {}",
        table.num_rows(),
        table.column_names(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Column assembly
// ---------------------------------------------------------------------------

/// Columns being filled cell by cell; `None` once a non-numeric cell shows up.
struct ColumnBuilder {
    name: String,
    values: Option<Vec<f64>>,
}

impl ColumnBuilder {
    fn new(name: &str) -> Self {
        ColumnBuilder {
            name: name.to_string(),
            values: Some(Vec::new()),
        }
    }

    fn push(&mut self, value: Option<f64>) {
        match value {
            Some(v) => {
                if let Some(values) = &mut self.values {
                    values.push(v);
                }
            }
            None => {
                if self.values.take().is_some() {
                    log::warn!("Skipping non-numeric column '{}'", self.name);
                }
            }
        }
    }
}

fn finish(columns: Vec<ColumnBuilder>) -> Result<Table> {
    let numeric: Vec<(String, Vec<f64>)> = columns
        .into_iter()
        .filter_map(|c| c.values.map(|v| (c.name, v)))
        .collect();
    if numeric.is_empty() {
        bail!("No numeric columns found");
    }
    Ok(Table::new(numeric)?)
}

// ---------------------------------------------------------------------------
// Text loader
// ---------------------------------------------------------------------------

/// Header row with column names, then one row per record. When the header
/// starts with a blank name or is one field shorter than the rows, the first
/// field of each row is an index column (as written by the cut-table export)
/// and is dropped.
fn load_text(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading text table")?;
    let first_line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");

    let records = if first_line.contains(',') {
        comma_records(&text).context("parsing comma-delimited table")?
    } else {
        whitespace_records(&text).context("parsing whitespace-delimited table")?
    };

    let mut records = records.into_iter();
    let mut header = records.next().context("table file is empty")?;
    let rows: Vec<Vec<String>> = records.collect();

    let skip = if header.first().is_some_and(|h| h.is_empty()) {
        header.remove(0);
        1
    } else {
        match rows.first() {
            Some(row) if row.len() == header.len() + 1 => 1,
            _ => 0,
        }
    };

    let mut columns: Vec<ColumnBuilder> = header.iter().map(|h| ColumnBuilder::new(h)).collect();
    for (row_no, row) in rows.iter().enumerate() {
        if row.len() != header.len() + skip {
            bail!(
                "Row {row_no}: expected {} fields, found {}",
                header.len() + skip,
                row.len()
            );
        }
        for (column, cell) in columns.iter_mut().zip(&row[skip..]) {
            column.push(parse_cell(cell));
        }
    }

    finish(columns)
}

fn comma_records(text: &str) -> csv::Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    reader
        .records()
        .map(|r| r.map(|record| record.iter().map(str::to_string).collect()))
        .collect()
}

/// Numeric cell; blanks and NaN spellings become NaN, anything else `None`.
fn parse_cell(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") || s == "NA" {
        return Some(f64::NAN);
    }
    s.parse::<f64>().ok()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// The two layouts `DataFrame.to_json` produces for flat tables.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonTable {
    /// `orient='records'`: one object per row.
    Records(Vec<Map<String, JsonValue>>),
    /// `orient='list'`: one array per column.
    Columns(Map<String, JsonValue>),
}

fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonTable = serde_json::from_str(&text).context("parsing JSON table")?;

    let columns: Vec<ColumnBuilder> = match root {
        JsonTable::Records(records) => {
            let mut names: Vec<String> = Vec::new();
            for rec in &records {
                for key in rec.keys() {
                    if !names.contains(key) {
                        names.push(key.clone());
                    }
                }
            }
            names
                .iter()
                .map(|name| {
                    let mut column = ColumnBuilder::new(name);
                    for rec in &records {
                        column.push(json_cell(rec.get(name).unwrap_or(&JsonValue::Null)));
                    }
                    column
                })
                .collect()
        }
        JsonTable::Columns(map) => map
            .iter()
            .map(|(name, values)| {
                let mut column = ColumnBuilder::new(name);
                match values.as_array() {
                    Some(arr) => arr.iter().for_each(|v| column.push(json_cell(v))),
                    None => column.push(None),
                }
                column
            })
            .collect(),
    };

    finish(columns)
}

fn json_cell(val: &JsonValue) -> Option<f64> {
    match val {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::Null => Some(f64::NAN),
        JsonValue::String(s) => parse_cell(s),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of flat columns. Every numeric Arrow type is widened
/// to Float64; nulls become NaN.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let schema = builder.schema().clone();
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<ColumnBuilder> = schema
        .fields()
        .iter()
        .map(|f| {
            let mut column = ColumnBuilder::new(f.name());
            if !f.data_type().is_numeric() {
                column.push(None);
            }
            column
        })
        .collect();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (idx, column) in columns.iter_mut().enumerate() {
            if column.values.is_none() {
                continue;
            }
            let widened = cast(batch.column(idx), &DataType::Float64)
                .with_context(|| format!("casting column '{}' to Float64", column.name))?;
            let floats = widened
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array after cast")?;
            for row in 0..floats.len() {
                column.push(Some(if floats.is_null(row) {
                    f64::NAN
                } else {
                    floats.value(row)
                }));
            }
        }
    }

    finish(columns)
}
