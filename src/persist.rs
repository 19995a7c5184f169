//! Whole-file snapshots of a cut: the surviving rows and the bounds.
//!
//! Both files are space-delimited text with a header row whose first field
//! is the (empty) index label:
//!
//! ```text
//!  a b
//! lower 20 0.5
//! upper 40 1.5
//! ```
//!
//! Writes go to a temporary file next to the destination which is then
//! renamed over it, so a failed save never leaves a truncated file behind.

use std::fs;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::data::filter::FilteredView;
use crate::data::registry::Registry;
use crate::data::table::Table;
use crate::error::{CutError, Result};

const LOWER_LABEL: &str = "lower";
const UPPER_LABEL: &str = "upper";

/// One dimension's bounds as stored in a bounds file.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedBounds {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
}

impl SavedBounds {
    pub fn new(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        SavedBounds {
            name: name.into(),
            lower,
            upper,
        }
    }
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

/// Write the filtered rows across every table column, prefixed by the
/// original row index.
pub fn save_filtered_table(table: &Table, view: &FilteredView, path: &Path) -> Result<()> {
    let n_columns = table.columns().len();
    let names = table.column_names();
    write_atomically(path, quote_style_for(&names), |writer| {
        let mut header = Vec::with_capacity(n_columns + 1);
        header.push(String::new());
        header.extend(names.iter().cloned());
        writer.write_record(&header)?;

        for &row in view.rows() {
            let mut record = Vec::with_capacity(n_columns + 1);
            record.push(row.to_string());
            record.extend((0..n_columns).map(|col| table.value(col, row).to_string()));
            writer.write_record(&record)?;
        }
        Ok(())
    })?;

    log::info!("Wrote {} of {} rows to {}", view.len(), view.total(), path.display());
    Ok(())
}

/// Write the active bounds of every registered dimension.
pub fn save_bounds(registry: &Registry, path: &Path) -> Result<()> {
    let dims = registry.dimensions();
    let names = registry.list_dimensions();
    write_atomically(path, quote_style_for(&names), |writer| {
        let mut header = vec![String::new()];
        header.extend(names.iter().cloned());
        writer.write_record(&header)?;

        let mut lower = vec![LOWER_LABEL.to_string()];
        lower.extend(dims.iter().map(|d| d.lower.to_string()));
        writer.write_record(&lower)?;

        let mut upper = vec![UPPER_LABEL.to_string()];
        upper.extend(dims.iter().map(|d| d.upper.to_string()));
        writer.write_record(&upper)?;
        Ok(())
    })?;

    log::info!("Wrote cuts on {:?} to {}", registry.list_dimensions(), path.display());
    Ok(())
}

/// Names holding a tab would be split on read unless quoted, and the writer
/// only quotes what contains the space delimiter.
fn quote_style_for(names: &[String]) -> csv::QuoteStyle {
    if names.iter().any(|n| n.contains('\t')) {
        csv::QuoteStyle::Always
    } else {
        csv::QuoteStyle::Necessary
    }
}

fn write_atomically<F>(path: &Path, quote_style: csv::QuoteStyle, fill: F) -> Result<()>
where
    F: FnOnce(&mut csv::Writer<&mut NamedTempFile>) -> csv::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| CutError::io(path, e))?;

    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b' ')
            .quote_style(quote_style)
            .from_writer(&mut tmp);
        fill(&mut writer).map_err(|e| CutError::io(path, e.into()))?;
        writer.flush().map_err(|e| CutError::io(path, e))?;
    }
    tmp.as_file().sync_all().map_err(|e| CutError::io(path, e))?;
    tmp.persist(path).map_err(|e| CutError::io(path, e.error))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Parse a bounds file written by [`save_bounds`] (or by hand).
///
/// Rows other than `lower` and `upper` are ignored. The header may carry a
/// label for the index column or leave it blank.
pub fn read_bounds(path: &Path) -> Result<Vec<SavedBounds>> {
    let text = fs::read_to_string(path).map_err(|e| CutError::io(path, e))?;
    let records = whitespace_records(&text).map_err(|e| CutError::parse(path, e.to_string()))?;

    let mut records = records.into_iter();
    let mut header = records
        .next()
        .ok_or_else(|| CutError::parse(path, "file is empty"))?;

    let mut lower: Option<Vec<String>> = None;
    let mut upper: Option<Vec<String>> = None;
    for row in records {
        let Some((label, values)) = row.split_first() else {
            continue;
        };
        let slot = match label.as_str() {
            LOWER_LABEL => &mut lower,
            UPPER_LABEL => &mut upper,
            other => {
                log::warn!("Ignoring row '{other}' in {}", path.display());
                continue;
            }
        };
        if slot.replace(values.to_vec()).is_some() {
            return Err(CutError::parse(path, format!("duplicate '{label}' row")));
        }
    }

    let lower = lower.ok_or_else(|| CutError::parse(path, "missing 'lower' row"))?;
    let upper = upper.ok_or_else(|| CutError::parse(path, "missing 'upper' row"))?;

    if header.len() == lower.len() + 1 {
        header.remove(0);
    }
    if header.len() != lower.len() || header.len() != upper.len() {
        return Err(CutError::parse(
            path,
            format!(
                "{} names but {} lower and {} upper values",
                header.len(),
                lower.len(),
                upper.len()
            ),
        ));
    }

    let mut saved: Vec<SavedBounds> = Vec::with_capacity(header.len());
    for ((name, lo), hi) in header.into_iter().zip(&lower).zip(&upper) {
        if saved.iter().any(|s| s.name == name) {
            return Err(CutError::parse(path, format!("'{name}' appears twice")));
        }
        saved.push(SavedBounds {
            lower: parse_bound(path, &name, lo)?,
            upper: parse_bound(path, &name, hi)?,
            name,
        });
    }
    Ok(saved)
}

fn parse_bound(path: &Path, name: &str, raw: &str) -> Result<f64> {
    raw.parse::<f64>()
        .map_err(|_| CutError::parse(path, format!("'{raw}' is not a number (column '{name}')")))
}

/// Split text on runs of spaces or tabs, honouring double quotes.
/// Lines holding only whitespace are dropped.
pub(crate) fn whitespace_records(text: &str) -> csv::Result<Vec<Vec<String>>> {
    let normalized = tabs_to_spaces_outside_quotes(text);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .flexible(true)
        .from_reader(normalized.as_bytes());

    let mut out = Vec::new();
    for record in reader.records() {
        let record = record?;
        let fields: Vec<String> = record
            .iter()
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
        // A lone `""` is a header with no names, not a blank line.
        if !fields.is_empty() || record.len() == 1 {
            out.push(fields);
        }
    }
    Ok(out)
}

/// Tabs separate fields like spaces do, except inside a quoted field.
fn tabs_to_spaces_outside_quotes(text: &str) -> String {
    let mut quoted = false;
    text.chars()
        .map(|c| match c {
            '"' => {
                quoted = !quoted;
                c
            }
            '\t' if !quoted => ' ',
            _ => c,
        })
        .collect()
}
