use std::collections::BTreeSet;

use crate::error::{CutError, Result};

// ---------------------------------------------------------------------------
// Column – one named numeric series
// ---------------------------------------------------------------------------

/// A named column of floats. Missing values are stored as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Table – ordered columns, positionally aligned rows
// ---------------------------------------------------------------------------

/// The source dataset: ordered, uniquely named numeric columns.
///
/// Row alignment across columns is positional. Column lengths are checked by
/// the [`Registry`](super::registry::Registry) when a column is put to use,
/// so a mismatch is reported against the column that caused it.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table from `(name, values)` pairs, keeping their order.
    pub fn new<N: Into<String>>(columns: Vec<(N, Vec<f64>)>) -> Result<Self> {
        if columns.is_empty() {
            return Err(CutError::Schema {
                message: "a table needs at least one column".into(),
            });
        }

        let mut seen = BTreeSet::new();
        let mut out = Vec::with_capacity(columns.len());
        for (name, values) in columns {
            let name: String = name.into();
            if name.trim().is_empty() {
                return Err(CutError::Schema {
                    message: "column names must not be blank".into(),
                });
            }
            if !seen.insert(name.clone()) {
                return Err(CutError::Schema {
                    message: format!("column '{name}' appears more than once"),
                });
            }
            out.push(Column { name, values });
        }

        Ok(Table { columns: out })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Number of rows of the longest column.
    pub fn num_rows(&self) -> usize {
        self.columns.iter().map(|c| c.values.len()).max().unwrap_or(0)
    }

    /// Value at `row` of column `index`, NaN past the end of a short column.
    pub fn value(&self, index: usize, row: usize) -> f64 {
        self.columns
            .get(index)
            .and_then(|c| c.values.get(row))
            .copied()
            .unwrap_or(f64::NAN)
    }
}

/// Minimum and maximum over the finite values, ignoring NaN and ±∞.
pub fn finite_range<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
