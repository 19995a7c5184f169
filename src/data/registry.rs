use std::path::Path;
use std::sync::Arc;

use super::table::{finite_range, Table};
use crate::control::Bound;
use crate::error::{CutError, Result};
use crate::persist::{self, SavedBounds};

/// Maximum number of dimensions that can be cut at the same time.
pub const MAX_DIMENSIONS: usize = 5;

// ---------------------------------------------------------------------------
// Dimension – one registered cut axis
// ---------------------------------------------------------------------------

/// A table column registered as a cut axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub name: String,
    /// Active lower bound.
    pub lower: f64,
    /// Active upper bound.
    pub upper: f64,
    /// Bounds at registration time; resets return here.
    pub default_lower: f64,
    pub default_upper: f64,
    /// Finite min/max of the column, the travel range of its controls.
    /// `None` when the column holds no finite value.
    pub travel: Option<(f64, f64)>,
}

impl Dimension {
    /// Bounds are the overrides when given and finite, else the column's
    /// finite min/max, else open.
    fn from_column(name: &str, values: &[f64], lower: Option<f64>, upper: Option<f64>) -> Self {
        let travel = finite_range(values.iter().copied());
        let lower = lower
            .filter(|v| v.is_finite())
            .or(travel.map(|(lo, _)| lo))
            .unwrap_or(f64::NEG_INFINITY);
        let upper = upper
            .filter(|v| v.is_finite())
            .or(travel.map(|(_, hi)| hi))
            .unwrap_or(f64::INFINITY);
        Dimension::with_bounds(name, values, lower, upper)
    }

    /// Bounds taken verbatim, as read back from a bounds file.
    fn with_bounds(name: &str, values: &[f64], lower: f64, upper: f64) -> Self {
        Dimension {
            name: name.to_string(),
            lower,
            upper,
            default_lower: lower,
            default_upper: upper,
            travel: finite_range(values.iter().copied()),
        }
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.lower, self.upper)
    }

    pub fn default_bounds(&self) -> (f64, f64) {
        (self.default_lower, self.default_upper)
    }

    fn set(&mut self, which: Bound, value: f64) {
        match which {
            Bound::Lower => self.lower = value,
            Bound::Upper => self.upper = value,
        }
    }

    fn reset(&mut self, which: Bound) {
        match which {
            Bound::Lower => self.lower = self.default_lower,
            Bound::Upper => self.upper = self.default_upper,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry – the table, its primary axes and the active cuts
// ---------------------------------------------------------------------------

/// Owns the shared table, the fixed X/Y axes and the ordered cut dimensions.
///
/// Dimension order is insertion order and decides which control slot and plot
/// a dimension gets. Every mutating operation is atomic: on error the
/// registry is left exactly as it was.
#[derive(Debug, Clone)]
pub struct Registry {
    table: Arc<Table>,
    x_name: String,
    y_name: String,
    rows: usize,
    dimensions: Vec<Dimension>,
}

impl Registry {
    /// Bind a registry to `table`, using `x_name` and `y_name` as plot axes.
    pub fn initialize(table: Arc<Table>, x_name: &str, y_name: &str) -> Result<Self> {
        let x = table
            .column(x_name)
            .ok_or_else(|| CutError::UnknownColumn(x_name.to_string()))?;
        let y = table
            .column(y_name)
            .ok_or_else(|| CutError::UnknownColumn(y_name.to_string()))?;

        if x.len() != y.len() {
            return Err(CutError::Shape {
                column: y_name.to_string(),
                expected: x.len(),
                actual: y.len(),
            });
        }
        let rows = x.len();

        log::info!("Registry over {rows} rows, axes {x_name} / {y_name}");
        Ok(Registry {
            table,
            x_name: x_name.to_string(),
            y_name: y_name.to_string(),
            rows,
            dimensions: Vec::new(),
        })
    }

    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    pub fn x_name(&self) -> &str {
        &self.x_name
    }

    pub fn y_name(&self) -> &str {
        &self.y_name
    }

    pub fn x(&self) -> &[f64] {
        self.table.column(&self.x_name).unwrap_or_default()
    }

    pub fn y(&self) -> &[f64] {
        self.table.column(&self.y_name).unwrap_or_default()
    }

    /// Row count N shared by the axes and every dimension.
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.table.column(name)
    }

    /// Register `name` as a cut dimension.
    ///
    /// Overrides are used when given and finite; otherwise the bound defaults
    /// to the column's finite min (or max).
    pub fn register_dimension(
        &mut self,
        name: &str,
        lower: Option<f64>,
        upper: Option<f64>,
    ) -> Result<&Dimension> {
        if self.is_full() {
            log::warn!("Cannot register '{name}': all {MAX_DIMENSIONS} slots in use");
            return Err(CutError::Capacity);
        }
        let table = Arc::clone(&self.table);
        let values = checked_column(&table, name, self.rows)?;
        if self.slot_of(name).is_some() {
            return Err(CutError::Duplicate(name.to_string()));
        }

        self.dimensions
            .push(Dimension::from_column(name, values, lower, upper));
        self.log_seats();
        Ok(&self.dimensions[self.dimensions.len() - 1])
    }

    /// Remove a dimension; the others keep their relative order.
    pub fn remove_dimension(&mut self, name: &str) -> Result<Dimension> {
        let slot = self
            .slot_of(name)
            .ok_or_else(|| CutError::NotFound(name.to_string()))?;
        let removed = self.dimensions.remove(slot);
        log::info!("Dimension '{name}' removed");
        self.log_seats();
        Ok(removed)
    }

    /// Registered dimension names in slot order.
    pub fn list_dimensions(&self) -> Vec<String> {
        self.dimensions.iter().map(|d| d.name.clone()).collect()
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.dimensions.iter().position(|d| d.name == name)
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.dimensions.len() >= MAX_DIMENSIONS
    }

    /// Move one bound of the dimension in `slot`. No ordering check is made:
    /// `lower > upper` simply cuts every row.
    pub fn set_bound(&mut self, slot: usize, which: Bound, value: f64) -> Result<()> {
        self.dimension_at_mut(slot)?.set(which, value);
        Ok(())
    }

    pub fn set_bounds(&mut self, name: &str, lower: f64, upper: f64) -> Result<()> {
        let dim = self
            .dimensions
            .iter_mut()
            .find(|d| d.name == name)
            .ok_or_else(|| CutError::NotFound(name.to_string()))?;
        dim.lower = lower;
        dim.upper = upper;
        Ok(())
    }

    /// Restore one bound of the dimension in `slot` to its registration value.
    pub fn reset_bound(&mut self, slot: usize, which: Bound) -> Result<()> {
        self.dimension_at_mut(slot)?.reset(which);
        Ok(())
    }

    pub fn reset_all(&mut self) {
        for dim in &mut self.dimensions {
            dim.reset(Bound::Lower);
            dim.reset(Bound::Upper);
        }
    }

    /// Drop every dimension, keeping the table and axes.
    pub fn clear(&mut self) {
        self.dimensions.clear();
        log::info!("All cut dimensions cleared");
    }

    /// Replace all dimensions with the ones stored in a bounds file.
    pub fn load_bounds_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let saved = persist::read_bounds(path)?;
        self.replace_dimensions(&saved)?;
        log::info!("Loaded cuts from {}", path.display());
        Ok(())
    }

    /// Replace all dimensions with `saved`, whose bounds become the new
    /// registration-time defaults. Validates everything before mutating.
    pub fn replace_dimensions(&mut self, saved: &[SavedBounds]) -> Result<()> {
        if saved.len() > MAX_DIMENSIONS {
            return Err(CutError::Capacity);
        }

        let table = Arc::clone(&self.table);
        let mut fresh: Vec<Dimension> = Vec::with_capacity(saved.len());
        for entry in saved {
            let values = checked_column(&table, &entry.name, self.rows)?;
            if fresh.iter().any(|d| d.name == entry.name) {
                return Err(CutError::Duplicate(entry.name.clone()));
            }
            fresh.push(Dimension::with_bounds(
                &entry.name,
                values,
                entry.lower,
                entry.upper,
            ));
        }

        if !self.dimensions.is_empty() {
            log::info!("Overwriting {} registered dimensions", self.dimensions.len());
        }
        self.dimensions = fresh;
        self.log_seats();
        Ok(())
    }

    fn dimension_at_mut(&mut self, slot: usize) -> Result<&mut Dimension> {
        self.dimensions
            .get_mut(slot)
            .ok_or_else(|| CutError::NotFound(format!("slot {slot}")))
    }

    fn log_seats(&self) {
        log::info!("Seats in use: {}/{MAX_DIMENSIONS}", self.dimensions.len());
    }
}

fn checked_column<'a>(table: &'a Table, name: &str, rows: usize) -> Result<&'a [f64]> {
    let values = table
        .column(name)
        .ok_or_else(|| CutError::UnknownColumn(name.to_string()))?;
    if values.len() != rows {
        return Err(CutError::Shape {
            column: name.to_string(),
            expected: rows,
            actual: values.len(),
        });
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Registry {
        let table = Table::new(vec![
            ("x", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            ("y", vec![5.0, 4.0, 3.0, 2.0, 1.0]),
            ("a", vec![10.0, 20.0, 30.0, 40.0, 50.0]),
            ("b", vec![f64::NAN, 2.0, f64::INFINITY, -3.0, 1.0]),
            ("c", vec![0.0; 5]),
            ("d", vec![1.0; 5]),
            ("e", vec![2.0; 5]),
            ("short", vec![1.0, 2.0]),
            ("empty", vec![f64::NAN; 5]),
        ])
        .unwrap();
        Registry::initialize(Arc::new(table), "x", "y").unwrap()
    }

    #[test]
    fn initialize_checks_axes() {
        let table = Arc::new(
            Table::new(vec![("x", vec![1.0, 2.0]), ("y", vec![1.0])]).unwrap(),
        );
        assert!(matches!(
            Registry::initialize(Arc::clone(&table), "x", "y"),
            Err(CutError::Shape { expected: 2, actual: 1, .. })
        ));
        assert!(matches!(
            Registry::initialize(table, "x", "z"),
            Err(CutError::UnknownColumn(name)) if name == "z"
        ));
    }

    #[test]
    fn default_bounds_ignore_non_finite_values() {
        let mut reg = sample();
        let dim = reg.register_dimension("b", None, None).unwrap();
        assert_eq!(dim.bounds(), (-3.0, 2.0));
        assert_eq!(dim.travel, Some((-3.0, 2.0)));
    }

    #[test]
    fn finite_overrides_win_and_non_finite_fall_back() {
        let mut reg = sample();
        let dim = reg
            .register_dimension("a", Some(15.0), Some(f64::INFINITY))
            .unwrap();
        assert_eq!(dim.bounds(), (15.0, 50.0));
        assert_eq!(dim.travel, Some((10.0, 50.0)));
    }

    #[test]
    fn all_nan_column_gets_open_bounds() {
        let mut reg = sample();
        let dim = reg.register_dimension("empty", None, None).unwrap();
        assert_eq!(dim.bounds(), (f64::NEG_INFINITY, f64::INFINITY));
        assert_eq!(dim.travel, None);
    }

    #[test]
    fn sixth_registration_hits_capacity() {
        let mut reg = sample();
        for name in ["a", "b", "c", "d", "e"] {
            reg.register_dimension(name, None, None).unwrap();
        }
        let before = reg.dimensions().to_vec();
        assert!(matches!(
            reg.register_dimension("x", None, None),
            Err(CutError::Capacity)
        ));
        assert_eq!(reg.dimensions(), before.as_slice());
        assert_eq!(reg.list_dimensions(), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn rejected_registrations_leave_registry_unchanged() {
        let mut reg = sample();
        reg.register_dimension("a", None, None).unwrap();
        assert!(matches!(
            reg.register_dimension("nope", None, None),
            Err(CutError::UnknownColumn(_))
        ));
        assert!(matches!(
            reg.register_dimension("short", None, None),
            Err(CutError::Shape { expected: 5, actual: 2, .. })
        ));
        assert!(matches!(
            reg.register_dimension("a", None, None),
            Err(CutError::Duplicate(_))
        ));
        assert_eq!(reg.list_dimensions(), vec!["a"]);
    }

    #[test]
    fn remove_keeps_relative_order() {
        let mut reg = sample();
        for name in ["a", "b", "c"] {
            reg.register_dimension(name, None, None).unwrap();
        }
        reg.remove_dimension("b").unwrap();
        assert_eq!(reg.list_dimensions(), vec!["a", "c"]);
        assert_eq!(reg.slot_of("c"), Some(1));
        assert!(matches!(
            reg.remove_dimension("b"),
            Err(CutError::NotFound(_))
        ));
    }

    #[test]
    fn re_registering_does_not_resurrect_bounds() {
        let mut reg = sample();
        reg.register_dimension("a", None, None).unwrap();
        reg.set_bounds("a", 20.0, 30.0).unwrap();
        reg.remove_dimension("a").unwrap();
        reg.register_dimension("c", None, None).unwrap();
        let a = reg.register_dimension("a", None, None).unwrap();
        assert_eq!(a.bounds(), (10.0, 50.0));
        assert_eq!(reg.list_dimensions(), vec!["c", "a"]);
    }

    #[test]
    fn resets_restore_registration_bounds() {
        let mut reg = sample();
        reg.register_dimension("a", Some(15.0), None).unwrap();
        reg.set_bound(0, Bound::Lower, 30.0).unwrap();
        reg.set_bound(0, Bound::Upper, 35.0).unwrap();

        reg.reset_bound(0, Bound::Lower).unwrap();
        assert_eq!(reg.dimensions()[0].bounds(), (15.0, 35.0));

        reg.set_bound(0, Bound::Lower, 40.0).unwrap();
        reg.reset_all();
        assert_eq!(reg.dimensions()[0].bounds(), (15.0, 50.0));

        assert!(matches!(
            reg.set_bound(3, Bound::Lower, 0.0),
            Err(CutError::NotFound(_))
        ));
    }

    #[test]
    fn replace_dimensions_is_all_or_nothing() {
        let mut reg = sample();
        reg.register_dimension("c", None, None).unwrap();

        let bad = vec![
            SavedBounds::new("a", 20.0, 40.0),
            SavedBounds::new("missing", 0.0, 1.0),
        ];
        assert!(matches!(
            reg.replace_dimensions(&bad),
            Err(CutError::UnknownColumn(name)) if name == "missing"
        ));
        assert_eq!(reg.list_dimensions(), vec!["c"]);

        let good = vec![SavedBounds::new("a", 20.0, 40.0)];
        reg.replace_dimensions(&good).unwrap();
        assert_eq!(reg.list_dimensions(), vec!["a"]);
        assert_eq!(reg.dimensions()[0].default_bounds(), (20.0, 40.0));
    }

    #[test]
    fn open_bounds_survive_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cuts.csv");
        let mut reg = sample();
        reg.register_dimension("a", None, None).unwrap();
        reg.set_bound(0, Bound::Lower, f64::NEG_INFINITY).unwrap();
        reg.set_bound(0, Bound::Upper, 20.0).unwrap();
        persist::save_bounds(&reg, &path).unwrap();

        let mut fresh = sample();
        fresh.load_bounds_from_file(&path).unwrap();
        let a = fresh.dimension("a").unwrap();
        assert_eq!(a.bounds(), (f64::NEG_INFINITY, 20.0));
        assert_eq!(a.default_bounds(), (f64::NEG_INFINITY, 20.0));
        assert_eq!(a.travel, Some((10.0, 50.0)));
    }

    #[test]
    fn replace_dimensions_refuses_more_than_capacity() {
        let mut reg = sample();
        reg.register_dimension("a", None, None).unwrap();
        let before = reg.dimensions().to_vec();

        let six: Vec<SavedBounds> = ["a", "b", "c", "d", "e", "x"]
            .iter()
            .map(|name| SavedBounds::new(*name, 0.0, 1.0))
            .collect();
        assert!(matches!(reg.replace_dimensions(&six), Err(CutError::Capacity)));
        assert_eq!(reg.dimensions(), before.as_slice());
    }

    #[test]
    fn bounds_file_with_short_column_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cuts.csv");
        std::fs::write(&path, " a short\nlower 10 1\nupper 50 2\n").unwrap();

        let mut reg = sample();
        reg.register_dimension("c", None, None).unwrap();
        let before = reg.dimensions().to_vec();
        assert!(matches!(
            reg.load_bounds_from_file(&path),
            Err(CutError::Shape { expected: 5, actual: 2, .. })
        ));
        assert_eq!(reg.dimensions(), before.as_slice());
    }

    #[test]
    fn clear_drops_dimensions_and_keeps_axes() {
        let mut reg = sample();
        reg.register_dimension("a", None, None).unwrap();
        reg.register_dimension("b", None, None).unwrap();
        reg.clear();
        assert!(reg.is_empty());
        assert_eq!((reg.x_name(), reg.y_name()), ("x", "y"));
        assert_eq!(reg.num_rows(), 5);
        reg.register_dimension("a", None, None).unwrap();
        assert_eq!(reg.list_dimensions(), vec!["a"]);
    }
}
