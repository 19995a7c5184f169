use super::registry::{Dimension, Registry};

// ---------------------------------------------------------------------------
// FilteredView – rows surviving every cut
// ---------------------------------------------------------------------------

/// Ordered indices of the rows that pass every active cut.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredView {
    rows: Vec<usize>,
    total: usize,
}

impl FilteredView {
    /// A view over every row of an `n`-row table.
    pub fn all(n: usize) -> Self {
        FilteredView {
            rows: (0..n).collect(),
            total: n,
        }
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Number of surviving rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row count of the unfiltered table.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Gather `column` at the surviving rows.
    pub fn gather(&self, column: &[f64]) -> Vec<f64> {
        self.rows
            .iter()
            .map(|&i| column.get(i).copied().unwrap_or(f64::NAN))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Return the rows whose value lies within `[lower, upper]` for every
/// registered dimension.
///
/// * No dimensions registered → every row
/// * NaN in any cut column → row excluded
/// * `lower > upper` on any dimension → no rows
pub fn filtered_indices(registry: &Registry) -> FilteredView {
    filter_rows(registry, Dimension::bounds)
}

/// Rows passing the cuts at their registration-time bounds.
pub fn initial_indices(registry: &Registry) -> FilteredView {
    filter_rows(registry, Dimension::default_bounds)
}

fn filter_rows(registry: &Registry, bounds: impl Fn(&Dimension) -> (f64, f64)) -> FilteredView {
    let n = registry.num_rows();
    let cuts: Vec<(&[f64], f64, f64)> = registry
        .dimensions()
        .iter()
        .filter_map(|d| {
            let (lo, hi) = bounds(d);
            registry.column(&d.name).map(|col| (col, lo, hi))
        })
        .collect();

    let rows = (0..n)
        .filter(|&i| {
            cuts.iter()
                .all(|&(col, lo, hi)| col.get(i).is_some_and(|&v| lo <= v && v <= hi))
        })
        .collect();

    FilteredView { rows, total: n }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use proptest::prelude::*;

    use super::*;
    use crate::control::Bound;
    use crate::data::table::Table;

    fn registry(columns: Vec<(&str, Vec<f64>)>) -> Registry {
        let table = Table::new(columns).unwrap();
        Registry::initialize(Arc::new(table), "x", "y").unwrap()
    }

    #[test]
    fn no_dimensions_keeps_every_row() {
        let reg = registry(vec![("x", vec![1.0, 2.0, 3.0]), ("y", vec![0.0; 3])]);
        assert_eq!(filtered_indices(&reg), FilteredView::all(3));
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let mut reg = registry(vec![
            ("x", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            ("y", vec![5.0, 4.0, 3.0, 2.0, 1.0]),
            ("a", vec![10.0, 20.0, 30.0, 40.0, 50.0]),
        ]);
        reg.register_dimension("a", None, None).unwrap();
        reg.set_bounds("a", 20.0, 40.0).unwrap();

        let view = filtered_indices(&reg);
        assert_eq!(view.rows(), &[1, 2, 3]);
        assert_eq!(view.total(), 5);
        assert_eq!(view.gather(reg.x()), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn nan_rows_never_pass() {
        let mut reg = registry(vec![
            ("x", vec![0.0; 4]),
            ("y", vec![0.0; 4]),
            ("a", vec![1.0, f64::NAN, 3.0, 4.0]),
        ]);
        reg.register_dimension("a", None, None).unwrap();
        assert_eq!(filtered_indices(&reg).rows(), &[0, 2, 3]);
    }

    #[test]
    fn inverted_bounds_give_empty_view() {
        let mut reg = registry(vec![
            ("x", vec![0.0; 3]),
            ("y", vec![0.0; 3]),
            ("a", vec![1.0, 2.0, 3.0]),
        ]);
        reg.register_dimension("a", None, None).unwrap();
        reg.set_bound(0, Bound::Lower, 3.0).unwrap();
        reg.set_bound(0, Bound::Upper, 1.0).unwrap();

        let view = filtered_indices(&reg);
        assert!(view.is_empty());
        assert_eq!(view.total(), 3);
    }

    #[test]
    fn cuts_combine_conjunctively() {
        let mut reg = registry(vec![
            ("x", vec![0.0; 4]),
            ("y", vec![0.0; 4]),
            ("a", vec![1.0, 2.0, 3.0, 4.0]),
            ("b", vec![4.0, 3.0, 2.0, 1.0]),
        ]);
        reg.register_dimension("a", Some(2.0), None).unwrap();
        reg.register_dimension("b", Some(2.0), None).unwrap();
        assert_eq!(filtered_indices(&reg).rows(), &[1, 2]);
    }

    #[test]
    fn initial_indices_use_registration_bounds() {
        let mut reg = registry(vec![
            ("x", vec![0.0; 4]),
            ("y", vec![0.0; 4]),
            ("a", vec![1.0, 2.0, 3.0, 4.0]),
        ]);
        reg.register_dimension("a", Some(2.0), None).unwrap();
        reg.set_bounds("a", 4.0, 4.0).unwrap();
        assert_eq!(filtered_indices(&reg).rows(), &[3]);
        assert_eq!(initial_indices(&reg).rows(), &[1, 2, 3]);
    }

    fn cell() -> impl Strategy<Value = f64> {
        prop_oneof![
            8 => -100.0f64..100.0,
            1 => Just(f64::NAN),
        ]
    }

    proptest! {
        #[test]
        fn surviving_rows_respect_every_cut(
            a in prop::collection::vec(cell(), 1..60),
            b_seed in prop::collection::vec(cell(), 60),
            cut_a in (-120.0f64..120.0, -120.0f64..120.0),
            cut_b in (-120.0f64..120.0, -120.0f64..120.0),
        ) {
            let n = a.len();
            let b = b_seed[..n].to_vec();
            let mut reg = registry(vec![
                ("x", vec![0.0; n]),
                ("y", vec![0.0; n]),
                ("a", a.clone()),
                ("b", b.clone()),
            ]);
            reg.register_dimension("a", None, None).unwrap();
            reg.register_dimension("b", None, None).unwrap();
            reg.set_bounds("a", cut_a.0, cut_a.1).unwrap();
            reg.set_bounds("b", cut_b.0, cut_b.1).unwrap();

            let view = filtered_indices(&reg);
            for &i in view.rows() {
                prop_assert!(!a[i].is_nan() && !b[i].is_nan());
                prop_assert!(cut_a.0 <= a[i] && a[i] <= cut_a.1);
                prop_assert!(cut_b.0 <= b[i] && b[i] <= cut_b.1);
            }
            let expected = (0..n)
                .filter(|&i| {
                    cut_a.0 <= a[i] && a[i] <= cut_a.1 && cut_b.0 <= b[i] && b[i] <= cut_b.1
                })
                .count();
            prop_assert_eq!(view.len(), expected);
        }
    }
}
