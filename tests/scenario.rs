use std::fs;
use std::sync::Arc;

use rusty_barber::data::loader::load_file;
use rusty_barber::{
    Bound, ControlEvent, CutError, CutSession, Outcome, Registry, SessionConfig, Table,
};

fn sample_table() -> Arc<Table> {
    Arc::new(
        Table::new(vec![
            ("x", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            ("y", vec![5.0, 4.0, 3.0, 2.0, 1.0]),
            ("a", vec![10.0, 20.0, 30.0, 40.0, 50.0]),
        ])
        .unwrap(),
    )
}

#[test]
fn cut_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let table_path = dir.path().join("dataframe_cut.csv");
    let bounds_path = dir.path().join("cuts.csv");

    let mut registry = Registry::initialize(sample_table(), "x", "y").unwrap();
    registry.register_dimension("a", None, None).unwrap();
    assert_eq!(registry.dimension("a").unwrap().bounds(), (10.0, 50.0));

    let config = SessionConfig::default().with_save_locations(&table_path, &bounds_path);
    let mut session = CutSession::new(registry, config);

    session
        .handle(ControlEvent::SetBound {
            slot: 0,
            bound: Bound::Lower,
            value: 20.0,
        })
        .unwrap();
    let outcome = session
        .handle(ControlEvent::SetBound {
            slot: 0,
            bound: Bound::Upper,
            value: 40.0,
        })
        .unwrap();
    assert_eq!(outcome, Outcome::Redrawn { visible: 3 });
    assert_eq!(session.view().rows(), &[1, 2, 3]);

    session.handle(ControlEvent::Save).unwrap();
    assert!(session.is_closed());

    let bounds_text = fs::read_to_string(&bounds_path).unwrap();
    assert!(bounds_text.contains("lower 20"));
    assert!(bounds_text.contains("upper 40"));

    // The exported table loads back with the filtered rows only.
    let cut = load_file(&table_path).unwrap();
    assert_eq!(cut.column_names(), vec!["x", "y", "a"]);
    assert_eq!(cut.column("a"), Some(&[20.0, 30.0, 40.0][..]));

    let mut fresh = Registry::initialize(sample_table(), "x", "y").unwrap();
    fresh.load_bounds_from_file(&bounds_path).unwrap();
    assert_eq!(fresh.list_dimensions(), vec!["a"]);
    assert_eq!(fresh.dimension("a").unwrap().bounds(), (20.0, 40.0));
}

#[test]
fn sixth_dimension_is_refused() {
    let columns: Vec<(String, Vec<f64>)> = (0..8)
        .map(|i| (format!("c{i}"), vec![i as f64, i as f64 + 1.0]))
        .collect();
    let table = Arc::new(Table::new(columns).unwrap());
    let mut registry = Registry::initialize(table, "c0", "c1").unwrap();

    for i in 2..7 {
        registry.register_dimension(&format!("c{i}"), None, None).unwrap();
    }
    let result = registry.register_dimension("c7", None, None);
    assert!(matches!(result, Err(CutError::Capacity)));
    assert_eq!(registry.len(), 5);
}

#[test]
fn closed_session_ignores_events() {
    let mut registry = Registry::initialize(sample_table(), "x", "y").unwrap();
    registry.register_dimension("a", None, None).unwrap();
    let mut session = CutSession::new(registry, SessionConfig::default());

    assert_eq!(session.handle(ControlEvent::Close).unwrap(), Outcome::Closed);
    let outcome = session
        .handle(ControlEvent::SetBound {
            slot: 0,
            bound: Bound::Lower,
            value: 30.0,
        })
        .unwrap();
    assert_eq!(outcome, Outcome::Ignored);
    assert_eq!(session.view().len(), 5);
}
