use std::path::Path;

use crate::config::SessionConfig;
use crate::control::{slider_specs, ControlEvent, Outcome, SliderSpec};
use crate::data::filter::{filtered_indices, FilteredView};
use crate::data::registry::Registry;
use crate::error::Result;
use crate::persist;
use crate::sync::{Renderer, ViewFrame, ViewSynchronizer};

// ---------------------------------------------------------------------------
// CutSession – one interactive cutting session
// ---------------------------------------------------------------------------

/// Owns the registry, the current filtered view and the view synchronizer.
///
/// Every event runs the whole chain (recompute filter → derive plot data →
/// notify renderers) before returning, so the view is never stale between
/// events.
pub struct CutSession {
    registry: Registry,
    view: FilteredView,
    sync: ViewSynchronizer,
    config: SessionConfig,
    closed: bool,
}

impl CutSession {
    pub fn new(registry: Registry, config: SessionConfig) -> Self {
        let view = filtered_indices(&registry);
        let mut sync = ViewSynchronizer::new(config.histograms);
        sync.rebuild(&registry, &view);
        log::info!(
            "Session opened: {} of {} rows pass {} cuts",
            view.len(),
            view.total(),
            registry.len()
        );
        Self {
            registry,
            view,
            sync,
            config,
            closed: false,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn view(&self) -> &FilteredView {
        &self.view
    }

    pub fn frame(&self) -> &ViewFrame {
        self.sync.frame()
    }

    /// Save locations may be changed here before a save.
    pub fn config_mut(&mut self) -> &mut SessionConfig {
        &mut self.config
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Layout of the range controls, one pair per dimension.
    pub fn controls(&self) -> Vec<SliderSpec> {
        slider_specs(&self.registry)
    }

    pub fn add_renderer(&mut self, renderer: Box<dyn Renderer>) {
        self.sync.add_renderer(renderer);
    }

    /// Process one control event to completion.
    pub fn handle(&mut self, event: ControlEvent) -> Result<Outcome> {
        if self.closed {
            log::debug!("Ignoring {event:?}: session closed");
            return Ok(Outcome::Ignored);
        }

        match event {
            ControlEvent::SetBound { slot, bound, value } => {
                self.registry.set_bound(slot, bound, value)?;
                Ok(self.refresh())
            }
            ControlEvent::ResetBound { slot, bound } => {
                self.registry.reset_bound(slot, bound)?;
                Ok(self.refresh())
            }
            ControlEvent::ResetAll => {
                self.registry.reset_all();
                Ok(self.refresh())
            }
            ControlEvent::Save => self.save(),
            ControlEvent::Close => {
                self.close();
                Ok(Outcome::Closed)
            }
        }
    }

    pub fn register_dimension(
        &mut self,
        name: &str,
        lower: Option<f64>,
        upper: Option<f64>,
    ) -> Result<()> {
        self.registry.register_dimension(name, lower, upper)?;
        self.rebuild();
        Ok(())
    }

    pub fn remove_dimension(&mut self, name: &str) -> Result<()> {
        self.registry.remove_dimension(name)?;
        self.rebuild();
        Ok(())
    }

    /// Replace every dimension with the cuts stored at `path`.
    pub fn load_bounds_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.registry.load_bounds_from_file(path)?;
        self.rebuild();
        Ok(())
    }

    /// Write the filtered table and the bounds to the configured locations.
    pub fn save(&mut self) -> Result<Outcome> {
        let save = self.config.save.clone();
        persist::save_filtered_table(self.registry.table(), &self.view, &save.table)?;
        persist::save_bounds(&self.registry, &save.bounds)?;
        if self.config.close_after_save {
            self.close();
        }
        Ok(Outcome::Saved {
            table: save.table,
            bounds: save.bounds,
        })
    }

    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.sync.close();
            log::info!("Session closed");
        }
    }

    /// End the session and hand back the registry.
    pub fn into_registry(mut self) -> Registry {
        self.close();
        self.registry
    }

    fn refresh(&mut self) -> Outcome {
        self.view = filtered_indices(&self.registry);
        self.sync.update(&self.registry, &self.view);
        self.sync.notify();
        log::debug!("{} of {} rows visible", self.view.len(), self.view.total());
        Outcome::Redrawn {
            visible: self.view.len(),
        }
    }

    fn rebuild(&mut self) {
        self.view = filtered_indices(&self.registry);
        self.sync.rebuild(&self.registry, &self.view);
        self.sync.notify();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    use super::*;
    use crate::control::Bound;
    use crate::data::table::Table;
    use crate::error::CutError;

    fn session(config: SessionConfig) -> CutSession {
        let table = Table::new(vec![
            ("x", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            ("y", vec![5.0, 4.0, 3.0, 2.0, 1.0]),
            ("a", vec![10.0, 20.0, 30.0, 40.0, 50.0]),
            ("b", vec![0.5, 0.4, 0.3, 0.2, 0.1]),
        ])
        .unwrap();
        let mut reg = Registry::initialize(Arc::new(table), "x", "y").unwrap();
        reg.register_dimension("a", None, None).unwrap();
        CutSession::new(reg, config)
    }

    #[derive(Default)]
    struct Log {
        redraws: Vec<usize>,
        closed: bool,
    }

    struct Watcher(Rc<RefCell<Log>>);

    impl Renderer for Watcher {
        fn redraw(&mut self, frame: &ViewFrame) {
            self.0.borrow_mut().redraws.push(frame.visible);
        }

        fn close(&mut self) {
            self.0.borrow_mut().closed = true;
        }
    }

    #[test]
    fn bound_events_run_the_whole_chain() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut s = session(SessionConfig::default());
        s.add_renderer(Box::new(Watcher(Rc::clone(&log))));

        let outcome = s
            .handle(ControlEvent::SetBound {
                slot: 0,
                bound: Bound::Lower,
                value: 20.0,
            })
            .unwrap();
        assert_eq!(outcome, Outcome::Redrawn { visible: 4 });
        s.handle(ControlEvent::SetBound {
            slot: 0,
            bound: Bound::Upper,
            value: 40.0,
        })
        .unwrap();

        assert_eq!(s.view().rows(), &[1, 2, 3]);
        assert_eq!(s.frame().scatter[0].colors, vec![20.0, 30.0, 40.0]);
        assert_eq!(log.borrow().redraws, vec![4, 3]);

        s.handle(ControlEvent::ResetBound {
            slot: 0,
            bound: Bound::Lower,
        })
        .unwrap();
        assert_eq!(s.view().rows(), &[0, 1, 2, 3]);

        s.handle(ControlEvent::ResetAll).unwrap();
        assert_eq!(s.view().len(), 5);
    }

    #[test]
    fn unknown_slot_is_reported_and_nothing_changes() {
        let mut s = session(SessionConfig::default());
        let result = s.handle(ControlEvent::SetBound {
            slot: 3,
            bound: Bound::Lower,
            value: 0.0,
        });
        assert!(matches!(result, Err(CutError::NotFound(_))));
        assert_eq!(s.view().len(), 5);
    }

    #[test]
    fn dimension_changes_rebuild_the_view() {
        let mut s = session(SessionConfig::default().with_histograms(true, false));
        s.register_dimension("b", Some(0.2), None).unwrap();
        assert_eq!(s.view().rows(), &[0, 1, 2, 3]);
        assert_eq!(s.frame().scatter.len(), 2);
        assert_eq!(s.controls()[1].name, "b");

        s.remove_dimension("a").unwrap();
        assert_eq!(s.frame().scatter.len(), 1);
        assert_eq!(s.frame().histograms[0].initial.total(), 4);
    }

    #[test]
    fn save_writes_both_files_and_closes() {
        let dir = tempfile::tempdir().unwrap();
        let table_path = dir.path().join("out.csv");
        let bounds_path = dir.path().join("bounds.csv");
        let log = Rc::new(RefCell::new(Log::default()));

        let mut s =
            session(SessionConfig::default().with_save_locations(&table_path, &bounds_path));
        s.add_renderer(Box::new(Watcher(Rc::clone(&log))));

        let outcome = s.handle(ControlEvent::Save).unwrap();
        assert_eq!(
            outcome,
            Outcome::Saved {
                table: table_path.clone(),
                bounds: bounds_path.clone(),
            }
        );
        assert!(table_path.exists() && bounds_path.exists());
        assert!(s.is_closed());
        assert!(log.borrow().closed);
        assert_eq!(s.handle(ControlEvent::ResetAll).unwrap(), Outcome::Ignored);
    }

    #[test]
    fn save_can_keep_session_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(
            SessionConfig::default()
                .with_save_locations(dir.path().join("t.csv"), dir.path().join("b.csv"))
                .with_close_after_save(false),
        );
        s.handle(ControlEvent::Save).unwrap();
        assert!(!s.is_closed());
        assert_eq!(s.handle(ControlEvent::Close).unwrap(), Outcome::Closed);
        assert!(s.is_closed());
    }

    #[test]
    fn failed_load_keeps_previous_cuts() {
        let mut s = session(SessionConfig::default());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cuts.csv");
        std::fs::write(&path, " zz\nlower 1\nupper 2\n").unwrap();

        let result = s.load_bounds_from_file(&path);
        assert!(matches!(result, Err(CutError::UnknownColumn(_))));
        assert_eq!(s.registry().list_dimensions(), vec!["a"]);
    }

    #[test]
    fn into_registry_closes_and_hands_back_the_cuts() {
        let log = Rc::new(RefCell::new(Log::default()));
        let mut s = session(SessionConfig::default());
        s.add_renderer(Box::new(Watcher(Rc::clone(&log))));
        s.handle(ControlEvent::SetBound {
            slot: 0,
            bound: Bound::Upper,
            value: 30.0,
        })
        .unwrap();

        let reg = s.into_registry();
        assert!(log.borrow().closed);
        assert_eq!(reg.list_dimensions(), vec!["a"]);
        assert_eq!(reg.dimension("a").unwrap().bounds(), (10.0, 30.0));
    }
}
