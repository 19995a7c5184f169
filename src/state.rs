use std::path::Path;
use std::sync::Arc;

use eframe::egui;
use rusty_barber::config::{DEFAULT_BOUNDS_FILE, DEFAULT_TABLE_FILE};
use rusty_barber::data::loader;
use rusty_barber::persist::SavedBounds;
use rusty_barber::{
    ControlEvent, CutError, CutSession, HistogramToggles, Outcome, Registry, Renderer,
    SessionConfig, Table, ViewFrame,
};

// ---------------------------------------------------------------------------
// Renderer hooked into egui
// ---------------------------------------------------------------------------

/// Repaints the window on every redraw and closes it with the session.
struct EguiRenderer {
    ctx: egui::Context,
}

impl Renderer for EguiRenderer {
    fn redraw(&mut self, _frame: &ViewFrame) {
        self.ctx.request_repaint();
    }

    fn close(&mut self) {
        self.ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    ctx: egui::Context,

    /// Loaded table (None until the user opens a file).
    pub table: Option<Arc<Table>>,

    /// Primary plot axes.
    pub x_column: String,
    pub y_column: String,

    pub histograms: HistogramToggles,

    /// Column picked in the "add dimension" selector.
    pub candidate: String,

    /// Editable save locations, applied before each save.
    pub table_path: String,
    pub bounds_path: String,
    pub close_after_save: bool,

    /// Active cut session; exists whenever a table with valid axes is loaded.
    pub session: Option<CutSession>,

    /// Control events collected while drawing the current frame.
    pub pending: Vec<ControlEvent>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            ctx,
            table: None,
            x_column: String::new(),
            y_column: String::new(),
            histograms: HistogramToggles::default(),
            candidate: String::new(),
            table_path: DEFAULT_TABLE_FILE.to_string(),
            bounds_path: DEFAULT_BOUNDS_FILE.to_string(),
            close_after_save: true,
            session: None,
            pending: Vec::new(),
            status_message: None,
        }
    }

    /// Load a table from disk and start a fresh session on it.
    pub fn open_table(&mut self, path: &Path) {
        match loader::load_file(path) {
            Ok(table) => self.set_table(table),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded table; the first two columns become X and Y.
    pub fn set_table(&mut self, table: Table) {
        let names = table.column_names();
        self.x_column = names.first().cloned().unwrap_or_default();
        self.y_column = names.get(1).or(names.first()).cloned().unwrap_or_default();
        self.candidate = names.get(2).or(names.first()).cloned().unwrap_or_default();
        self.table = Some(Arc::new(table));
        self.session = None;
        self.status_message = None;
        self.restart_session();
    }

    /// Rebuild the session after an axis or histogram change, carrying the
    /// registered dimensions and their bounds over.
    pub fn restart_session(&mut self) {
        let Some(table) = self.table.clone() else {
            return;
        };
        let carried = self
            .session
            .take()
            .map(|s| s.registry().dimensions().to_vec())
            .unwrap_or_default();

        // Carried dimensions keep their reset targets and active bounds.
        let defaults: Vec<SavedBounds> = carried
            .iter()
            .map(|d| SavedBounds::new(&d.name, d.default_lower, d.default_upper))
            .collect();
        let result =
            Registry::initialize(table, &self.x_column, &self.y_column).and_then(|mut reg| {
                reg.replace_dimensions(&defaults)?;
                for dim in &carried {
                    reg.set_bounds(&dim.name, dim.lower, dim.upper)?;
                }
                Ok(reg)
            });

        match result {
            Ok(registry) => {
                let mut session = CutSession::new(registry, self.session_config());
                session.add_renderer(Box::new(EguiRenderer {
                    ctx: self.ctx.clone(),
                }));
                self.session = Some(session);
            }
            Err(e) => self.report(e),
        }
    }

    pub fn add_dimension(&mut self, name: &str) {
        if let Some(session) = &mut self.session {
            if let Err(e) = session.register_dimension(name, None, None) {
                self.report(e);
            }
        }
    }

    pub fn remove_dimension(&mut self, name: &str) {
        if let Some(session) = &mut self.session {
            if let Err(e) = session.remove_dimension(name) {
                self.report(e);
            }
        }
    }

    pub fn load_bounds(&mut self, path: &Path) {
        if let Some(session) = &mut self.session {
            match session.load_bounds_from_file(path) {
                Ok(()) => self.status_message = None,
                Err(e) => self.report(e),
            }
        }
    }

    /// Run every control event collected this frame through the session.
    pub fn dispatch_pending(&mut self) {
        let events = std::mem::take(&mut self.pending);
        let config = self.session_config();
        let Some(session) = &mut self.session else {
            return;
        };

        for event in events {
            if event == ControlEvent::Save {
                session.config_mut().save = config.save.clone();
                session.config_mut().close_after_save = config.close_after_save;
            }
            match session.handle(event) {
                Ok(Outcome::Saved { table, bounds }) => {
                    self.status_message = Some(format!(
                        "Saved {} and {}",
                        table.display(),
                        bounds.display()
                    ));
                }
                Ok(_) => {}
                Err(e) => {
                    log::error!("{e}");
                    self.status_message = Some(format!("Error: {e}"));
                }
            }
        }
    }

    fn session_config(&self) -> SessionConfig {
        SessionConfig::default()
            .with_save_locations(self.table_path.trim(), self.bounds_path.trim())
            .with_histograms(self.histograms.x, self.histograms.y)
            .with_close_after_save(self.close_after_save)
    }

    fn report(&mut self, e: CutError) {
        log::error!("{e}");
        self.status_message = Some(format!("Error: {e}"));
    }
}
