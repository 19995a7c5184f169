use std::path::PathBuf;

/// Default output location of the cut table.
pub const DEFAULT_TABLE_FILE: &str = "dataframe_cut.csv";
/// Default output location of the bounds file.
pub const DEFAULT_BOUNDS_FILE: &str = "cuts.csv";

/// Where the save action writes its two files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveLocations {
    pub table: PathBuf,
    pub bounds: PathBuf,
}

impl Default for SaveLocations {
    fn default() -> Self {
        Self {
            table: PathBuf::from(DEFAULT_TABLE_FILE),
            bounds: PathBuf::from(DEFAULT_BOUNDS_FILE),
        }
    }
}

/// Optional histograms of the primary axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistogramToggles {
    pub x: bool,
    pub y: bool,
}

/// Settings of a cut session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub save: SaveLocations,
    pub histograms: HistogramToggles,
    /// Close the session once a save succeeded.
    pub close_after_save: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            save: SaveLocations::default(),
            histograms: HistogramToggles::default(),
            close_after_save: true,
        }
    }
}

impl SessionConfig {
    pub fn with_save_locations(
        mut self,
        table: impl Into<PathBuf>,
        bounds: impl Into<PathBuf>,
    ) -> Self {
        self.save = SaveLocations {
            table: table.into(),
            bounds: bounds.into(),
        };
        self
    }

    pub fn with_histograms(mut self, x: bool, y: bool) -> Self {
        self.histograms = HistogramToggles { x, y };
        self
    }

    pub fn with_close_after_save(mut self, close: bool) -> Self {
        self.close_after_save = close;
        self
    }
}
