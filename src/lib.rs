//! Interactive range cuts over tabular data.
//!
//! The library holds the toolkit-free core: the table and dimension registry,
//! the filter engine, the view synchronizer and the persistence adapter. The
//! `rusty-barber` binary wires it to an egui front end.

pub mod color;
pub mod config;
pub mod control;
pub mod data;
pub mod error;
pub mod persist;
pub mod session;
pub mod sync;

pub use config::{HistogramToggles, SaveLocations, SessionConfig};
pub use control::{Bound, ControlEvent, Outcome, SliderSpec};
pub use data::filter::{filtered_indices, FilteredView};
pub use data::registry::{Dimension, Registry, MAX_DIMENSIONS};
pub use data::table::Table;
pub use error::{CutError, Result};
pub use session::CutSession;
pub use sync::{Renderer, ViewFrame, ViewSynchronizer};
