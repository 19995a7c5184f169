//! Boundary between the cut core and whatever draws the controls.
//!
//! A control surface reads [`SliderSpec`]s to lay out one Min/Max pair per
//! dimension and reports user actions back as [`ControlEvent`]s, which
//! [`CutSession::handle`](crate::session::CutSession::handle) processes to
//! completion before returning.

use std::path::PathBuf;

use crate::data::registry::{Registry, MAX_DIMENSIONS};

/// Which end of a cut range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    Lower,
    Upper,
}

/// Everything a control surface can ask of the core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    /// A slider moved.
    SetBound { slot: usize, bound: Bound, value: f64 },
    /// Reset button next to a single slider.
    ResetBound { slot: usize, bound: Bound },
    ResetAll,
    Save,
    Close,
}

/// What handling an event did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// View recomputed and renderers notified.
    Redrawn { visible: usize },
    Saved { table: PathBuf, bounds: PathBuf },
    Closed,
    /// The session was already closed.
    Ignored,
}

/// Layout data for one dimension's pair of range controls.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderSpec {
    pub slot: usize,
    pub name: String,
    /// Full data range the sliders travel over, fixed at registration.
    pub travel: Option<(f64, f64)>,
    pub lower: f64,
    pub upper: f64,
    pub default_lower: f64,
    pub default_upper: f64,
}

impl SliderSpec {
    pub fn value(&self, bound: Bound) -> f64 {
        match bound {
            Bound::Lower => self.lower,
            Bound::Upper => self.upper,
        }
    }
}

/// One spec per registered dimension, in slot order.
pub fn slider_specs(registry: &Registry) -> Vec<SliderSpec> {
    registry
        .dimensions()
        .iter()
        .take(MAX_DIMENSIONS)
        .enumerate()
        .map(|(slot, dim)| SliderSpec {
            slot,
            name: dim.name.clone(),
            travel: dim.travel,
            lower: dim.lower,
            upper: dim.upper,
            default_lower: dim.default_lower,
            default_upper: dim.default_upper,
        })
        .collect()
}
