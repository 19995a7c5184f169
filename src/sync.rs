//! View synchronizer: turns a filtered view into what the plots draw.
//!
//! One scatter series per dimension (X vs Y, coloured by that dimension) and,
//! optionally, histograms of X and Y comparing the initial cut with the
//! current one. Renderers are told to redraw once the derived data is fresh.

use std::collections::HashMap;

use crate::config::HistogramToggles;
use crate::data::filter::{initial_indices, FilteredView};
use crate::data::registry::{Dimension, Registry};
use crate::data::table::finite_range;

// ---------------------------------------------------------------------------
// Derived data
// ---------------------------------------------------------------------------

/// Value range a colour map is stretched over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
}

impl ColorScale {
    /// Position of `value` in `[0, 1]`; 0.5 when the scale has no width.
    pub fn normalize(&self, value: f64) -> f64 {
        let width = self.max - self.min;
        if width.abs() < f64::EPSILON {
            0.5
        } else {
            ((value - self.min) / width).clamp(0.0, 1.0)
        }
    }
}

/// Points of one dimension's scatter plot, aligned by filtered row.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub dimension: String,
    pub slot: usize,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub colors: Vec<f64>,
    /// `None` until the view has held at least one row.
    pub color_scale: Option<ColorScale>,
}

/// Bin edges (`counts.len() + 1` of them, ascending) and counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Histogram of one primary axis: initial cut next to the current cut.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisHistogram {
    pub axis: Axis,
    pub column: String,
    pub initial: Histogram,
    pub current: Histogram,
}

/// Everything a renderer needs for one redraw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewFrame {
    pub x_name: String,
    pub y_name: String,
    /// Finite extent of the full X and Y columns; plots keep these axes.
    pub x_extent: Option<(f64, f64)>,
    pub y_extent: Option<(f64, f64)>,
    pub scatter: Vec<ScatterSeries>,
    pub histograms: Vec<AxisHistogram>,
    pub visible: usize,
    pub total: usize,
}

/// Something that draws a [`ViewFrame`].
pub trait Renderer {
    fn redraw(&mut self, frame: &ViewFrame);

    /// The session was closed.
    fn close(&mut self) {}
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Scatter points for `dimension` over the filtered rows.
///
/// The colour scale spans the filtered colour values; when there are none the
/// `previous` scale is kept rather than collapsing to an undefined range.
pub fn derive_scatter(
    registry: &Registry,
    view: &FilteredView,
    slot: usize,
    dimension: &Dimension,
    previous: Option<ColorScale>,
) -> ScatterSeries {
    let colors = view.gather(registry.column(&dimension.name).unwrap_or_default());
    let color_scale = finite_range(colors.iter().copied())
        .map(|(min, max)| ColorScale { min, max })
        .or(previous);

    ScatterSeries {
        dimension: dimension.name.clone(),
        slot,
        xs: view.gather(registry.x()),
        ys: view.gather(registry.y()),
        colors,
        color_scale,
    }
}

/// Histogram of `column` over the filtered rows with `bins` bins.
pub fn derive_histogram(view: &FilteredView, column: &[f64], bins: usize) -> Histogram {
    histogram(&view.gather(column), bins)
}

/// Bin the finite `values` into `bins` equal-width bins over their range.
///
/// An empty input spans `[0, 1]`; a single distinct value `v` spans
/// `[v - 0.5, v + 0.5]`. The last bin includes its right edge.
pub fn histogram(values: &[f64], bins: usize) -> Histogram {
    let bins = bins.max(1);
    let (lo, hi) = match finite_range(values.iter().copied()) {
        None => (0.0, 1.0),
        Some((lo, hi)) if lo == hi => (lo - 0.5, hi + 0.5),
        Some(range) => range,
    };
    // Half-width arithmetic keeps `hi - lo` finite for ranges near f64::MAX.
    let half_width = (hi / 2.0 - lo / 2.0) / bins as f64;

    let mut edges: Vec<f64> = (0..bins)
        .map(|i| {
            let step = i as f64 * half_width;
            lo + step + step
        })
        .collect();
    edges.push(hi);

    let mut counts = vec![0usize; bins];
    for &v in values.iter().filter(|v| v.is_finite()) {
        let idx = ((v / 2.0 - lo / 2.0) / half_width).floor() as usize;
        counts[idx.min(bins - 1)] += 1;
    }

    Histogram { edges, counts }
}

/// Square-root rule: `floor(sqrt(n))`, at least one bin.
pub fn sqrt_bin_count(n: usize) -> usize {
    ((n as f64).sqrt().floor() as usize).max(1)
}

// ---------------------------------------------------------------------------
// ViewSynchronizer
// ---------------------------------------------------------------------------

/// Keeps the derived plot data in step with the registry and filtered view.
///
/// [`rebuild`](Self::rebuild) constructs the view set and freezes the
/// histogram bin count; [`update`](Self::update) re-derives everything for a
/// new filtered view without touching the bin count.
pub struct ViewSynchronizer {
    histograms: HistogramToggles,
    bins: usize,
    initial: Vec<AxisHistogram>,
    color_scales: HashMap<String, ColorScale>,
    renderers: Vec<Box<dyn Renderer>>,
    frame: ViewFrame,
}

impl ViewSynchronizer {
    pub fn new(histograms: HistogramToggles) -> Self {
        Self {
            histograms,
            bins: 1,
            initial: Vec::new(),
            color_scales: HashMap::new(),
            renderers: Vec::new(),
            frame: ViewFrame::default(),
        }
    }

    pub fn add_renderer(&mut self, renderer: Box<dyn Renderer>) {
        self.renderers.push(renderer);
    }

    /// Bin count shared by every histogram until the next rebuild.
    pub fn bin_count(&self) -> usize {
        self.bins
    }

    pub fn frame(&self) -> &ViewFrame {
        &self.frame
    }

    pub fn color_scale(&self, dimension: &str) -> Option<ColorScale> {
        self.color_scales.get(dimension).copied()
    }

    /// (Re)construct the view set for the registry's current dimensions.
    ///
    /// The bin count is frozen at `sqrt` of the initial cut's row count and
    /// the initial-cut histograms are computed once here.
    pub fn rebuild(&mut self, registry: &Registry, view: &FilteredView) {
        let initial = initial_indices(registry);
        let bins = sqrt_bin_count(initial.len());
        self.bins = bins;
        self.color_scales
            .retain(|name, _| registry.dimension(name).is_some());

        self.initial = self
            .enabled_axes(registry)
            .into_iter()
            .map(|(axis, column)| {
                let values = registry.column(&column).unwrap_or_default();
                AxisHistogram {
                    axis,
                    initial: derive_histogram(&initial, values, bins),
                    current: Histogram::default(),
                    column,
                }
            })
            .collect();

        log::debug!(
            "View rebuilt: {} dimensions, {} histogram bins",
            registry.len(),
            self.bins
        );
        self.update(registry, view);
    }

    /// Re-derive scatter and histogram data for `view`.
    pub fn update(&mut self, registry: &Registry, view: &FilteredView) -> &ViewFrame {
        let scatter: Vec<ScatterSeries> = registry
            .dimensions()
            .iter()
            .enumerate()
            .map(|(slot, dim)| {
                let previous = self.color_scales.get(&dim.name).copied();
                derive_scatter(registry, view, slot, dim, previous)
            })
            .collect();
        for series in &scatter {
            if let Some(scale) = series.color_scale {
                self.color_scales.insert(series.dimension.clone(), scale);
            }
        }

        let histograms = self
            .initial
            .iter()
            .map(|h| AxisHistogram {
                current: derive_histogram(
                    view,
                    registry.column(&h.column).unwrap_or_default(),
                    self.bins,
                ),
                ..h.clone()
            })
            .collect();

        self.frame = ViewFrame {
            x_name: registry.x_name().to_string(),
            y_name: registry.y_name().to_string(),
            x_extent: finite_range(registry.x().iter().copied()),
            y_extent: finite_range(registry.y().iter().copied()),
            scatter,
            histograms,
            visible: view.len(),
            total: view.total(),
        };
        &self.frame
    }

    /// Ask every renderer to draw the latest frame.
    pub fn notify(&mut self) {
        for renderer in &mut self.renderers {
            renderer.redraw(&self.frame);
        }
    }

    /// Tell every renderer the session is over.
    pub fn close(&mut self) {
        for renderer in &mut self.renderers {
            renderer.close();
        }
    }

    fn enabled_axes(&self, registry: &Registry) -> Vec<(Axis, String)> {
        let mut axes = Vec::new();
        if self.histograms.x {
            axes.push((Axis::X, registry.x_name().to_string()));
        }
        if self.histograms.y {
            axes.push((Axis::Y, registry.y_name().to_string()));
        }
        axes
    }
}
