use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};
use palette::Srgb;
use rusty_barber::color::{colormap_for_slot, Colormap};
use rusty_barber::sync::{Axis, AxisHistogram, Histogram, ScatterSeries};
use rusty_barber::ViewFrame;

use crate::state::AppState;

/// Number of colour buckets a scatter series is split into.
const COLOR_BUCKETS: usize = 32;

const PLOT_HEIGHT: f32 = 280.0;

pub fn to_color32(c: Srgb<u8>) -> Color32 {
    Color32::from_rgb(c.red, c.green, c.blue)
}

// ---------------------------------------------------------------------------
// Central panel – one scatter per dimension, then the axis histograms
// ---------------------------------------------------------------------------

pub fn cut_plots(ui: &mut Ui, state: &AppState) {
    let Some(session) = &state.session else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a table to start cutting  (File → Open…)");
        });
        return;
    };
    let frame = session.frame();

    if frame.scatter.is_empty() && frame.histograms.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Add a dimension in the side panel");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for series in &frame.scatter {
                scatter_plot(ui, frame, series);
                ui.add_space(8.0);
            }
            for hist in &frame.histograms {
                histogram_plot(ui, hist);
                ui.add_space(8.0);
            }
        });
}

fn scatter_plot(ui: &mut Ui, frame: &ViewFrame, series: &ScatterSeries) {
    let cmap = colormap_for_slot(series.slot);

    ui.horizontal(|ui: &mut Ui| {
        ui.label(RichText::new(&series.dimension).strong());
        match series.color_scale {
            Some(scale) => {
                ui.label(format!("{:.4}", scale.min));
                colorbar(ui, cmap);
                ui.label(format!("{:.4}", scale.max));
            }
            None => {
                ui.label("no finite values in view");
            }
        }
    });

    // Points of one colour share a single plot item.
    let mut buckets: Vec<Vec<[f64; 2]>> = vec![Vec::new(); COLOR_BUCKETS];
    let mut missing: Vec<[f64; 2]> = Vec::new();
    for ((&x, &y), &c) in series.xs.iter().zip(&series.ys).zip(&series.colors) {
        match series.color_scale {
            Some(scale) if c.is_finite() => {
                let t = scale.normalize(c);
                let bucket = (t * (COLOR_BUCKETS - 1) as f64).round() as usize;
                buckets[bucket.min(COLOR_BUCKETS - 1)].push([x, y]);
            }
            _ => missing.push([x, y]),
        }
    }

    let mut plot = Plot::new(format!("scatter_{}", series.dimension))
        .height(PLOT_HEIGHT)
        .x_axis_label(frame.x_name.as_str())
        .y_axis_label(frame.y_name.as_str())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);
    // Keep the axes on the full data range while cuts narrow the points.
    if let Some((lo, hi)) = frame.x_extent {
        plot = plot.include_x(lo).include_x(hi);
    }
    if let Some((lo, hi)) = frame.y_extent {
        plot = plot.include_y(lo).include_y(hi);
    }

    plot.show(ui, |plot_ui| {
        for (i, points) in buckets.into_iter().enumerate() {
            if points.is_empty() {
                continue;
            }
            let t = i as f64 / (COLOR_BUCKETS - 1) as f64;
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .color(to_color32(cmap.sample(t)))
                    .radius(2.0)
                    .filled(true),
            );
        }
        if !missing.is_empty() {
            plot_ui.points(
                Points::new(PlotPoints::from(missing))
                    .color(Color32::GRAY)
                    .radius(2.0)
                    .filled(true),
            );
        }
    });
}

fn histogram_plot(ui: &mut Ui, hist: &AxisHistogram) {
    let axis = match hist.axis {
        Axis::X => "x",
        Axis::Y => "y",
    };
    ui.label(RichText::new(format!("{} ({axis})", hist.column)).strong());

    let current_color = ui.visuals().text_color();
    Plot::new(format!("histogram_{axis}"))
        .height(PLOT_HEIGHT * 0.75)
        .legend(Legend::default())
        .x_axis_label(hist.column.as_str())
        .y_axis_label("count")
        .include_y(0.0)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(step_points(&hist.initial))
                    .name("initial cut")
                    .color(Color32::RED),
            );
            plot_ui.line(
                Line::new(step_points(&hist.current))
                    .name("current cut")
                    .color(current_color),
            );
        });
}

/// Outline of a histogram as a step line closed down to zero at both ends.
fn step_points(hist: &Histogram) -> PlotPoints {
    let Some(&first) = hist.edges.first() else {
        return PlotPoints::from(Vec::<[f64; 2]>::new());
    };
    let mut points = vec![[first, 0.0]];
    for (edges, &count) in hist.edges.windows(2).zip(&hist.counts) {
        points.push([edges[0], count as f64]);
        points.push([edges[1], count as f64]);
    }
    if let Some(&last) = hist.edges.last() {
        points.push([last, 0.0]);
    }
    PlotPoints::from(points)
}

fn colorbar(ui: &mut Ui, cmap: Colormap) {
    let steps = 24;
    let (rect, _) = ui.allocate_exact_size(egui::vec2(120.0, 10.0), egui::Sense::hover());
    let width = rect.width() / steps as f32;
    for (i, color) in cmap.gradient(steps).into_iter().enumerate() {
        let left = rect.left() + width * i as f32;
        let cell = egui::Rect::from_min_max(
            egui::pos2(left, rect.top()),
            egui::pos2(left + width, rect.bottom()),
        );
        ui.painter().rect_filled(cell, 0.0, to_color32(color));
    }
}
