use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use rusty_barber::color::colormap_for_slot;
use rusty_barber::{Bound, ControlEvent, MAX_DIMENSIONS};

use crate::state::AppState;
use crate::ui::plot::to_color32;

// ---------------------------------------------------------------------------
// Left side panel – cut controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Cuts");
    ui.separator();

    let columns = match &state.table {
        Some(table) => table.column_names(),
        None => {
            ui.label("No table loaded.");
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            axes_section(ui, state, &columns);
            ui.separator();
            dimensions_section(ui, state, &columns);
            ui.separator();
            sliders_section(ui, state);
            ui.separator();
            save_section(ui, state);
        });

    // Run the events gathered above through the session.
    state.dispatch_pending();
}

/// X/Y selectors and histogram toggles. Any change restarts the session.
fn axes_section(ui: &mut Ui, state: &mut AppState, columns: &[String]) {
    ui.strong("Axes");
    let mut changed = false;
    changed |= column_combo(ui, "x_axis", "X", &mut state.x_column, columns);
    changed |= column_combo(ui, "y_axis", "Y", &mut state.y_column, columns);

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Histograms");
        changed |= ui.checkbox(&mut state.histograms.x, "X").changed();
        changed |= ui.checkbox(&mut state.histograms.y, "Y").changed();
    });

    if changed {
        state.restart_session();
    }
}

fn dimensions_section(ui: &mut Ui, state: &mut AppState, columns: &[String]) {
    let Some(session) = &state.session else {
        return;
    };
    let registered = session.registry().list_dimensions();
    let full = session.registry().is_full();

    ui.strong(format!(
        "Dimensions ({}/{MAX_DIMENSIONS})",
        registered.len()
    ));

    let mut remove = None;
    for (slot, name) in registered.iter().enumerate() {
        ui.horizontal(|ui: &mut Ui| {
            let swatch = to_color32(colormap_for_slot(slot).sample(0.75));
            ui.label(RichText::new("■").color(swatch));
            ui.label(name.as_str());
            if ui.small_button("✕").on_hover_text("Remove this cut").clicked() {
                remove = Some(name.clone());
            }
        });
    }
    if let Some(name) = remove {
        state.remove_dimension(&name);
    }

    let mut add = false;
    ui.horizontal(|ui: &mut Ui| {
        column_combo(ui, "add_dimension", "", &mut state.candidate, columns);
        add = ui.add_enabled(!full, egui::Button::new("Add")).clicked();
    });
    if add {
        let name = state.candidate.clone();
        state.add_dimension(&name);
    }
}

/// One Min/Max slider pair per dimension, each with a reset button.
fn sliders_section(ui: &mut Ui, state: &mut AppState) {
    let specs = match &state.session {
        Some(session) => session.controls(),
        None => return,
    };
    if specs.is_empty() {
        ui.label("Add a dimension to start cutting.");
        return;
    }

    for spec in specs {
        let color = to_color32(colormap_for_slot(spec.slot).sample(0.75));
        ui.label(RichText::new(&spec.name).strong().color(color));

        for bound in [Bound::Lower, Bound::Upper] {
            let label = match bound {
                Bound::Lower => "Min",
                Bound::Upper => "Max",
            };
            ui.horizontal(|ui: &mut Ui| {
                match spec.travel {
                    Some((lo, hi)) => {
                        let mut value = spec.value(bound);
                        // Loaded bounds may sit outside the column's range;
                        // clamping would move them without user input.
                        let slider = egui::Slider::new(&mut value, lo..=hi)
                            .clamping(egui::SliderClamping::Never)
                            .text(label);
                        if ui.add(slider).changed() {
                            state.pending.push(ControlEvent::SetBound {
                                slot: spec.slot,
                                bound,
                                value,
                            });
                        }
                    }
                    None => {
                        ui.label(format!("{label}: no finite values"));
                    }
                }
                if ui.small_button("Reset").clicked() {
                    state.pending.push(ControlEvent::ResetBound {
                        slot: spec.slot,
                        bound,
                    });
                }
            });
        }
        ui.add_space(4.0);
    }
}

fn save_section(ui: &mut Ui, state: &mut AppState) {
    if state.session.is_none() {
        return;
    }

    ui.strong("Save");
    egui::Grid::new("save_locations")
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            ui.label("Table");
            ui.text_edit_singleline(&mut state.table_path);
            ui.end_row();
            ui.label("Bounds");
            ui.text_edit_singleline(&mut state.bounds_path);
            ui.end_row();
        });
    ui.checkbox(&mut state.close_after_save, "Close after save");

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Save Cuts").clicked() {
            state.pending.push(ControlEvent::Save);
        }
        if ui.button("Close Plots").clicked() {
            state.pending.push(ControlEvent::Close);
        }
        if ui.button("Reset All").clicked() {
            state.pending.push(ControlEvent::ResetAll);
        }
    });
}

/// Column selector; returns true when the selection changed.
fn column_combo(
    ui: &mut Ui,
    id: &str,
    label: &str,
    selected: &mut String,
    columns: &[String],
) -> bool {
    let mut changed = false;
    ui.horizontal(|ui: &mut Ui| {
        if !label.is_empty() {
            ui.label(label);
        }
        egui::ComboBox::from_id_salt(id)
            .selected_text(selected.as_str())
            .show_ui(ui, |ui: &mut Ui| {
                for col in columns {
                    if ui.selectable_label(*selected == *col, col).clicked() && *selected != *col {
                        *selected = col.clone();
                        changed = true;
                    }
                }
            });
    });
    changed
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_load = state.session.is_some();
            if ui.add_enabled(can_load, egui::Button::new("Load cuts…")).clicked() {
                load_cuts_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(session) = &state.session {
            let view = session.view();
            ui.label(format!(
                "{} of {} rows pass {} cuts",
                view.len(),
                view.total(),
                session.registry().len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open table")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv", "txt", "dat"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("Text", &["csv", "txt", "dat"])
        .pick_file();

    if let Some(path) = file {
        state.open_table(&path);
    }
}

fn load_cuts_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Load cuts")
        .add_filter("Bounds file", &["csv", "txt"])
        .pick_file();

    if let Some(path) = file {
        state.load_bounds(&path);
    }
}
