use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::aqi::AqiCategory;
use crate::color;
use crate::state::{AppState, MapLayer};

// ---------------------------------------------------------------------------
// Right side panel – station popup, health advice, legend
// ---------------------------------------------------------------------------

/// Render the station detail panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Station");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            match state.selected_station() {
                Some(_) => station_details(ui, state),
                None => {
                    ui.label("Click the map, search, or locate yourself to pick a station.");
                }
            }

            if state.show_health {
                ui.add_space(8.0);
                health_panel(ui, state);
            }

            ui.add_space(8.0);
            legend(ui);
        });
}

fn station_details(ui: &mut Ui, state: &AppState) {
    let Some(station) = state.selected_station() else {
        return;
    };
    let headline = station.headline_pm25();
    let category = AqiCategory::classify(headline);
    let fill = color::category_color(category);

    ui.label(
        RichText::new(format!(" {category} ({}) ", headline.round()))
            .background_color(fill)
            .color(Color32::WHITE)
            .strong(),
    );
    ui.heading(state.display_name(station));
    ui.label(format!("Dominant: {}", station.dominant_pollutant()));
    if let Some(aqi) = station
        .current_safety_data
        .as_ref()
        .and_then(|s| s.aqi.as_deref())
    {
        ui.label(format!("Reported AQI: {aqi}"));
    }
    if let Some(t) = station
        .current_safety_data
        .as_ref()
        .and_then(|s| s.last_update_time())
    {
        ui.label(format!("Reading from {}", t.format("%d %b %Y %H:%M")));
    }

    ui.add_space(4.0);
    ui.strong("Forecast (PM2.5 µg/m³)");
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::remainder())
        .header(18.0, |mut header| {
            header.col(|ui| {
                ui.strong("Horizon");
            });
            header.col(|ui| {
                ui.strong("Final");
            });
            header.col(|ui| {
                ui.strong("Category");
            });
        })
        .body(|mut body| {
            for f in &station.forecasts {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(format!("+{}h", f.horizon_hours));
                    });
                    row.col(|ui| {
                        ui.label(RichText::new(format!("{}", f.pm25_final.round())).strong());
                    });
                    row.col(|ui| {
                        let cat = AqiCategory::classify(f.pm25_final);
                        ui.label(RichText::new(cat.label()).color(color::category_color(cat)));
                    });
                });
            }
        });

    ui.add_space(4.0);
    ui.small(format!("Source: {}", station.reading_source()));
    if let Some(trust) = station.model_trust() {
        ui.small(format!("AI Trust: {}%", (trust * 100.0).round()));
    }
}

fn health_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(station) = state.selected_station() else {
        return;
    };
    let value = station.headline_pm25();
    let category = AqiCategory::classify(value);
    let advice = category.health_advice();

    let mut close = false;
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.horizontal(|ui: &mut Ui| {
            ui.label(
                RichText::new(format!("Health Advice: {category} ({})", value.round()))
                    .color(color::category_color(category))
                    .strong(),
            );
            if ui.small_button("✖").clicked() {
                close = true;
            }
        });
        for line in advice {
            ui.label(format!("• {line}"));
        }
    });
    if close {
        state.close_health();
    }
}

fn legend(ui: &mut Ui) {
    egui::CollapsingHeader::new(RichText::new("Legend").strong())
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            for (label, c) in color::legend_entries() {
                ui.label(RichText::new(format!("● {label}")).color(c));
            }
        });
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
            if ui
                .add_enabled(state.dataset.is_some(), egui::Button::new("Close"))
                .clicked()
            {
                state.clear_dataset();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let updated = ds
                .generated_time()
                .map(|t| t.format("%d %b %Y %H:%M").to_string())
                .or_else(|| ds.generated_at.clone())
                .unwrap_or_else(|| "unknown".to_string());
            ui.label(format!("Last Updated: {updated}"));
            if let Some(report) = &state.report {
                ui.label(format!("{} of {} stations on map", report.located(), report.stations));
            }

            ui.separator();

            let horizons = ds.horizons();
            egui::ComboBox::from_id_salt("map_layer")
                .selected_text(state.layer.label())
                .show_ui(ui, |ui: &mut Ui| {
                    let layers = std::iter::once(MapLayer::Now)
                        .chain(horizons.into_iter().map(MapLayer::Horizon));
                    for layer in layers {
                        if ui.selectable_label(state.layer == layer, layer.label()).clicked() {
                            state.set_layer(layer);
                        }
                    }
                });
        }

        ui.separator();

        let search = ui.add(
            egui::TextEdit::singleline(&mut state.search_text)
                .hint_text("Station or \"lat, lon\"")
                .desired_width(200.0),
        );
        let submitted = search.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("🔍").clicked() || submitted {
            state.search();
        }

        if ui.button("📍").on_hover_text("Locate me").clicked() {
            state.locate_me();
        }
    });
}

// ---------------------------------------------------------------------------
// Alert window
// ---------------------------------------------------------------------------

/// Show the pending alert, if any, until the user dismisses it.
pub fn alert_window(ctx: &egui::Context, state: &mut AppState) {
    let Some(message) = state.alert.clone() else {
        return;
    };
    let mut dismissed = false;
    egui::Window::new("Alert")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui: &mut Ui| {
            ui.label(RichText::new(message).color(Color32::RED));
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });
    if dismissed {
        state.dismiss_alert();
    }
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open forecast data")
        .add_filter("Supported files", &["json", "js"])
        .add_filter("JSON", &["json"])
        .add_filter("Published script", &["js"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => {
                log::info!("Opened {}", path.display());
                state.set_dataset(dataset);
            }
            Err(e) => state.load_failed(&e),
        }
    }
}
