use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{
    Line, LineStyle, MarkerShape, Plot, PlotBounds, PlotPoint, PlotPoints, Points, Text,
};

use crate::color;
use crate::geo::LatLon;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Station map (central panel)
// ---------------------------------------------------------------------------

const MARKER_RADIUS: f32 = 6.0;
const QUERY_COLOR: Color32 = Color32::from_rgb(0x09, 0x84, 0xe3);
const NO_DATA_COLOR: Color32 = Color32::GRAY;

/// Render the station map: x = longitude, y = latitude.
pub fn station_map(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a forecast file to view stations  (File → Open…)");
        });
        return;
    }

    let half = state.config.view_span_deg / 2.0;
    // Keep a degree of longitude as wide as it is on the ground.
    let aspect = 1.0 / state.config.center.lat.to_radians().cos();
    let fly_to = state.fly_to.take();
    let initial_view = state.take_initial_view();

    let markers = state.config.name_markers.clone();
    let plot = Plot::new("station_map")
        .data_aspect(aspect as f32)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .allow_double_click_reset(true)
        .label_formatter(|name, value| {
            if name.is_empty() {
                format!("{:.4}, {:.4}", value.y, value.x)
            } else {
                name.to_string()
            }
        });

    let response = plot.show(ui, |plot_ui| {
        if let Some((start, span)) = initial_view {
            let half = span / 2.0;
            plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                [start.lon - half * aspect, start.lat - half],
                [start.lon + half * aspect, start.lat + half],
            ));
        }
        if let Some(target) = fly_to {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                [target.lon - half * aspect / 2.0, target.lat - half / 2.0],
                [target.lon + half * aspect / 2.0, target.lat + half / 2.0],
            ));
        }

        let Some(dataset) = state.dataset.as_ref() else {
            return;
        };

        for (idx, station, pos) in dataset.located() {
            let value = state.marker_value(station);
            let fill = value.map_or(NO_DATA_COLOR, color::value_color);
            let title = station.display_name(&markers);
            let name = match (value, state.marker_category(station)) {
                (Some(v), Some(cat)) => format!("{title}\n{cat} ({})", v.round()),
                _ => format!("{title}\nNo forecast for {}", state.layer.label()),
            };
            let at = || PlotPoints::new(vec![[pos.lon, pos.lat]]);

            plot_ui.points(
                Points::new(at())
                    .radius(MARKER_RADIUS * 1.8)
                    .color(color::halo(fill))
                    .filled(true),
            );
            plot_ui.points(
                Points::new(at())
                    .name(&name)
                    .shape(MarkerShape::Circle)
                    .radius(MARKER_RADIUS)
                    .color(fill)
                    .filled(true),
            );
            if state.selected == Some(idx) {
                plot_ui.points(
                    Points::new(at())
                        .radius(MARKER_RADIUS + 3.0)
                        .color(color::outline(fill))
                        .filled(false),
                );
            }
        }

        if let Some(link) = &state.link {
            plot_ui.line(
                Line::new(PlotPoints::new(vec![
                    [link.from.lon, link.from.lat],
                    [link.to.lon, link.to.lat],
                ]))
                .color(QUERY_COLOR.gamma_multiply(0.7))
                .style(LineStyle::dashed_loose())
                .width(2.0),
            );
        }

        if let Some(marker) = &state.query_marker {
            let p = marker.position;
            plot_ui.points(
                Points::new(PlotPoints::new(vec![[p.lon, p.lat]]))
                    .radius(5.0)
                    .color(QUERY_COLOR)
                    .filled(true),
            );
            plot_ui.text(
                Text::new(
                    PlotPoint::new(p.lon, p.lat),
                    RichText::new(format!("📍 {}", marker.label)).strong(),
                )
                .anchor(eframe::egui::Align2::LEFT_BOTTOM),
            );
        }
    });

    if response.response.clicked() {
        if let Some(pos) = response.response.interact_pointer_pos() {
            let value = response.transform.value_from_position(pos);
            let point = LatLon::new(value.y, value.x);
            log::debug!("Map click at {point}");
            state.select_nearest(point, "Selected Location");
        }
    }
}
