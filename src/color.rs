use std::str::FromStr;

use eframe::egui::Color32;
use palette::{Darken, FromColor, Hsl, Lighten, Srgb};

use crate::aqi::AqiCategory;

// ---------------------------------------------------------------------------
// Hex → Color32
// ---------------------------------------------------------------------------

/// Parse a `#rrggbb` string, falling back to grey on malformed input.
pub fn hex_color(hex: &str) -> Color32 {
    match Srgb::<u8>::from_str(hex) {
        Ok(rgb) => Color32::from_rgb(rgb.red, rgb.green, rgb.blue),
        Err(e) => {
            log::warn!("Bad colour '{hex}': {e}");
            Color32::GRAY
        }
    }
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

fn to_hsl(color: Color32) -> Hsl {
    let rgb = Srgb::new(color.r(), color.g(), color.b()).into_format::<f32>();
    Hsl::from_color(rgb)
}

// ---------------------------------------------------------------------------
// Category colours
// ---------------------------------------------------------------------------

/// Marker fill colour for an AQI category.
pub fn category_color(category: AqiCategory) -> Color32 {
    hex_color(category.hex())
}

/// Marker fill colour for a raw value on the display scale.
pub fn value_color(value: f64) -> Color32 {
    category_color(AqiCategory::classify(value))
}

/// A lighter shade drawn behind a marker as its glow.
pub fn halo(color: Color32) -> Color32 {
    let lighter = to_hsl(color).lighten(0.25);
    to_color32(Srgb::from_color(lighter)).gamma_multiply(0.45)
}

/// A darker shade used for the outline of the selected marker.
pub fn outline(color: Color32) -> Color32 {
    to_color32(Srgb::from_color(to_hsl(color).darken(0.3)))
}

/// Legend entries (label with range → colour) for the UI.
pub fn legend_entries() -> Vec<(String, Color32)> {
    AqiCategory::ALL
        .iter()
        .map(|&cat| {
            let range = match cat.display_range() {
                (None, Some(hi)) => format!("0–{hi}"),
                (Some(lo), Some(hi)) => format!("{}–{hi}", lo + 1.0),
                (Some(lo), None) => format!("{}+", lo + 1.0),
                (None, None) => String::new(),
            };
            (format!("{cat}  {range}"), category_color(cat))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_hex_parses() {
        assert_eq!(category_color(AqiCategory::Good), Color32::from_rgb(0x00, 0xb8, 0x94));
        assert_eq!(category_color(AqiCategory::Severe), Color32::from_rgb(0xa2, 0x1d, 0x1d));
        assert_eq!(value_color(50.0), category_color(AqiCategory::Good));
        assert_eq!(value_color(250.0), category_color(AqiCategory::Poor));
    }

    #[test]
    fn malformed_hex_is_grey() {
        assert_eq!(hex_color("not-a-colour"), Color32::GRAY);
    }

    #[test]
    fn shades_differ_from_base() {
        let base = category_color(AqiCategory::Moderate);
        assert_ne!(outline(base), base);
        assert_ne!(halo(base), base);
    }

    #[test]
    fn legend_covers_every_category() {
        let legend = legend_entries();
        assert_eq!(legend.len(), 6);
        assert!(legend[0].0.starts_with("Good"));
        assert!(legend[5].0.ends_with("401+"));
    }
}
