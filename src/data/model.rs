use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use crate::aqi::AqiCategory;
use crate::geo::LatLon;

// ---------------------------------------------------------------------------
// Forecast – one horizon of a station forecast
// ---------------------------------------------------------------------------

/// A single forecast horizon as produced by the upstream blending pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Lead time in hours (24 / 48 / 72).
    pub horizon_hours: u32,
    /// Raw model estimate, µg/m³.
    #[serde(default)]
    pub pm25_model_raw: f64,
    /// Baseline the model was blended against; 0 when no ground truth existed.
    #[serde(default)]
    pub pm25_baseline_cpcb: f64,
    /// Weight given to the model, in [0, 1].
    #[serde(default = "full_trust")]
    pub trust_model: f64,
    /// Blended estimate, µg/m³.
    #[serde(default)]
    pub pm25_final: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_pollutant")]
    pub primary_pollutant: String,
}

fn full_trust() -> f64 {
    1.0
}

fn default_pollutant() -> String {
    DEFAULT_POLLUTANT.to_string()
}

pub const DEFAULT_POLLUTANT: &str = "PM2.5";

impl Forecast {
    /// Category stored in the dataset, if it is one we recognise.
    pub fn stored_category(&self) -> Option<AqiCategory> {
        self.category.parse().ok()
    }
}

// ---------------------------------------------------------------------------
// SafetySnapshot – latest ground-truth reading
// ---------------------------------------------------------------------------

/// The most recent official reading attached to a station.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SafetySnapshot {
    /// Reported index; appears as a string, a number or null in the wild.
    #[serde(default, deserialize_with = "lenient_text")]
    pub aqi: Option<String>,
    #[serde(default)]
    pub prominent_pollutant: Option<String>,
    #[serde(default)]
    pub current_pm25: Option<f64>,
    /// `DD-MM-YYYY HH:MM:SS`.
    #[serde(default)]
    pub last_update: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

impl SafetySnapshot {
    pub fn last_update_time(&self) -> Option<NaiveDateTime> {
        let text = self.last_update.as_deref()?;
        NaiveDateTime::parse_from_str(text, "%d-%m-%Y %H:%M:%S").ok()
    }
}

// ---------------------------------------------------------------------------
// Station – one monitoring site
// ---------------------------------------------------------------------------

/// A monitoring station with its forecast horizons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub station_id: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    /// Ordered by horizon.
    #[serde(default)]
    pub forecasts: Vec<Forecast>,
    #[serde(default)]
    pub current_safety_data: Option<SafetySnapshot>,
}

/// A reading counts as present when it is finite and non-zero; upstream
/// writes 0.0 when no reading exists.
fn present(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite() && *x != 0.0)
}

impl Station {
    /// Coordinates, if both are present and in range.
    pub fn position(&self) -> Option<LatLon> {
        let point = LatLon::new(self.lat?, self.lon?);
        point.is_in_range().then_some(point)
    }

    /// Station id with city markers stripped and underscores turned into spaces.
    pub fn display_name(&self, markers: &[String]) -> String {
        let mut name = self.station_id.clone();
        for marker in markers {
            name = name.replace(marker.as_str(), "");
        }
        let name = name.replace('_', " ");
        let name = name.trim();
        if name.is_empty() {
            self.station_id.clone()
        } else {
            name.to_string()
        }
    }

    /// Current reading if known, otherwise the first forecast's final value.
    pub fn headline_pm25(&self) -> f64 {
        self.current_safety_data
            .as_ref()
            .and_then(|s| present(s.current_pm25))
            .or_else(|| self.forecasts.first().and_then(|f| present(Some(f.pm25_final))))
            .unwrap_or(0.0)
    }

    pub fn dominant_pollutant(&self) -> &str {
        self.current_safety_data
            .as_ref()
            .and_then(|s| s.prominent_pollutant.as_deref())
            .filter(|p| !p.is_empty())
            .or_else(|| {
                self.forecasts
                    .first()
                    .map(|f| f.primary_pollutant.as_str())
                    .filter(|p| !p.is_empty())
            })
            .unwrap_or(DEFAULT_POLLUTANT)
    }

    /// Model trust of the nearest horizon.
    pub fn model_trust(&self) -> Option<f64> {
        self.forecasts.first().map(|f| f.trust_model)
    }

    pub fn forecast_at(&self, horizon_hours: u32) -> Option<&Forecast> {
        self.forecasts.iter().find(|f| f.horizon_hours == horizon_hours)
    }

    /// Where the headline reading came from.
    pub fn reading_source(&self) -> &str {
        self.current_safety_data
            .as_ref()
            .and_then(|s| s.source.as_deref())
            .unwrap_or("AI Model")
    }
}

// ---------------------------------------------------------------------------
// ForecastDataset – the complete loaded document
// ---------------------------------------------------------------------------

/// The full forecast document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDataset {
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(rename = "forecasts")]
    pub stations: Vec<Station>,
}

impl ForecastDataset {
    /// Number of stations.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// `generated_at` parsed as a naive local timestamp.
    pub fn generated_time(&self) -> Option<NaiveDateTime> {
        let text = self.generated_at.as_deref()?;
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    }

    /// Every horizon that appears anywhere in the dataset, ascending.
    pub fn horizons(&self) -> Vec<u32> {
        let mut hours: Vec<u32> = self
            .stations
            .iter()
            .flat_map(|s| s.forecasts.iter().map(|f| f.horizon_hours))
            .collect();
        hours.sort_unstable();
        hours.dedup();
        hours
    }

    /// Stations that can be drawn and searched.
    pub fn located(&self) -> impl Iterator<Item = (usize, &Station, LatLon)> {
        self.stations
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.position().map(|p| (i, s, p)))
    }
}
