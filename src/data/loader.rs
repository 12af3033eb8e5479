use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

use super::fusion::{self, FusionMismatch};
use super::model::ForecastDataset;

/// Failures specific to the forecast document format.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("expected a JavaScript assignment like `const aqiData = {{...}};`")]
    MissingAssignment,
    #[error("document has no 'forecasts' array")]
    MissingForecasts,
    #[error("document contains no stations")]
    NoStations,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a forecast dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json` – the raw forecast document
/// * `.js`   – the same document published as `const aqiData = {...};`
pub fn load_file(path: &Path) -> Result<ForecastDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let text = match ext.as_str() {
        "json" | "js" => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string()).into()),
    };

    let json = if ext == "js" {
        strip_js_assignment(&text)?
    } else {
        text.as_str()
    };
    parse_json(json).with_context(|| format!("parsing {}", path.display()))
}

/// Parse a document held in memory, accepting either the raw JSON or the
/// JavaScript wrapper.
pub fn parse_dataset(text: &str) -> Result<ForecastDataset> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('{') {
        parse_json(trimmed)
    } else {
        parse_json(strip_js_assignment(trimmed)?)
    }
}

// ---------------------------------------------------------------------------
// JSON document
// ---------------------------------------------------------------------------

/// Expected JSON schema:
///
/// ```json
/// {
///   "generated_at": "2025-12-12T00:34:24.395900",
///   "source": "CPCB_RSS_HYBRID",
///   "forecasts": [
///     { "station_id": "Alipur_Delhi", "lat": 28.81, "lon": 77.15,
///       "forecasts": [ { "horizon_hours": 24, "pm25_final": 240.4, ... } ],
///       "current_safety_data": { "current_pm25": 280.0, ... } }
///   ]
/// }
/// ```
fn parse_json(text: &str) -> Result<ForecastDataset> {
    let root: serde_json::Value = serde_json::from_str(text).context("parsing JSON")?;
    if !root.get("forecasts").is_some_and(|f| f.is_array()) {
        return Err(LoadError::MissingForecasts.into());
    }
    let dataset: ForecastDataset =
        serde_json::from_value(root).context("decoding forecast document")?;
    if dataset.is_empty() {
        return Err(LoadError::NoStations.into());
    }
    Ok(dataset)
}

/// `const aqiData = {...};` → `{...}`
fn strip_js_assignment(text: &str) -> Result<&str, LoadError> {
    let (_, rhs) = text.split_once('=').ok_or(LoadError::MissingAssignment)?;
    let body = rhs.trim().trim_end_matches(';').trim_end();
    if body.starts_with('{') && body.ends_with('}') {
        Ok(body)
    } else {
        Err(LoadError::MissingAssignment)
    }
}

// ---------------------------------------------------------------------------
// Dataset report
// ---------------------------------------------------------------------------

/// Data quality summary computed after a load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetReport {
    pub stations: usize,
    /// Station ids that cannot be placed on the map.
    pub unlocated: Vec<String>,
    /// (station id, mismatch) for forecasts breaking the blending invariant.
    pub fusion_mismatches: Vec<(String, FusionMismatch)>,
}

impl DatasetReport {
    /// Inspect a dataset, logging every issue at `warn`.
    pub fn inspect(dataset: &ForecastDataset, fusion_tolerance: f64) -> Self {
        let mut report = DatasetReport {
            stations: dataset.len(),
            ..Default::default()
        };

        for station in &dataset.stations {
            if station.position().is_none() {
                log::warn!("Station {} has no usable coordinates", station.station_id);
                report.unlocated.push(station.station_id.clone());
            }
            for forecast in &station.forecasts {
                if let Err(m) = fusion::check_forecast(forecast, fusion_tolerance) {
                    log::warn!(
                        "Station {} +{}h: pm25_final {} does not match blend {:.1}",
                        station.station_id,
                        m.horizon_hours,
                        m.stored,
                        m.expected
                    );
                    report.fusion_mismatches.push((station.station_id.clone(), m));
                }
            }
        }
        report
    }

    pub fn located(&self) -> usize {
        self.stations - self.unlocated.len()
    }
}
