use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::geo::LatLon;

/// Viewer settings, read from an optional JSON file. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Dataset opened at startup.
    pub data_path: Option<PathBuf>,
    /// Initial map centre.
    pub center: LatLon,
    /// Initial latitude span of the view, in degrees.
    pub view_span_deg: f64,
    /// Position reported by "locate me"; location is unavailable when unset.
    pub home: Option<LatLon>,
    /// How long the query → station link stays on the map.
    pub link_duration_secs: u64,
    /// Allowed gap between a stored `pm25_final` and the blend of its inputs.
    pub fusion_tolerance: f64,
    /// Substrings removed from station ids to form display names.
    pub name_markers: Vec<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            center: LatLon::new(28.6139, 77.2090),
            view_span_deg: 0.35,
            home: None,
            link_duration_secs: 5,
            fusion_tolerance: 0.5,
            name_markers: vec!["_Delhi".to_string(), "Delhi_".to_string()],
        }
    }
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn link_duration(&self) -> Duration {
        Duration::from_secs(self.link_duration_secs)
    }
}
