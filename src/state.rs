use std::time::{Duration, Instant};

use crate::aqi::AqiCategory;
use crate::config::ViewerConfig;
use crate::data::loader::DatasetReport;
use crate::data::model::{ForecastDataset, Station};
use crate::geo::{self, LatLon};
use crate::locate::{FixedLocator, GeocodeError, Geocoder, LocalGeocoder, Locator, NullLocator};

// ---------------------------------------------------------------------------
// Map layer – which value colours the markers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapLayer {
    /// Latest reading, falling back to the first forecast.
    #[default]
    Now,
    /// `pm25_final` of the given horizon.
    Horizon(u32),
}

impl MapLayer {
    pub fn label(self) -> String {
        match self {
            MapLayer::Now => "Now".to_string(),
            MapLayer::Horizon(h) => format!("+{h}h"),
        }
    }
}

/// A point the user asked about, shown on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryMarker {
    pub label: String,
    pub position: LatLon,
}

/// Temporary line from a query point to the station chosen for it.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestLink {
    pub from: LatLon,
    pub to: LatLon,
    pub expires_at: Instant,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ViewerConfig,

    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<ForecastDataset>,

    /// Quality summary of the loaded dataset.
    pub report: Option<DatasetReport>,

    /// Index of the station whose details are shown.
    pub selected: Option<usize>,

    pub layer: MapLayer,

    pub query_marker: Option<QueryMarker>,

    pub link: Option<NearestLink>,

    /// Contents of the search box.
    pub search_text: String,

    /// Whether the health advice panel is visible.
    pub show_health: bool,

    /// Message shown in the alert window until dismissed.
    pub alert: Option<String>,

    /// Set when the map should re-centre on this point next frame.
    pub fly_to: Option<LatLon>,

    /// Whether the map has been given its starting bounds.
    pub view_initialized: bool,

    locator: Box<dyn Locator>,
    geocoder: Box<dyn Geocoder>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl AppState {
    pub fn new(config: ViewerConfig) -> Self {
        let locator: Box<dyn Locator> = match config.home {
            Some(position) => Box::new(FixedLocator { position }),
            None => Box::new(NullLocator),
        };
        let geocoder = Box::new(LocalGeocoder::new(config.name_markers.clone()));
        Self {
            config,
            dataset: None,
            report: None,
            selected: None,
            layer: MapLayer::default(),
            query_marker: None,
            link: None,
            search_text: String::new(),
            show_health: false,
            alert: None,
            fly_to: None,
            view_initialized: false,
            locator,
            geocoder,
        }
    }

    pub fn with_locator(mut self, locator: Box<dyn Locator>) -> Self {
        self.locator = locator;
        self
    }

    /// Ingest a newly loaded dataset, resetting selection and overlays.
    pub fn set_dataset(&mut self, dataset: ForecastDataset) {
        let report = DatasetReport::inspect(&dataset, self.config.fusion_tolerance);
        log::info!(
            "Loaded {} stations ({} on map, {} fusion mismatches)",
            report.stations,
            report.located(),
            report.fusion_mismatches.len()
        );
        if let MapLayer::Horizon(h) = self.layer {
            if !dataset.horizons().contains(&h) {
                self.layer = MapLayer::Now;
            }
        }
        self.dataset = Some(dataset);
        self.report = Some(report);
        self.selected = None;
        self.query_marker = None;
        self.link = None;
        self.show_health = false;
        self.alert = None;
        self.view_initialized = false;
    }

    /// Unload the dataset and everything derived from it.
    pub fn clear_dataset(&mut self) {
        if let Some(ds) = self.dataset.take() {
            log::info!("Closed dataset ({} stations)", ds.len());
        }
        self.report = None;
        self.selected = None;
        self.query_marker = None;
        self.link = None;
        self.show_health = false;
        self.fly_to = None;
        self.view_initialized = false;
    }

    /// Centre and span the map should start from, handed out once per dataset.
    pub fn take_initial_view(&mut self) -> Option<(LatLon, f64)> {
        if self.view_initialized {
            return None;
        }
        self.view_initialized = true;
        Some((self.config.center, self.config.view_span_deg))
    }

    /// Record a failed load: keep whatever was shown before and tell the user.
    pub fn load_failed(&mut self, error: &anyhow::Error) {
        log::error!("Failed to load dataset: {error:#}");
        self.alert = Some(format!("No data found: {error:#}"));
    }

    pub fn stations(&self) -> &[Station] {
        match &self.dataset {
            Some(ds) => &ds.stations,
            None => &[],
        }
    }

    pub fn selected_station(&self) -> Option<&Station> {
        self.selected.and_then(|i| self.stations().get(i))
    }

    pub fn display_name(&self, station: &Station) -> String {
        station.display_name(&self.config.name_markers)
    }

    /// Value used to colour a station's marker on the current layer.
    pub fn marker_value(&self, station: &Station) -> Option<f64> {
        match self.layer {
            MapLayer::Now => Some(station.headline_pm25()),
            MapLayer::Horizon(h) => station.forecast_at(h).map(|f| f.pm25_final),
        }
    }

    pub fn marker_category(&self, station: &Station) -> Option<AqiCategory> {
        self.marker_value(station).map(AqiCategory::classify)
    }

    pub fn set_layer(&mut self, layer: MapLayer) {
        log::debug!("Map layer → {}", layer.label());
        self.layer = layer;
    }

    pub fn select_station(&mut self, index: usize) {
        if index < self.stations().len() {
            self.selected = Some(index);
            self.show_health = true;
        }
    }

    /// Select the station nearest to `point`, marking the query on the map.
    ///
    /// Returns the chosen station index.
    pub fn select_nearest(&mut self, point: LatLon, label: impl Into<String>) -> Option<usize> {
        self.query_marker = Some(QueryMarker {
            label: label.into(),
            position: point,
        });
        let hit = geo::nearest_station(self.stations(), point)?;
        let station = &self.stations()[hit.index];
        let to = station.position()?;
        log::debug!(
            "Nearest to {point} is {} ({:.2} km)",
            station.station_id,
            geo::haversine_km(point, to)
        );
        self.link = Some(NearestLink {
            from: point,
            to,
            expires_at: Instant::now() + self.config.link_duration(),
        });
        self.select_station(hit.index);
        Some(hit.index)
    }

    /// Resolve the search box text and jump to the result.
    pub fn search(&mut self) {
        let query = self.search_text.trim().to_string();
        if query.is_empty() {
            return;
        }
        match self.geocoder.geocode(&query, self.stations()) {
            Ok(place) => {
                log::info!("Search '{query}' → {} ({})", place.name, place.position);
                self.fly_to = Some(place.position);
                match place.station {
                    Some(index) => {
                        self.query_marker = None;
                        self.link = None;
                        self.select_station(index);
                    }
                    None => {
                        self.select_nearest(place.position, place.name);
                    }
                }
            }
            Err(e) => {
                log::error!("Search '{query}' failed: {e}");
                self.alert = Some(GeocodeError::NotFound.to_string());
            }
        }
    }

    /// Ask the locator for the user's position and show the nearest station.
    pub fn locate_me(&mut self) {
        match self.locator.locate() {
            Ok(position) => {
                self.fly_to = Some(position);
                self.select_nearest(position, "You are here");
            }
            Err(e) => {
                log::error!("Locate failed: {e}");
                self.alert = Some(e.to_string());
            }
        }
    }

    /// Drop the link line once its time is up.
    pub fn expire_link(&mut self, now: Instant) {
        if self.link.as_ref().is_some_and(|l| now >= l.expires_at) {
            self.link = None;
        }
    }

    /// Time left until the link line disappears.
    pub fn link_remaining(&self, now: Instant) -> Option<Duration> {
        self.link
            .as_ref()
            .map(|l| l.expires_at.saturating_duration_since(now))
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn close_health(&mut self) {
        self.show_health = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Forecast;

    fn station(id: &str, lat: f64, lon: f64, pm25: f64) -> Station {
        Station {
            station_id: id.to_string(),
            lat: Some(lat),
            lon: Some(lon),
            forecasts: vec![Forecast {
                horizon_hours: 24,
                pm25_model_raw: pm25,
                pm25_baseline_cpcb: 0.0,
                trust_model: 1.0,
                pm25_final: pm25,
                category: String::new(),
                primary_pollutant: "PM2.5".into(),
            }],
            current_safety_data: None,
        }
    }

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.set_dataset(ForecastDataset {
            generated_at: None,
            source: None,
            stations: vec![
                station("Alipur_Delhi", 28.815, 77.153, 45.0),
                station("Anand_Vihar_Delhi", 28.647, 77.315, 320.0),
            ],
        });
        state
    }

    #[test]
    fn nearest_selection_sets_marker_and_link() {
        let mut state = loaded();
        let hit = state.select_nearest(LatLon::new(28.65, 77.30), "Selected Location");
        assert_eq!(hit, Some(1));
        assert_eq!(state.selected, Some(1));
        assert!(state.show_health);
        assert_eq!(state.query_marker.as_ref().unwrap().label, "Selected Location");
        let link = state.link.clone().unwrap();
        assert_eq!(link.to, LatLon::new(28.647, 77.315));

        state.expire_link(link.expires_at - Duration::from_millis(1));
        assert!(state.link.is_some());
        state.expire_link(link.expires_at);
        assert!(state.link.is_none());
    }

    #[test]
    fn nearest_without_data_selects_nothing() {
        let mut state = AppState::default();
        assert_eq!(state.select_nearest(LatLon::new(28.6, 77.2), "here"), None);
        assert_eq!(state.selected, None);
        assert!(state.link.is_none());
    }

    #[test]
    fn search_by_name_and_by_coordinates() {
        let mut state = loaded();
        state.search_text = "alipur".into();
        state.search();
        assert_eq!(state.selected, Some(0));
        assert_eq!(state.fly_to, Some(LatLon::new(28.815, 77.153)));
        assert!(state.link.is_none());

        state.search_text = "28.64, 77.31".into();
        state.search();
        assert_eq!(state.selected, Some(1));
        assert!(state.link.is_some());
    }

    #[test]
    fn failed_search_raises_alert() {
        let mut state = loaded();
        state.search_text = "Mumbai".into();
        state.search();
        assert_eq!(state.alert.as_deref(), Some("Location not found."));
        state.dismiss_alert();
        assert!(state.alert.is_none());

        state.search_text = "   ".into();
        state.search();
        assert!(state.alert.is_none());
    }

    #[test]
    fn invalid_coordinates_alert_location_not_found() {
        let mut state = loaded();
        state.search_text = "95, 77".into();
        state.search();
        assert_eq!(state.alert.as_deref(), Some("Location not found."));
        assert_eq!(state.selected, None);
        assert!(state.query_marker.is_none());
    }

    #[test]
    fn clear_dataset_resets_everything() {
        let mut state = loaded();
        state.select_nearest(LatLon::new(28.65, 77.30), "Selected Location");
        assert!(state.take_initial_view().is_some());
        state.clear_dataset();
        assert!(state.dataset.is_none());
        assert!(state.report.is_none());
        assert_eq!(state.selected, None);
        assert!(state.query_marker.is_none());
        assert!(state.link.is_none());
        assert!(!state.show_health);
        assert!(state.stations().is_empty());
        assert!(!state.view_initialized);
    }

    #[test]
    fn initial_view_is_handed_out_once_per_dataset() {
        let mut state = loaded();
        let config = ViewerConfig::default();
        assert_eq!(
            state.take_initial_view(),
            Some((config.center, config.view_span_deg))
        );
        assert_eq!(state.take_initial_view(), None);

        let dataset = state.dataset.clone().unwrap();
        state.set_dataset(dataset);
        assert!(state.take_initial_view().is_some());
        assert_eq!(state.take_initial_view(), None);
    }

    #[test]
    fn locate_me_uses_configured_home() {
        let mut state = loaded();
        state.locate_me();
        assert_eq!(state.alert.as_deref(), Some("Unable to retrieve location"));
        assert_eq!(state.selected, None);

        let mut state = loaded().with_locator(Box::new(FixedLocator {
            position: LatLon::new(28.80, 77.15),
        }));
        state.locate_me();
        assert_eq!(state.selected, Some(0));
        assert_eq!(state.query_marker.unwrap().label, "You are here");
    }

    #[test]
    fn marker_values_follow_layer() {
        let mut state = loaded();
        let anand = state.stations()[1].clone();
        assert_eq!(state.marker_category(&anand), Some(AqiCategory::VeryPoor));
        state.set_layer(MapLayer::Horizon(48));
        assert_eq!(state.marker_value(&anand), None);
        state.set_layer(MapLayer::Horizon(24));
        assert_eq!(state.marker_value(&anand), Some(320.0));
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut state = loaded();
        state.load_failed(&anyhow::anyhow!("document contains no stations"));
        assert_eq!(state.stations().len(), 2);
        assert!(state.alert.as_deref().unwrap().contains("no stations"));
    }
}
