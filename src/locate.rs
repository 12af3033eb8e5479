//! Sources of "where is the user" and "where is this place".

use thiserror::Error;

use crate::data::model::Station;
use crate::geo::LatLon;

#[derive(Debug, Error, PartialEq)]
pub enum LocateError {
    #[error("Unable to retrieve location")]
    Unavailable,
}

/// A type that can report the user's current position.
pub trait Locator {
    fn locate(&mut self) -> Result<LatLon, LocateError>;
}

/// The nullary Locator: location is never available.
pub struct NullLocator;

impl Locator for NullLocator {
    fn locate(&mut self) -> Result<LatLon, LocateError> {
        Err(LocateError::Unavailable)
    }
}

/// Always reports the same configured position.
pub struct FixedLocator {
    pub position: LatLon,
}

impl Locator for FixedLocator {
    fn locate(&mut self) -> Result<LatLon, LocateError> {
        Ok(self.position)
    }
}

// ---------------------------------------------------------------------------
// Geocoding
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum GeocodeError {
    #[error("Nothing to search for")]
    EmptyQuery,
    #[error("Location not found.")]
    NotFound,
}

/// A resolved search result.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    pub position: LatLon,
    /// Set when the query named a station directly.
    pub station: Option<usize>,
}

/// Resolves free text to a position.
pub trait Geocoder {
    fn geocode(&self, query: &str, stations: &[Station]) -> Result<Place, GeocodeError>;
}

/// Resolves coordinate text, then station names, without leaving the process.
#[derive(Debug, Clone, Default)]
pub struct LocalGeocoder {
    /// Substrings stripped from station ids before matching.
    pub name_markers: Vec<String>,
}

impl LocalGeocoder {
    pub fn new(name_markers: Vec<String>) -> Self {
        Self { name_markers }
    }
}

/// Text that looks like it was meant to be a coordinate pair.
fn looks_numeric(query: &str) -> bool {
    query
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+' | ' '))
}

impl Geocoder for LocalGeocoder {
    fn geocode(&self, query: &str, stations: &[Station]) -> Result<Place, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }

        if looks_numeric(query) {
            match LatLon::parse(query) {
                Ok(position) => {
                    return Ok(Place {
                        name: position.to_string(),
                        position,
                        station: None,
                    })
                }
                // Station ids can carry numbers too.
                Err(e) => log::debug!("'{query}' is not a coordinate pair: {e}"),
            }
        }

        let needle = query.to_lowercase();
        let mut fallback = None;
        for (i, station) in stations.iter().enumerate() {
            let Some(position) = station.position() else { continue };
            let name = station.display_name(&self.name_markers);
            let lowered = name.to_lowercase();
            let place = || Place {
                name: name.clone(),
                position,
                station: Some(i),
            };
            if lowered == needle {
                return Ok(place());
            }
            if fallback.is_none()
                && (lowered.contains(&needle) || station.station_id.to_lowercase().contains(&needle))
            {
                fallback = Some(place());
            }
        }
        fallback.ok_or(GeocodeError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(id: &str, lat: f64, lon: f64) -> Station {
        Station {
            station_id: id.to_string(),
            lat: Some(lat),
            lon: Some(lon),
            forecasts: Vec::new(),
            current_safety_data: None,
        }
    }

    fn geocoder() -> LocalGeocoder {
        LocalGeocoder::new(vec!["_Delhi".into(), "Delhi_".into()])
    }

    #[test]
    fn locators() {
        assert_eq!(NullLocator.locate(), Err(LocateError::Unavailable));
        let mut fixed = FixedLocator {
            position: LatLon::new(28.5, 77.1),
        };
        assert_eq!(fixed.locate(), Ok(LatLon::new(28.5, 77.1)));
    }

    #[test]
    fn resolves_coordinates() {
        let place = geocoder().geocode("28.6, 77.2", &[]).unwrap();
        assert_eq!(place.position, LatLon::new(28.6, 77.2));
        assert_eq!(place.station, None);
        assert_eq!(geocoder().geocode("128.6, 77.2", &[]), Err(GeocodeError::NotFound));
    }

    #[test]
    fn bad_coordinate_text_falls_back_to_names() {
        let stations = vec![
            station("Alipur_Delhi", 28.8, 77.1),
            station("Sector_62_Noida", 28.62, 77.36),
        ];
        let place = geocoder().geocode("62", &stations).unwrap();
        assert_eq!(place.station, Some(1));
        assert_eq!(geocoder().geocode("95, 77", &stations), Err(GeocodeError::NotFound));
    }

    #[test]
    fn exact_station_name_beats_partial_match() {
        let stations = vec![
            station("Dwarka-Sector_8_Delhi", 28.571, 77.071),
            station("NSIT_Dwarka_Delhi", 28.609, 77.033),
            station("Dwarka_Delhi", 28.59, 77.05),
        ];
        let place = geocoder().geocode("dwarka", &stations).unwrap();
        assert_eq!(place.station, Some(2));

        let place = geocoder().geocode("nsit", &stations).unwrap();
        assert_eq!(place.station, Some(1));
        assert_eq!(place.name, "NSIT Dwarka");
    }

    #[test]
    fn misses_are_reported() {
        let stations = vec![station("Alipur_Delhi", 28.8, 77.1)];
        assert_eq!(geocoder().geocode("   ", &stations), Err(GeocodeError::EmptyQuery));
        assert_eq!(geocoder().geocode("Mumbai", &stations), Err(GeocodeError::NotFound));
    }
}
