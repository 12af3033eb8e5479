use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::model::Station;

// ---------------------------------------------------------------------------
// LatLon – a point in degree space
// ---------------------------------------------------------------------------

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum CoordinateError {
    #[error("expected \"LAT, LON\", got '{0}'")]
    Format(String),
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("coordinate ({lat}, {lon}) is out of range")]
    OutOfRange { lat: f64, lon: f64 },
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Parse `"28.61, 77.20"` (comma or whitespace separated).
    pub fn parse(text: &str) -> Result<Self, CoordinateError> {
        let parts: Vec<&str> = text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();
        let [lat, lon] = parts.as_slice() else {
            return Err(CoordinateError::Format(text.trim().to_string()));
        };
        let number = |tok: &str| {
            tok.parse::<f64>()
                .map_err(|_| CoordinateError::NotANumber(tok.to_string()))
        };
        let point = LatLon::new(number(*lat)?, number(*lon)?);
        if !point.is_in_range() {
            return Err(CoordinateError::OutOfRange {
                lat: point.lat,
                lon: point.lon,
            });
        }
        Ok(point)
    }

    /// Finite and inside [-90, 90] × [-180, 180].
    pub fn is_in_range(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl FromStr for LatLon {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LatLon::parse(s)
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

// ---------------------------------------------------------------------------
// Distances
// ---------------------------------------------------------------------------

/// Unweighted Euclidean distance in (lat, lon) degree space.
pub fn degree_distance(a: LatLon, b: LatLon) -> f64 {
    (a.lat - b.lat).hypot(a.lon - b.lon)
}

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres. Only used for display.
pub fn haversine_km(a: LatLon, b: LatLon) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

// ---------------------------------------------------------------------------
// Nearest-station search
// ---------------------------------------------------------------------------

/// Result of a nearest-station scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    /// Index into the scanned slice.
    pub index: usize,
    /// Degree-space distance to the query.
    pub distance: f64,
}

/// Linear scan over optional positions; `None` entries are skipped.
///
/// Ties keep the first position encountered.
pub fn nearest_by<I>(positions: I, query: LatLon) -> Option<Nearest>
where
    I: IntoIterator<Item = Option<LatLon>>,
{
    let mut best: Option<Nearest> = None;
    for (index, pos) in positions.into_iter().enumerate() {
        let Some(pos) = pos else { continue };
        let distance = degree_distance(pos, query);
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(Nearest { index, distance });
        }
    }
    best
}

/// The station closest to `query` among those with valid coordinates.
pub fn nearest_station(stations: &[Station], query: LatLon) -> Option<Nearest> {
    nearest_by(stations.iter().map(Station::position), query)
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

    #[test]
    fn picks_closest_in_degree_space() {
        let stations = vec![station("a", 0.0, 0.0), station("b", 1.0, 1.0)];
        let hit = nearest_station(&stations, LatLon::new(0.4, 0.4)).unwrap();
        assert_eq!(hit.index, 0);
        assert!((hit.distance - 0.4f64.hypot(0.4)).abs() < 1e-12);
    }

    #[test]
    fn permutation_does_not_change_winner() {
        let mut stations = vec![
            station("alipur", 28.815, 77.153),
            station("anand_vihar", 28.647, 77.315),
            station("ashok_vihar", 28.695, 77.181),
            station("bawana", 28.776, 77.051),
        ];
        let query = LatLon::new(28.70, 77.19);
        let winner = |s: &[Station]| {
            let hit = nearest_station(s, query).unwrap();
            s[hit.index].station_id.clone()
        };
        let expected = winner(&stations);
        assert_eq!(expected, "ashok_vihar");
        stations.reverse();
        assert_eq!(winner(&stations), expected);
        stations.rotate_left(1);
        assert_eq!(winner(&stations), expected);
    }

    #[test]
    fn ties_keep_first_encountered() {
        let stations = vec![
            station("west", 28.5, 77.0),
            station("east", 28.5, 78.0),
            station("north", 29.5, 77.5),
        ];
        let hit = nearest_station(&stations, LatLon::new(28.5, 77.5)).unwrap();
        assert_eq!(hit.index, 0);

        let swapped = vec![stations[1].clone(), stations[0].clone()];
        let hit = nearest_station(&swapped, LatLon::new(28.5, 77.5)).unwrap();
        assert_eq!(swapped[hit.index].station_id, "east");
    }

    #[test]
    fn skips_stations_without_coordinates() {
        let mut missing = station("nowhere", 0.0, 0.0);
        missing.lat = None;
        let bogus = station("bogus", 0.0, f64::NAN);
        let stations = vec![missing, bogus, station("far", 10.0, 10.0)];
        let hit = nearest_station(&stations, LatLon::new(0.0, 0.0)).unwrap();
        assert_eq!(hit.index, 2);
    }

    #[test]
    fn zero_coordinates_take_part_in_the_scan() {
        let stations = vec![station("origin", 0.0, 0.0), station("diagonal", 1.0, 1.0)];
        let hit = nearest_station(&stations, LatLon::new(0.4, 0.4)).unwrap();
        assert_eq!(stations[hit.index].station_id, "origin");
    }

    #[test]
    fn empty_input_has_no_result() {
        assert_eq!(nearest_station(&[], LatLon::new(28.6, 77.2)), None);
    }

    #[test]
    fn parses_coordinate_text() {
        assert_eq!(LatLon::parse("28.61, 77.20"), Ok(LatLon::new(28.61, 77.20)));
        assert_eq!(LatLon::parse(" 28.61 77.20 "), Ok(LatLon::new(28.61, 77.20)));
        assert!(matches!(LatLon::parse("Connaught"), Err(CoordinateError::Format(_))));
        assert!(matches!(LatLon::parse("1, 2, 3"), Err(CoordinateError::Format(_))));
        assert!(matches!(LatLon::parse("Connaught Place"), Err(CoordinateError::NotANumber(_))));
        assert!(matches!(LatLon::parse("north, 77"), Err(CoordinateError::NotANumber(_))));
        assert!(matches!(LatLon::parse("95, 77"), Err(CoordinateError::OutOfRange { .. })));
    }

    #[test]
    fn haversine_is_roughly_right() {
        // Alipur to Anand Vihar, about 24 km apart.
        let d = haversine_km(LatLon::new(28.815329, 77.15301), LatLon::new(28.647622, 77.315809));
        assert!((20.0..28.0).contains(&d), "got {d}");
    }
}
