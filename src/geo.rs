use serde::Deserialize;

use crate::units::km_to_miles;

/// Earth radius used for distance-from-home, in kilometres.
const EARTH_RADIUS_KM: f64 = 6378.0;

/// Home location used when none is configured.
pub const DEFAULT_HOME: Position = Position {
    lat: 53.429768,
    lon: -2.757043,
};

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    pub fn new(lat: f64, lon: f64) -> Self {
        Position { lat, lon }
    }
}

/// Where the vehicle is relative to home.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Location {
    Home,
    Away { miles: f64 },
    /// The service did not report a position.
    Unknown,
}

impl Location {
    /// Classify `observed` against `home`. Anything that would print as
    /// `0.0` miles counts as home.
    pub fn classify(home: Position, observed: Option<Position>) -> Self {
        match observed {
            None => Location::Unknown,
            Some(observed) => {
                let miles = distance_miles(home, observed);
                if miles < 0.05 {
                    Location::Home
                } else {
                    Location::Away { miles }
                }
            }
        }
    }
}

/// Great-circle distance in miles using the spherical law of cosines.
pub fn distance_miles(home: Position, observed: Position) -> f64 {
    let (lat0, lon0) = (home.lat.to_radians(), home.lon.to_radians());
    let (lat, lon) = (observed.lat.to_radians(), observed.lon.to_radians());

    // Rounding can push coincident points just past 1.0.
    let cosine = (lat0.sin() * lat.sin() + lat0.cos() * lat.cos() * (lon0 - lon).cos())
        .clamp(-1.0, 1.0);

    km_to_miles(EARTH_RADIUS_KM * cosine.acos())
}
