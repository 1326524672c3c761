//! Trip Location
//!
//! Coordinates as picked on a map can fall outside the valid range (a map
//! dragged past the antimeridian reports longitudes like 190°). They are
//! normalized before being handed to any weather provider. Place names are
//! chosen from an already-fetched reverse-geocode address.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Address fields tried in order when naming a place
const PLACE_FIELDS: [&str; 7] = ["city", "town", "village", "hamlet", "county", "state", "country"];

pub const UNKNOWN_PLACE: &str = "Unknown";

/// WGS84 position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude clamped to [-90, 90], longitude wrapped into [-180, 180)
    pub fn normalized(self) -> Self {
        let (lat, lon) = normalize_coords(self.lat, self.lon);
        Self { lat, lon }
    }
}

pub fn normalize_coords(lat: f64, lon: f64) -> (f64, f64) {
    let lat = lat.clamp(-90.0, 90.0);
    let lon = (lon + 180.0).rem_euclid(360.0) - 180.0;
    (lat, lon)
}

/// Most specific place name in a reverse-geocode response
///
/// Accepts either the full response (with an `address` object) or the
/// address object itself. Falls back to "Unknown".
pub fn place_name(response: &Value) -> &str {
    let address = response.get("address").unwrap_or(response);
    PLACE_FIELDS
        .iter()
        .filter_map(|field| address.get(field).and_then(Value::as_str))
        .find(|name| !name.trim().is_empty())
        .unwrap_or(UNKNOWN_PLACE)
}
