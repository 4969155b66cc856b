//! Geocoding and distance
//!
//! Forward-geocodes an address through Nominatim and measures the
//! great-circle distance to a restaurant in miles.

use serde::Deserialize;
use thiserror::Error;

const EARTH_RADIUS_MILES: f64 = 3958.8;
const USER_AGENT: &str = concat!("DineDash/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Address could not be geocoded: {0}")]
    NoMatch(String),

    #[error("Geocoder returned malformed coordinates")]
    BadCoordinates,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Nominatim client
pub struct Geocoder {
    client: reqwest::Client,
    base_url: String,
}

impl Geocoder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Resolve a free-form address to coordinates. Takes the first
    /// match, like the original geocoder did.
    pub async fn geocode(&self, address: &str) -> Result<Coordinates, GeoError> {
        let places: Vec<NominatimPlace> = self
            .client
            .get(format!("{}/search", self.base_url))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| GeoError::NoMatch(address.to_string()))?;
        let latitude: f64 = place.lat.parse().map_err(|_| GeoError::BadCoordinates)?;
        let longitude: f64 = place.lon.parse().map_err(|_| GeoError::BadCoordinates)?;
        Ok(Coordinates {
            latitude,
            longitude,
        })
    }
}

/// Haversine great-circle distance in miles
pub fn distance_miles(a: Coordinates, b: Coordinates) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_to_self() {
        let p = Coordinates {
            latitude: 40.4168,
            longitude: -3.7038,
        };
        assert!(distance_miles(p, p) < 1e-9);
    }

    #[test]
    fn madrid_to_barcelona_roughly_313_miles() {
        let madrid = Coordinates {
            latitude: 40.4168,
            longitude: -3.7038,
        };
        let barcelona = Coordinates {
            latitude: 41.3874,
            longitude: 2.1686,
        };
        let d = distance_miles(madrid, barcelona);
        assert!((310.0..320.0).contains(&d), "got {d}");
    }

    #[test]
    fn symmetric() {
        let a = Coordinates {
            latitude: 51.5,
            longitude: -0.12,
        };
        let b = Coordinates {
            latitude: 48.85,
            longitude: 2.35,
        };
        assert!((distance_miles(a, b) - distance_miles(b, a)).abs() < 1e-9);
    }
}
