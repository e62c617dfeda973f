//! Great-circle distance and bearing between geocoordinates.
//!
//! Used to correlate signal samples with the distance to a home
//! reference point. Both calculations take optional coordinates and
//! return [`UNAVAILABLE`] when either side is absent -- position data
//! comes from an external sampler and is frequently missing, and a
//! missing position must never fail a telemetry append.

use serde::{Deserialize, Serialize};

/// Mean earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Sentinel returned when a calculation's inputs are absent.
pub const UNAVAILABLE: f64 = -1.0;

/// A geocoordinate pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
}

impl Coordinates {
    /// Create a coordinate pair.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinates {
            latitude,
            longitude,
        }
    }
}

/// Great-circle distance between two points in meters (haversine).
///
/// Returns [`UNAVAILABLE`] when either coordinate is `None`.
pub fn distance_meters(from: Option<Coordinates>, to: Option<Coordinates>) -> f64 {
    let (Some(from), Some(to)) = (from, to) else {
        return UNAVAILABLE;
    };

    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let delta_phi = (to.latitude - from.latitude).to_radians();
    let delta_lambda = (to.longitude - from.longitude).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Initial bearing from `from` to `to` in degrees, normalized to
/// `[0, 360)`.
///
/// Returns [`UNAVAILABLE`] when either coordinate is `None`.
pub fn bearing_degrees(from: Option<Coordinates>, to: Option<Coordinates>) -> f64 {
    let (Some(from), Some(to)) = (from, to) else {
        return UNAVAILABLE;
    };

    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let lambda1 = from.longitude.to_radians();
    let lambda2 = to.longitude.to_radians();

    let y = (lambda2 - lambda1).sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * (lambda2 - lambda1).cos();
    let theta = y.atan2(x);

    (theta.to_degrees() + 360.0) % 360.0
}
