use super::item::validate_coordinates;
use validator::{ValidationError, ValidationErrors};

/// Radius used by MongoDB to convert between radians and meters on a sphere.
pub const EARTH_RADIUS_METERS: f64 = 6_378_100.0;

pub const DEFAULT_SEARCH_RADIUS_METERS: f64 = 1000.0;
pub const MIN_SEARCH_RADIUS_METERS: f64 = 1.0;
pub const MAX_SEARCH_RESULTS: usize = 50;

/// A proximity search around a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearQuery {
    pub longitude: f64,
    pub latitude: f64,
    pub radius_meters: f64,
}

impl NearQuery {
    pub fn new(longitude: f64, latitude: f64, radius_meters: Option<f64>) -> Self {
        Self {
            longitude,
            latitude,
            radius_meters: radius_meters.unwrap_or(DEFAULT_SEARCH_RADIUS_METERS),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = match validate_coordinates(self.longitude, self.latitude) {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        // Written so NaN falls through to the error branch.
        if !(self.radius_meters >= MIN_SEARCH_RADIUS_METERS && self.radius_meters.is_finite()) {
            let mut err = ValidationError::new("range");
            err.message = Some("Radius must be at least 1 meter".into());
            errors.add("radius", err);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Great-circle distance in meters between two `(longitude, latitude)` points.
pub fn distance_meters(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lon1, lat1) = (from.0.to_radians(), from.1.to_radians());
    let (lon2, lat2) = (to.0.to_radians(), to.1.to_radians());

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_METERS * a.sqrt().min(1.0).asin()
}
