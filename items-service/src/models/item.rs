use mongodb::bson::{oid::ObjectId, Bson};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;
pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;

/// Item as seen by API clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub longitude: f64,
    pub latitude: f64,
}

/// Body of create and update requests. Updates replace every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ItemInput {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(custom(function = "validate_longitude"))]
    pub longitude: f64,
    #[validate(custom(function = "validate_latitude"))]
    pub latitude: f64,
}

/// GeoJSON point. Coordinates are `[longitude, latitude]`.
///
/// Coordinates stay raw BSON so documents written by other tools still
/// deserialize and can be rejected by the mapper instead of failing the
/// whole cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<Bson>,
}

impl GeoPoint {
    pub const KIND: &'static str = "Point";

    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: Self::KIND.to_string(),
            coordinates: vec![Bson::Double(longitude), Bson::Double(latitude)],
        }
    }
}

/// Stored representation of an item in the `items` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location: GeoPoint,
}

fn validate_longitude(longitude: f64) -> Result<(), ValidationError> {
    if (MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude) {
        Ok(())
    } else {
        let mut err = ValidationError::new("range");
        err.message = Some("Longitude must be within [-180, 180]".into());
        Err(err)
    }
}

fn validate_latitude(latitude: f64) -> Result<(), ValidationError> {
    if (MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude) {
        Ok(())
    } else {
        let mut err = ValidationError::new("range");
        err.message = Some("Latitude must be within [-90, 90]".into());
        Err(err)
    }
}

/// Check a coordinate pair against the GeoJSON ranges.
///
/// Errors are keyed by field name so they render the same way as the derive
/// rules on [`ItemInput`].
pub fn validate_coordinates(longitude: f64, latitude: f64) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Err(err) = validate_longitude(longitude) {
        errors.add("longitude", err);
    }
    if let Err(err) = validate_latitude(latitude) {
        errors.add("latitude", err);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(longitude: f64, latitude: f64) -> ItemInput {
        ItemInput {
            name: "Cafe".to_string(),
            description: None,
            longitude,
            latitude,
        }
    }

    #[test]
    fn boundary_coordinates_are_accepted() {
        assert!(input(180.0, 90.0).validate().is_ok());
        assert!(input(-180.0, -90.0).validate().is_ok());
        assert!(validate_coordinates(180.0, 90.0).is_ok());
        assert!(validate_coordinates(-180.0, -90.0).is_ok());
    }

    #[test]
    fn just_past_boundary_is_rejected() {
        let errors = input(180.0001, 0.0).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("longitude"));

        let errors = input(0.0, 90.0001).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("latitude"));

        let errors = validate_coordinates(180.0001, 90.0001).unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("longitude"));
        assert!(fields.contains_key("latitude"));
    }

    #[test]
    fn nan_coordinates_are_rejected() {
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
        assert!(validate_coordinates(0.0, f64::NAN).is_err());
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut item = input(0.0, 0.0);
        item.name = String::new();
        let errors = item.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn document_serializes_as_geojson() {
        let doc = GeoDocument {
            id: None,
            name: "Cafe".to_string(),
            description: Some("espresso".to_string()),
            location: GeoPoint::new(-122.42, 37.77),
        };

        let bson = mongodb::bson::to_document(&doc).unwrap();
        assert!(!bson.contains_key("_id"));

        let location = bson.get_document("location").unwrap();
        assert_eq!(location.get_str("type").unwrap(), "Point");
        let coords = location.get_array("coordinates").unwrap();
        assert_eq!(coords[0].as_f64(), Some(-122.42));
        assert_eq!(coords[1].as_f64(), Some(37.77));
    }

    #[test]
    fn derive_rejects_nan_coordinates() {
        assert!(input(f64::NAN, 0.0).validate().is_err());
        assert!(input(0.0, f64::NAN).validate().is_err());
    }

    #[test]
    fn missing_description_serializes_as_null() {
        let item = Item {
            id: ObjectId::new().to_hex(),
            name: "Bench".to_string(),
            description: None,
            longitude: 0.0,
            latitude: 0.0,
        };

        let json = serde_json::to_value(&item).unwrap();
        assert!(json["description"].is_null());
        assert!(json.as_object().unwrap().contains_key("description"));
    }
}
