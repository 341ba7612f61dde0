//! Conversion between the API shape of an item and its stored GeoJSON form.

use super::item::{GeoDocument, GeoPoint, Item, ItemInput};
use mongodb::bson::Bson;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MalformedDocument {
    #[error("document has no _id")]
    MissingId,
    #[error("location type is {0:?}, expected \"Point\"")]
    NotAPoint(String),
    #[error("location has {0} coordinates, expected 2")]
    CoordinateCount(usize),
    #[error("coordinate {0} is not a number")]
    NonNumericCoordinate(String),
    #[error("document does not decode: {0}")]
    Undecodable(String),
}

/// Build the stored form of `item`. The id is left for the store to assign.
pub fn to_document(item: &ItemInput) -> GeoDocument {
    GeoDocument {
        id: None,
        name: item.name.clone(),
        description: item.description.clone(),
        location: GeoPoint::new(item.longitude, item.latitude),
    }
}

pub fn to_item(document: GeoDocument) -> Result<Item, MalformedDocument> {
    let id = document.id.ok_or(MalformedDocument::MissingId)?;

    if document.location.kind != GeoPoint::KIND {
        return Err(MalformedDocument::NotAPoint(document.location.kind));
    }

    let (longitude, latitude) = match document.location.coordinates.as_slice() {
        [longitude, latitude] => (coordinate(longitude)?, coordinate(latitude)?),
        other => return Err(MalformedDocument::CoordinateCount(other.len())),
    };

    Ok(Item {
        id: id.to_hex(),
        name: document.name,
        description: document.description,
        longitude,
        latitude,
    })
}

/// Integer coordinates are accepted; other writers do not always store doubles.
fn coordinate(value: &Bson) -> Result<f64, MalformedDocument> {
    match value {
        Bson::Double(v) => Ok(*v),
        Bson::Int32(v) => Ok(f64::from(*v)),
        Bson::Int64(v) => Ok(*v as f64),
        other => Err(MalformedDocument::NonNumericCoordinate(other.to_string())),
    }
}
