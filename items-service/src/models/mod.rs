pub mod geo;
pub mod item;
pub mod mapper;

pub use geo::{distance_meters, NearQuery, MAX_SEARCH_RESULTS};
pub use item::{validate_coordinates, GeoDocument, GeoPoint, Item, ItemInput};
pub use mapper::{to_document, to_item, MalformedDocument};
