use super::error::StoreError;
use crate::models::{validate_coordinates, Item, ItemInput, NearQuery};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

pub const ITEMS_COLLECTION: &str = "items";

/// Persistence for items.
///
/// Every operation maps to at most one backing-store call. Failures are
/// returned as-is; nothing is retried.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Insert a new item and return its store-assigned id.
    async fn create(&self, item: &ItemInput) -> Result<String, StoreError>;

    /// Every stored item, in no particular order.
    async fn get_all(&self) -> Result<Vec<Item>, StoreError>;

    async fn get_by_id(&self, id: &str) -> Result<Item, StoreError>;

    /// Replace all fields of an existing item.
    async fn update(&self, id: &str, item: &ItemInput) -> Result<(), StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Items within `query.radius_meters` of the query point, nearest first,
    /// at most [`crate::models::MAX_SEARCH_RESULTS`].
    async fn search_near(&self, query: &NearQuery) -> Result<Vec<Item>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Parse an item id into the store's native identifier.
pub fn parse_id(id: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(id).map_err(|_| StoreError::InvalidId(id.to_string()))
}

/// Guard applied by every store before a write reaches persistence.
pub fn check_writable(item: &ItemInput) -> Result<(), StoreError> {
    validate_coordinates(item.longitude, item.latitude)?;
    Ok(())
}

/// Count a store call by operation and outcome.
pub fn record_outcome<T>(operation: &'static str, result: &Result<T, StoreError>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    metrics::counter!(
        "items_store_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}
