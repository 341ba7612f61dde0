use super::error::StoreError;
use super::store::{check_writable, parse_id, record_outcome, ItemStore};
use crate::models::{
    distance_meters, to_document, to_item, GeoDocument, Item, ItemInput, NearQuery,
    MAX_SEARCH_RESULTS,
};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-process [`ItemStore`] with the same semantics as the MongoDB store.
///
/// Used by the HTTP tests and for running the service without a database.
#[derive(Default)]
pub struct MemoryItemStore {
    documents: Mutex<HashMap<ObjectId, GeoDocument>>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw document, bypassing validation. Lets tests plant
    /// documents another writer could have left behind.
    pub fn insert_raw(&self, document: GeoDocument) -> Result<ObjectId, StoreError> {
        let id = document.id.unwrap_or_else(ObjectId::new);
        let mut document = document;
        document.id = Some(id);
        self.lock()?.insert(id, document);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.lock().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<ObjectId, GeoDocument>>, StoreError> {
        self.documents
            .lock()
            .map_err(|e| StoreError::Unavailable(anyhow::anyhow!("Item store mutex poisoned: {}", e)))
    }

    fn insert(&self, item: &ItemInput) -> Result<String, StoreError> {
        check_writable(item)?;
        let id = ObjectId::new();
        let mut document = to_document(item);
        document.id = Some(id);
        self.lock()?.insert(id, document);
        Ok(id.to_hex())
    }

    fn all(&self) -> Result<Vec<Item>, StoreError> {
        let documents: Vec<GeoDocument> = self.lock()?.values().cloned().collect();
        documents
            .into_iter()
            .map(|doc| to_item(doc).map_err(StoreError::from))
            .collect()
    }

    fn find_by_id(&self, id: &str) -> Result<Item, StoreError> {
        let oid = parse_id(id)?;
        let document = self.lock()?.get(&oid).cloned().ok_or(StoreError::NotFound)?;
        Ok(to_item(document)?)
    }

    fn replace(&self, id: &str, item: &ItemInput) -> Result<(), StoreError> {
        let oid = parse_id(id)?;
        check_writable(item)?;
        let mut documents = self.lock()?;
        let slot = documents.get_mut(&oid).ok_or(StoreError::NotFound)?;
        let mut document = to_document(item);
        document.id = Some(oid);
        *slot = document;
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<(), StoreError> {
        let oid = parse_id(id)?;
        self.lock()?
            .remove(&oid)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    fn find_near(&self, query: &NearQuery) -> Result<Vec<Item>, StoreError> {
        query.validate()?;
        let center = (query.longitude, query.latitude);

        let mut hits = Vec::new();
        for item in self.all()? {
            let distance = distance_meters(center, (item.longitude, item.latitude));
            if distance <= query.radius_meters {
                hits.push((distance, item));
            }
        }

        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(hits
            .into_iter()
            .take(MAX_SEARCH_RESULTS)
            .map(|(_, item)| item)
            .collect())
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn create(&self, item: &ItemInput) -> Result<String, StoreError> {
        let result = self.insert(item);
        record_outcome("create", &result);
        result
    }

    async fn get_all(&self) -> Result<Vec<Item>, StoreError> {
        let result = self.all();
        record_outcome("get_all", &result);
        result
    }

    async fn get_by_id(&self, id: &str) -> Result<Item, StoreError> {
        let result = self.find_by_id(id);
        record_outcome("get_by_id", &result);
        result
    }

    async fn update(&self, id: &str, item: &ItemInput) -> Result<(), StoreError> {
        let result = self.replace(id, item);
        record_outcome("update", &result);
        result
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let result = self.remove(id);
        record_outcome("delete", &result);
        result
    }

    async fn search_near(&self, query: &NearQuery) -> Result<Vec<Item>, StoreError> {
        let result = self.find_near(query);
        record_outcome("search_near", &result);
        result
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.lock().map(|_| ())
    }
}
