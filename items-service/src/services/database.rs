use super::error::StoreError;
use super::store::{check_writable, parse_id, record_outcome, ItemStore, ITEMS_COLLECTION};
use crate::config::MongoConfig;
use crate::models::{to_document, to_item, GeoDocument, Item, ItemInput, NearQuery, MAX_SEARCH_RESULTS};
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{ClientOptions, FindOptions, IndexOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;

/// Process-wide MongoDB handle. Cloning shares the underlying pool.
#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(config: &MongoConfig) -> Result<Self, AppError> {
        tracing::info!(database = %config.database, "Connecting to MongoDB");

        let mut options = ClientOptions::parse(config.uri.expose_secret())
            .await
            .map_err(|e| {
                tracing::error!("Failed to parse MongoDB connection string: {}", e);
                AppError::from(e)
            })?;
        options.app_name = Some("items-service".to_string());
        options.connect_timeout = Some(config.timeout());
        options.server_selection_timeout = Some(config.timeout());

        let client = MongoClient::with_options(options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(&config.database);
        tracing::info!(database = %config.database, "MongoDB client ready");
        Ok(Self { client, db })
    }

    /// Create the `2dsphere` index that proximity search depends on.
    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for items-service");

        let location_index = IndexModel::builder()
            .keys(doc! { "location": "2dsphere" })
            .options(
                IndexOptions::builder()
                    .name("location_2dsphere".to_string())
                    .build(),
            )
            .build();

        self.items()
            .create_index(location_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create 2dsphere index on items collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created index on items.location (2dsphere)");

        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                StoreError::from(e)
            })?;
        Ok(())
    }

    pub fn items(&self) -> Collection<GeoDocument> {
        self.db.collection(ITEMS_COLLECTION)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Close pooled connections once the server has stopped.
    pub async fn shutdown(self) {
        tracing::info!("Closing MongoDB connections");
        self.client.shutdown().await;
    }
}

/// [`ItemStore`] over the `items` collection.
#[derive(Clone)]
pub struct MongoItemStore {
    db: MongoDb,
}

impl MongoItemStore {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }

    async fn collect_items(
        &self,
        filter: Document,
        options: Option<FindOptions>,
    ) -> Result<Vec<Item>, StoreError> {
        let mut cursor = self.db.items().find(filter, options).await?;

        let mut items = Vec::new();
        while let Some(doc) = cursor.try_next().await? {
            items.push(to_item(doc)?);
        }
        Ok(items)
    }

    async fn insert(&self, item: &ItemInput) -> Result<String, StoreError> {
        check_writable(item)?;
        let inserted = self.db.items().insert_one(to_document(item), None).await?;
        inserted
            .inserted_id
            .as_object_id()
            .map(|oid| oid.to_hex())
            .ok_or_else(|| {
                StoreError::Unavailable(anyhow::anyhow!(
                    "insert returned a non-ObjectId _id: {}",
                    inserted.inserted_id
                ))
            })
    }

    async fn find_by_id(&self, id: &str) -> Result<Item, StoreError> {
        let oid = parse_id(id)?;
        let doc = self
            .db
            .items()
            .find_one(doc! { "_id": oid }, None)
            .await?
            .ok_or(StoreError::NotFound)?;
        Ok(to_item(doc)?)
    }

    async fn replace(&self, id: &str, item: &ItemInput) -> Result<(), StoreError> {
        let oid = parse_id(id)?;
        check_writable(item)?;
        let replaced = self
            .db
            .items()
            .replace_one(doc! { "_id": oid }, to_document(item), None)
            .await?;
        if replaced.matched_count == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), StoreError> {
        let oid = parse_id(id)?;
        let deleted = self
            .db
            .items()
            .delete_one(doc! { "_id": oid }, None)
            .await?;
        if deleted.deleted_count == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn find_near(&self, query: &NearQuery) -> Result<Vec<Item>, StoreError> {
        query.validate()?;
        let options = FindOptions::builder()
            .limit(MAX_SEARCH_RESULTS as i64)
            .build();
        self.collect_items(near_filter(query), Some(options)).await
    }
}

/// `$nearSphere` filter; results come back sorted by distance.
pub fn near_filter(query: &NearQuery) -> Document {
    doc! {
        "location": {
            "$nearSphere": {
                "$geometry": {
                    "type": "Point",
                    "coordinates": [query.longitude, query.latitude],
                },
                "$maxDistance": query.radius_meters,
            }
        }
    }
}

#[async_trait]
impl ItemStore for MongoItemStore {
    async fn create(&self, item: &ItemInput) -> Result<String, StoreError> {
        let result = self.insert(item).await;
        record_outcome("create", &result);
        result
    }

    async fn get_all(&self) -> Result<Vec<Item>, StoreError> {
        let result = self.collect_items(doc! {}, None).await;
        record_outcome("get_all", &result);
        result
    }

    async fn get_by_id(&self, id: &str) -> Result<Item, StoreError> {
        let result = self.find_by_id(id).await;
        record_outcome("get_by_id", &result);
        result
    }

    async fn update(&self, id: &str, item: &ItemInput) -> Result<(), StoreError> {
        let result = self.replace(id, item).await;
        record_outcome("update", &result);
        result
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let result = self.remove(id).await;
        record_outcome("delete", &result);
        result
    }

    async fn search_near(&self, query: &NearQuery) -> Result<Vec<Item>, StoreError> {
        let result = self.find_near(query).await;
        record_outcome("search_near", &result);
        result
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.db.health_check().await
    }
}
