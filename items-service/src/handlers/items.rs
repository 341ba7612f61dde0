//! Item CRUD and proximity search.
//!
//! Every handler runs the auth gate first, then input validation, then a
//! single store call.

use crate::dtos::{SearchParams, StatusResponse};
use crate::middleware::AuthUser;
use crate::models::{Item, ItemInput, NearQuery};
use crate::startup::AppState;
use crate::utils::ValidatedJson;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

#[tracing::instrument(skip_all, fields(user_id = %user.0.subject))]
pub async fn create_item(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<ItemInput>,
) -> Result<(StatusCode, Json<Item>), AppError> {
    let id = state.store.create(&payload).await?;

    tracing::info!(item_id = %id, name = %payload.name, "Item created");

    Ok((
        StatusCode::CREATED,
        Json(Item {
            id,
            name: payload.name,
            description: payload.description,
            longitude: payload.longitude,
            latitude: payload.latitude,
        }),
    ))
}

#[tracing::instrument(skip_all, fields(user_id = %user.0.subject))]
pub async fn list_items(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Item>>, AppError> {
    let items = state.store.get_all().await?;
    tracing::debug!(count = items.len(), "Listed items");
    Ok(Json(items))
}

#[tracing::instrument(skip_all, fields(user_id = %user.0.subject, item_id = %item_id))]
pub async fn get_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(item_id): Path<String>,
) -> Result<Json<Item>, AppError> {
    let item = state.store.get_by_id(&item_id).await?;
    Ok(Json(item))
}

#[tracing::instrument(skip_all, fields(user_id = %user.0.subject, item_id = %item_id))]
pub async fn update_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(item_id): Path<String>,
    ValidatedJson(payload): ValidatedJson<ItemInput>,
) -> Result<Json<StatusResponse>, AppError> {
    state.store.update(&item_id, &payload).await?;

    tracing::info!("Item updated");
    Ok(Json(StatusResponse::updated(item_id)))
}

#[tracing::instrument(skip_all, fields(user_id = %user.0.subject, item_id = %item_id))]
pub async fn delete_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(item_id): Path<String>,
) -> Result<Json<StatusResponse>, AppError> {
    state.store.delete(&item_id).await?;

    tracing::info!("Item deleted");
    Ok(Json(StatusResponse::deleted(item_id)))
}

#[tracing::instrument(skip_all, fields(user_id = %user.0.subject))]
pub async fn search_items(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Item>>, AppError> {
    let query = NearQuery::from(params);
    query.validate()?;

    let items = state.store.search_near(&query).await?;

    tracing::debug!(
        longitude = query.longitude,
        latitude = query.latitude,
        radius = query.radius_meters,
        hits = items.len(),
        "Proximity search"
    );
    Ok(Json(items))
}
