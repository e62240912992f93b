//! Handlers shared by every collection, instantiated once per entity type in `build_router`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use models::Resource;
use serde_json::{json, Value};
use service::{resources, storage::scoped};

use super::body::JsonObject;
use crate::errors::JsonApiError;
use crate::state::AppState;

pub async fn list<T: Resource>(State(app): State<AppState>) -> Result<Json<Vec<Value>>, JsonApiError> {
    let items = scoped(app.storage.as_ref(), |s| Box::pin(async move { resources::list::<T>(s).await })).await?;
    Ok(Json(items.iter().map(Resource::to_json).collect()))
}

pub async fn create<T: Resource>(
    State(app): State<AppState>,
    JsonObject(attrs): JsonObject,
) -> Result<(StatusCode, Json<Value>), JsonApiError> {
    let item = scoped(app.storage.as_ref(), |s| Box::pin(async move { resources::create::<T>(s, attrs).await })).await?;
    Ok((StatusCode::CREATED, Json(item.to_json())))
}

pub async fn show<T: Resource>(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, JsonApiError> {
    let item = scoped(app.storage.as_ref(), |s| Box::pin(async move { resources::get::<T>(s, &id).await })).await?;
    Ok(Json(item.to_json()))
}

pub async fn update<T: Resource>(
    State(app): State<AppState>,
    Path(id): Path<String>,
    JsonObject(attrs): JsonObject,
) -> Result<Json<Value>, JsonApiError> {
    let item = scoped(app.storage.as_ref(), |s| Box::pin(async move {
        resources::update::<T>(s, &id, &attrs).await
    }))
    .await?;
    Ok(Json(item.to_json()))
}

pub async fn destroy<T: Resource>(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, JsonApiError> {
    scoped(app.storage.as_ref(), |s| Box::pin(async move { resources::remove::<T>(s, &id).await })).await?;
    Ok(Json(json!({})))
}
