//! Routes that walk a relationship: children of a parent, and place/amenity links.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use models::{City, Place, Resource, Review};
use serde_json::{json, Value};
use service::{relations, resources, storage::scoped};

use super::body::JsonObject;
use crate::errors::JsonApiError;
use crate::state::AppState;

fn render<T: Resource>(items: Vec<T>) -> Json<Vec<Value>> {
    Json(items.iter().map(Resource::to_json).collect())
}

pub async fn state_cities(State(app): State<AppState>, Path(id): Path<String>) -> Result<Json<Vec<Value>>, JsonApiError> {
    let cities = scoped(app.storage.as_ref(), |s| Box::pin(async move { relations::state_cities(s, &id).await })).await?;
    Ok(render(cities))
}

pub async fn city_places(State(app): State<AppState>, Path(id): Path<String>) -> Result<Json<Vec<Value>>, JsonApiError> {
    let places = scoped(app.storage.as_ref(), |s| Box::pin(async move { relations::city_places(s, &id).await })).await?;
    Ok(render(places))
}

pub async fn place_reviews(State(app): State<AppState>, Path(id): Path<String>) -> Result<Json<Vec<Value>>, JsonApiError> {
    let reviews = scoped(app.storage.as_ref(), |s| Box::pin(async move { relations::place_reviews(s, &id).await })).await?;
    Ok(render(reviews))
}

pub async fn place_amenities(State(app): State<AppState>, Path(id): Path<String>) -> Result<Json<Vec<Value>>, JsonApiError> {
    let amenities =
        scoped(app.storage.as_ref(), |s| Box::pin(async move { relations::place_amenities(s, &id).await })).await?;
    Ok(render(amenities))
}

async fn create_child<T: Resource>(
    app: AppState,
    parent_field: &'static str,
    parent_id: String,
    attrs: serde_json::Map<String, Value>,
) -> Result<(StatusCode, Json<Value>), JsonApiError> {
    let item = scoped(app.storage.as_ref(), |s| Box::pin(async move {
        resources::create_under::<T>(s, parent_field, &parent_id, attrs).await
    }))
    .await?;
    Ok((StatusCode::CREATED, Json(item.to_json())))
}

pub async fn create_city(
    State(app): State<AppState>,
    Path(id): Path<String>,
    JsonObject(attrs): JsonObject,
) -> Result<(StatusCode, Json<Value>), JsonApiError> {
    create_child::<City>(app, "state_id", id, attrs).await
}

pub async fn create_place(
    State(app): State<AppState>,
    Path(id): Path<String>,
    JsonObject(attrs): JsonObject,
) -> Result<(StatusCode, Json<Value>), JsonApiError> {
    create_child::<Place>(app, "city_id", id, attrs).await
}

pub async fn create_review(
    State(app): State<AppState>,
    Path(id): Path<String>,
    JsonObject(attrs): JsonObject,
) -> Result<(StatusCode, Json<Value>), JsonApiError> {
    create_child::<Review>(app, "place_id", id, attrs).await
}

/// 201 for a new link, 200 when the amenity was already linked.
pub async fn link_amenity(
    State(app): State<AppState>,
    Path((id, amenity_id)): Path<(String, String)>,
) -> Result<(StatusCode, Json<Value>), JsonApiError> {
    let (amenity, created) = scoped(app.storage.as_ref(), |s| Box::pin(async move {
        relations::link_amenity(s, &id, &amenity_id).await
    }))
    .await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(amenity.to_json())))
}

pub async fn unlink_amenity(
    State(app): State<AppState>,
    Path((id, amenity_id)): Path<(String, String)>,
) -> Result<Json<Value>, JsonApiError> {
    scoped(app.storage.as_ref(), |s| Box::pin(async move {
        relations::unlink_amenity(s, &id, &amenity_id).await
    }))
    .await?;
    Ok(Json(json!({})))
}
