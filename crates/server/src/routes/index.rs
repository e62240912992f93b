use std::collections::BTreeMap;

use axum::{extract::State, Json};
use common::types::Status;
use service::{resources, storage::scoped};

use crate::errors::JsonApiError;
use crate::state::AppState;

pub async fn status() -> Json<Status> {
    Json(Status::ok())
}

/// Number of stored objects per collection.
pub async fn stats(State(app): State<AppState>) -> Result<Json<BTreeMap<&'static str, usize>>, JsonApiError> {
    let counts = scoped(app.storage.as_ref(), |s| Box::pin(async move { resources::stats(s).await })).await?;
    Ok(Json(counts))
}

pub async fn not_found() -> JsonApiError {
    JsonApiError::not_found()
}
