use axum::{
    routing::{get, post},
    Router,
};
use models::{Amenity, City, Place, Review, State, User};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod body;
pub mod index;
pub mod nested;
pub mod resources;

/// `GET`/`POST` on the collection, `GET`/`PUT`/`DELETE` on one item.
fn collection<T: models::Resource>(path: &str) -> Router<AppState> {
    Router::new()
        .route(path, get(resources::list::<T>).post(resources::create::<T>))
        .route(
            &format!("{path}/:id"),
            get(resources::show::<T>).put(resources::update::<T>).delete(resources::destroy::<T>),
        )
}

/// Everything under `/api/v1`.
fn api() -> Router<AppState> {
    Router::new()
        .route("/status", get(index::status))
        .route("/stats", get(index::stats))
        .merge(collection::<State>("/states"))
        .merge(collection::<City>("/cities"))
        .merge(collection::<User>("/users"))
        .merge(collection::<Place>("/places"))
        .merge(collection::<Review>("/reviews"))
        .merge(collection::<Amenity>("/amenities"))
        .route("/states/:id/cities", get(nested::state_cities).post(nested::create_city))
        .route("/cities/:id/places", get(nested::city_places).post(nested::create_place))
        .route("/places/:id/reviews", get(nested::place_reviews).post(nested::create_review))
        .route("/places/:id/amenities", get(nested::place_amenities))
        .route(
            "/places/:id/amenities/:amenity_id",
            post(nested::link_amenity).delete(nested::unlink_amenity),
        )
}

/// Build the full application router
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .nest("/api/v1", api())
        .fallback(index::not_found)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 请求到达时打点
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
