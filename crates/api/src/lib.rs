mod error;
mod middleware;
mod state;
mod util;

pub mod docs;
pub mod routes;

pub use error::{ApiError, ErrorResponse};
pub use state::AppState;

use axum::{
    http::header::{AUTHORIZATION, CONTENT_TYPE},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/docs/openapi.json", get(docs::openapi_json))
        // Conversation routes
        .route(
            "/api/conversations/:conversation_id/read",
            post(routes::conversations::mark_read),
        )
        .route(
            "/api/conversations/:conversation_id/messages",
            get(routes::conversations::list_messages),
        )
        .route(
            "/api/conversations/:conversation_id/unread",
            get(routes::conversations::unread_count),
        )
        // Search
        .route("/api/messages/search", get(routes::messages::search_messages))
        // Notifications
        .route(
            "/api/notifications/read-all",
            post(routes::notifications::mark_all_read),
        )
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::logging_middleware))
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
