use axum::Json;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::conversations::mark_read,
        crate::routes::conversations::list_messages,
        crate::routes::conversations::unread_count,
        crate::routes::messages::search_messages,
        crate::routes::notifications::mark_all_read
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::routes::health::HealthResponse,
            crate::routes::models::Message,
            crate::routes::models::ReadMarker,
            crate::routes::models::MarkReadRequest,
            crate::routes::models::MarkReadResponse,
            crate::routes::models::MessagesResponse,
            crate::routes::models::SearchResponse,
            crate::routes::models::UnreadCountResponse,
            crate::routes::models::BulkUpdateResponse
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Conversations", description = "Read state and message history"),
        (name = "Messages", description = "Message search"),
        (name = "Notifications", description = "User notifications")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        let schemes = &mut components.security_schemes;

        let mut scheme = SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer));
        if let SecurityScheme::Http(http) = &mut scheme {
            http.bearer_format = Some("Bearer".to_string());
        }

        schemes.insert("bearerAuth".to_string(), scheme);
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
