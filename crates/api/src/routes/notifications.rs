use axum::{extract::State, http::HeaderMap, Json};

use crate::{routes::models::BulkUpdateResponse, util::require_bearer, ApiError, AppState};

#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    tag = "Notifications",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "All notifications marked read", body = BulkUpdateResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 500, description = "Failed to update notifications", body = crate::error::ErrorResponse)
    )
)]
pub async fn mark_all_read(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BulkUpdateResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let user = state.authenticate(&token).await?;

    let updated_count = state.chats().notifications.mark_all_read(user.id).await?;

    Ok(Json(BulkUpdateResponse {
        success: true,
        updated_count,
    }))
}
