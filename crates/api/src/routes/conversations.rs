use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    routes::models::{
        MarkReadRequest, MarkReadResponse, MessagesResponse, UnreadCountResponse,
    },
    util::require_bearer,
    ApiError, AppState,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListMessagesQuery {
    /// Only return messages with a greater sequence
    pub after_id: Option<i64>,
    pub limit: Option<u32>,
}

/// An absent or empty body means "up to the latest message".
fn parse_mark_read_body(body: &Bytes) -> Result<MarkReadRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(MarkReadRequest::default());
    }

    serde_json::from_slice(body)
        .map_err(|error| ApiError::bad_request(format!("invalid request body: {error}")))
}

#[utoipa::path(
    post,
    path = "/api/conversations/{conversation_id}/read",
    tag = "Conversations",
    security(("bearerAuth" = [])),
    params(
        ("conversation_id" = String, Path, description = "Conversation public identifier")
    ),
    request_body(content = MarkReadRequest, description = "Optional target message; the body may be omitted"),
    responses(
        (status = 200, description = "Conversation marked read", body = MarkReadResponse),
        (status = 400, description = "Invalid target", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Not a participant", body = crate::error::ErrorResponse),
        (status = 404, description = "Conversation or message not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Failed to mark read", body = crate::error::ErrorResponse)
    )
)]
pub async fn mark_read(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
    body: Bytes,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let user = state.authenticate(&token).await?;
    let request = parse_mark_read_body(&body)?;

    let marker = state
        .chats()
        .read_state
        .mark_read(&conversation_id, user.id, request.up_to)
        .await?;

    Ok(Json(MarkReadResponse {
        success: true,
        marker: marker.map(Into::into),
    }))
}

#[utoipa::path(
    get,
    path = "/api/conversations/{conversation_id}/messages",
    tag = "Conversations",
    security(("bearerAuth" = [])),
    params(
        ("conversation_id" = String, Path, description = "Conversation public identifier"),
        ListMessagesQuery
    ),
    responses(
        (status = 200, description = "Messages in ascending order", body = MessagesResponse),
        (status = 400, description = "Invalid paging arguments", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Not a participant", body = crate::error::ErrorResponse),
        (status = 404, description = "Conversation not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Failed to fetch messages", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
    query: Result<Query<ListMessagesQuery>, QueryRejection>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let user = state.authenticate(&token).await?;
    let Query(query) = query.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let messages = state
        .chats()
        .messages
        .list_messages(&conversation_id, user.id, query.after_id, query.limit)
        .await?;

    Ok(Json(MessagesResponse {
        messages: messages.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/conversations/{conversation_id}/unread",
    tag = "Conversations",
    security(("bearerAuth" = [])),
    params(
        ("conversation_id" = String, Path, description = "Conversation public identifier")
    ),
    responses(
        (status = 200, description = "Unread message count", body = UnreadCountResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Not a participant", body = crate::error::ErrorResponse),
        (status = 404, description = "Conversation not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Failed to count unread messages", body = crate::error::ErrorResponse)
    )
)]
pub async fn unread_count(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let user = state.authenticate(&token).await?;

    let summary = state
        .chats()
        .read_state
        .unread_count(&conversation_id, user.id)
        .await?;

    Ok(Json(summary.into()))
}
