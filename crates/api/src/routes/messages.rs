use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::HeaderMap,
    Json,
};
use parlor_chats::SearchQuery;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{routes::models::SearchResponse, util::require_bearer, ApiError, AppState};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Search text; at least two characters after trimming
    pub q: Option<String>,
    /// Restrict the search to one conversation
    pub conversation_id: Option<String>,
    pub limit: Option<u32>,
}

impl SearchParams {
    fn into_query(self) -> SearchQuery {
        SearchQuery {
            query: self.q.unwrap_or_default(),
            // an empty filter means "all conversations"
            conversation_id: self.conversation_id.filter(|id| !id.trim().is_empty()),
            limit: self.limit,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/messages/search",
    tag = "Messages",
    security(("bearerAuth" = [])),
    params(SearchParams),
    responses(
        (status = 200, description = "Matching messages, newest first", body = SearchResponse),
        (status = 400, description = "Query shorter than two characters", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 403, description = "Not a participant of the filtered conversation", body = crate::error::ErrorResponse),
        (status = 404, description = "Filtered conversation not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Search failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let user = state.authenticate(&token).await?;
    let Query(params) = params.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let query = params.into_query();
    let messages = state.chats().search.search(user.id, &query).await?;

    Ok(Json(SearchResponse {
        messages: messages.into_iter().map(Into::into).collect(),
        query: query.query.trim().to_string(),
        conversation_id: query.conversation_id,
    }))
}
