//! Message handlers: posting and reading the room log.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use parlor_types::message::ChatMessage;

use crate::http::error::AppError;
use crate::http::extractors::user::RequestUser;
use crate::state::AppState;

/// Query parameters for the message list.
#[derive(Debug, Deserialize, Default)]
pub struct MessageListQuery {
    /// Keep only the latest N visible messages. Anything other than a
    /// positive integer means no limit.
    pub limit: Option<String>,
}

impl MessageListQuery {
    pub fn limit(&self) -> Option<usize> {
        self.limit
            .as_deref()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|n| *n > 0)
            .and_then(|n| usize::try_from(n).ok())
    }
}

/// POST /messages - Post as the `user` header's participant.
pub async fn post(
    State(state): State<AppState>,
    RequestUser(user): RequestUser,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ChatMessage>), AppError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let message = state.messages.post(&user, &body).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /messages?limit=N - Messages visible to the `user` header's participant.
pub async fn list(
    State(state): State<AppState>,
    RequestUser(user): RequestUser,
    Query(query): Query<MessageListQuery>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let messages = state.messages.list_visible_to(&user, query.limit()).await?;
    Ok(Json(messages))
}
