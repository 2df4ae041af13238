//! Participant handlers: registration and roster.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde_json::Value;

use parlor_types::participant::Participant;

use crate::http::error::AppError;
use crate::state::AppState;

/// POST /participants - Join the room.
///
/// A body that is not JSON is treated as a missing name.
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Participant>), AppError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let participant = state.presence.register(body.get("name")).await?;
    Ok((StatusCode::CREATED, Json(participant)))
}

/// GET /participants - Everyone currently in the room.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Participant>>, AppError> {
    Ok(Json(state.presence.list_participants().await?))
}
