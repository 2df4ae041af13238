//! Heartbeat handler.

use axum::extract::State;
use axum::http::StatusCode;

use crate::http::error::AppError;
use crate::http::extractors::user::RequestUser;
use crate::state::AppState;

/// POST /status - Refresh the `user` header's participant.
pub async fn heartbeat(
    State(state): State<AppState>,
    RequestUser(user): RequestUser,
) -> Result<StatusCode, AppError> {
    state.presence.heartbeat(&user).await?;
    Ok(StatusCode::OK)
}
