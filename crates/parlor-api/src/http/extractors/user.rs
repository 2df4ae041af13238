//! `user` header extractor.
//!
//! Message and heartbeat routes identify the caller by the `user` request
//! header. A missing or non-UTF-8 header yields an empty name, which never
//! matches a participant, so the handler reports it as an unknown user.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Header carrying the caller's participant name.
pub const USER_HEADER: &str = "user";

/// The caller named by the `user` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUser(pub String);

impl<S: Send + Sync> FromRequestParts<S> for RequestUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        Ok(RequestUser(user))
    }
}
