//! HTTP/REST API layer for Parlor.
//!
//! Axum-based REST API with plain JSON bodies, a structured error envelope,
//! and permissive CORS.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
