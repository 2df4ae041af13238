//! Shared domain types for Parlor.
//!
//! This crate contains the core domain types used across the chat backend:
//! participants, chat messages, validation violations, configuration, and
//! their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod error;
pub mod message;
pub mod participant;
pub mod validation;
