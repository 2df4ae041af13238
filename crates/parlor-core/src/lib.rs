//! Business logic and repository trait definitions for Parlor.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements, plus the services built on them: the validation gate,
//! the presence registry, the message log, and the reaper. It depends only on
//! `parlor-types` -- never on `parlor-infra` or any database/IO crate.

pub mod clock;
pub mod reaper;
pub mod repository;
pub mod service;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;
