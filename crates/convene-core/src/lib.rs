//! Convene Core — domain models, repository trait definitions, error
//! taxonomy, and validation utilities.
//!
//! This crate has no I/O of its own. Persistence is reached through the
//! repository traits in [`repository`], implemented by `convene-db`, and
//! the business invariants live in `convene-service`.

pub mod error;
pub mod models;
pub mod repository;
pub mod validate;

pub use error::{CoreError, CoreResult};
