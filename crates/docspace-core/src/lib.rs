//! # docspace-core
//!
//! Core crate for Document Space. Contains the unified error system,
//! typed identifiers, configuration schemas, and the traits for the
//! external collaborators (object store, capability checker).
//!
//! This crate has **no** internal dependencies on other Document Space
//! crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
