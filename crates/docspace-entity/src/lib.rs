//! # docspace-entity
//!
//! Domain entity models for Document Space. Every struct in this crate
//! represents a metadata-store row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod access;
pub mod collection;
pub mod entry;
pub mod space;
