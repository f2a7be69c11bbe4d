//! Shared type definitions.

pub mod id;

pub use id::{CollectionId, EntryId, PathId, SpaceId, UserId};
