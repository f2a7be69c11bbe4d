//! # docspace-database
//!
//! The metadata-store surface of Document Space: the store traits the
//! tree core is written against, the concrete PostgreSQL repositories,
//! and a single-node in-memory implementation with identical semantics.
//!
//! The traits live here rather than in `docspace-core` because they are
//! expressed over entity rows, and the core crate carries no internal
//! dependencies.

pub mod connection;
pub mod memory;
pub mod repositories;
pub mod store;

pub use connection::{DatabasePool, MetadataStores};
pub use memory::MemoryMetadataStore;
pub use store::{AccessRecordStore, CollectionStore, EntryStore, SpaceStore};
