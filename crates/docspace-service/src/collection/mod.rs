//! User-curated collections.

pub mod service;

pub use service::CollectionService;
