//! Per-user access metadata.

pub mod model;

pub use model::FileSystemAccessRecord;
