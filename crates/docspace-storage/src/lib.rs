//! # docspace-storage
//!
//! [`ObjectStore`](docspace_core::traits::ObjectStore) implementations:
//! an S3-compatible provider backed by the AWS SDK (behind the `s3`
//! feature, on by default) and an in-memory provider for tests and
//! single-node use.

pub mod providers;

#[cfg(feature = "s3")]
pub use providers::s3::S3ObjectStore;
pub use providers::connect_object_store;
pub use providers::memory::MemoryObjectStore;
