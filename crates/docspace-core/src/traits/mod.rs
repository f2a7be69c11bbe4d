//! Traits for the external collaborators of the tree core.

pub mod capability;
pub mod object_store;

pub use capability::{Capability, CapabilityChecker};
pub use object_store::{ObjectMeta, ObjectStore};
