//! Capability checker trait — the external authorization collaborator.
//!
//! The core never decides authorization itself. Every mutating operation
//! consults the checker first and aborts with `Forbidden` on deny.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{SpaceId, UserId};

/// The operation classes a caller may be granted over a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Capability {
    /// Resolve paths, list children, read objects.
    Read,
    /// Create, rename, move, archive, and delete entries.
    Write,
    /// Space-level administration.
    Admin,
}

/// Decides whether a caller may perform an operation class on a space.
#[async_trait]
pub trait CapabilityChecker: Send + Sync + std::fmt::Debug + 'static {
    /// Return whether `user_id` holds `capability` over `space_id`.
    async fn allows(
        &self,
        user_id: UserId,
        space_id: SpaceId,
        capability: Capability,
    ) -> AppResult<bool>;
}
