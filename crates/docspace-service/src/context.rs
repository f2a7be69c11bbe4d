//! Request context carrying the caller's identity.

use docspace_core::types::UserId;

/// Identity of the caller on whose behalf an operation runs. Built by the
/// surrounding service after authentication; the core only forwards it to
/// the capability checker and audit fields.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    /// The authenticated user.
    pub user_id: UserId,
}

impl RequestContext {
    /// Create a context for a user.
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}
