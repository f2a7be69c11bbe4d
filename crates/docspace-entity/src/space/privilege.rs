//! Space privilege levels granted by the external authorization system.
//!
//! The core reads these but never assigns them; authorization decisions
//! come from the [`CapabilityChecker`](docspace_core::traits::CapabilityChecker)
//! collaborator.

use serde::{Deserialize, Serialize};

use docspace_core::traits::Capability;

/// A user's privilege over a document space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentSpacePrivilege {
    /// May read the tree and download objects.
    Viewer,
    /// May additionally mutate the tree.
    Editor,
    /// Full control over the space.
    Admin,
}

impl DocumentSpacePrivilege {
    /// Whether this privilege grants the given capability.
    pub fn grants(&self, capability: Capability) -> bool {
        match capability {
            Capability::Read => true,
            Capability::Write => matches!(self, Self::Editor | Self::Admin),
            Capability::Admin => matches!(self, Self::Admin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privilege_ordering() {
        assert!(DocumentSpacePrivilege::Viewer < DocumentSpacePrivilege::Editor);
        assert!(DocumentSpacePrivilege::Editor < DocumentSpacePrivilege::Admin);
    }

    #[test]
    fn test_grants() {
        assert!(DocumentSpacePrivilege::Viewer.grants(Capability::Read));
        assert!(!DocumentSpacePrivilege::Viewer.grants(Capability::Write));
        assert!(DocumentSpacePrivilege::Editor.grants(Capability::Write));
        assert!(!DocumentSpacePrivilege::Editor.grants(Capability::Admin));
        assert!(DocumentSpacePrivilege::Admin.grants(Capability::Admin));
    }
}
