//! Typed identifiers for the Document Space domain.
//!
//! Every identifier is a newtype over [`uuid::Uuid`], so a `UserId`
//! cannot slip in where an `EntryId` is expected. [`PathId`], the stable
//! identifier embedded in object-storage keys, is deliberately a
//! different type from [`EntryId`], the row identity: no API rewrites a
//! path identifier after creation, which is what makes folder renames
//! and subtree moves pure metadata updates.
//!
//! With the `sqlx` feature enabled, every identifier maps to the
//! PostgreSQL `UUID` type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define a newtype ID wrapper around `Uuid`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Mint a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }

        #[cfg(feature = "sqlx")]
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <Uuid as sqlx::Type<sqlx::Postgres>>::type_info()
            }
        }

        #[cfg(feature = "sqlx")]
        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <Uuid as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }

        #[cfg(feature = "sqlx")]
        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                <Uuid as sqlx::Decode<'r, sqlx::Postgres>>::decode(value).map(Self)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a document space (tenant namespace).
    SpaceId
);

define_id!(
    /// Row identity of a file-system entry. Distinct from [`PathId`].
    EntryId
);

define_id!(
    /// Stable path identifier minted once per tree node. Embedded in
    /// physical object-storage keys and used for parent linkage; it never
    /// changes for the life of the entry.
    PathId
);

define_id!(
    /// Unique identifier for a user.
    UserId
);

define_id!(
    /// Unique identifier for a user collection.
    CollectionId
);

impl PathId {
    /// The reserved NIL path identifier. The space root's children carry
    /// this as their parent; no row exists for it. Every component that
    /// builds or parses keys shares this one constant.
    pub const NIL: PathId = PathId(Uuid::nil());

    /// Whether this is the reserved NIL identifier.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id_new() {
        let id1 = EntryId::new();
        let id2 = EntryId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_path_id_nil() {
        assert!(PathId::NIL.is_nil());
        assert!(!PathId::new().is_nil());
    }

    #[test]
    fn test_path_id_display() {
        let uuid = Uuid::new_v4();
        let id = PathId::from_uuid(uuid);
        assert_eq!(id.to_string(), uuid.to_string());
    }

    #[test]
    fn test_serde_roundtrip() {
        let id = SpaceId::new();
        let json = serde_json::to_string(&id).expect("serialize");
        let parsed: SpaceId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, parsed);
    }
}
