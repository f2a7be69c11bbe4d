//! Document space entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docspace_core::types::SpaceId;

/// A tenant-isolated namespace holding one hierarchical tree of folders
/// and files.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentSpace {
    /// Unique space identifier.
    pub id: SpaceId,
    /// Space name, unique across the deployment.
    pub name: String,
    /// When the space was created.
    pub created_at: DateTime<Utc>,
}
