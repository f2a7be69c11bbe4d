//! User-curated entry collections.

pub mod model;

pub use model::{CollectionMembership, UserCollection};
