//! Document space entities.

pub mod model;
pub mod privilege;

pub use model::DocumentSpace;
pub use privilege::DocumentSpacePrivilege;
