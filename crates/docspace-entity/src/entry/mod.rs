//! File-system entry entities and value types.

pub mod model;
pub mod path;
pub mod tree;

pub use model::{ChildFilter, FileSystemEntry, NewEntry};
pub use path::PathSpec;
pub use tree::{FileSystemElementTree, Inconsistency};
