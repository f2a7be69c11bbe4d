//! # docspace-service
//!
//! The tree core of Document Space: path resolution, tree mutation,
//! materialization with drift detection, export manifests, per-user
//! access tracking, and user collections.
//!
//! Everything here issues synchronous calls to injected store
//! collaborators; the crate owns no threads or schedulers of its own.

pub mod access;
pub mod collection;
pub mod context;
pub mod entry;
pub mod tree;

pub use context::RequestContext;
pub use entry::service::EntryService;
pub use tree::materializer::TreeMaterializer;
pub use tree::resolver::PathResolver;
