//! Path resolution, tree materialization, and export.

pub mod export;
pub mod materializer;
pub mod resolver;

pub use export::{ExportEntry, ExportManifest, ExportService};
pub use materializer::TreeMaterializer;
pub use resolver::PathResolver;
