//! Per-user access metadata tracking.

pub mod service;

pub use service::AccessTracker;
