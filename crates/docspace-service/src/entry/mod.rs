//! Tree mutation.

pub mod service;

pub use service::EntryService;
