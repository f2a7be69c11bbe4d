//! # docspace-webdav
//!
//! A minimal WebDAV projection of a space's tree: PROPFIND renders a
//! folder and its immediate children as a multistatus document, MKCOL
//! creates folders. Nothing else of RFC 4918 is modeled.

pub mod handler;
pub mod methods;
pub mod properties;

pub use handler::DavHandler;
