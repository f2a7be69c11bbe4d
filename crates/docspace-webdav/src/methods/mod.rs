//! WebDAV method implementations. Only PROPFIND and MKCOL are modeled.

pub mod mkcol;
pub mod propfind;
