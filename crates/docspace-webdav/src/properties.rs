//! WebDAV resource model and multistatus rendering (RFC 4918).

use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One resource of a PROPFIND response: the requested folder, or one of
/// its immediate children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DavResource {
    /// Full href for this resource.
    pub href: String,
    /// Whether this is a collection (folder) or a file.
    pub is_collection: bool,
    /// Display name.
    pub display_name: String,
    /// Content length in bytes (files only).
    pub content_length: u64,
    /// Last modified timestamp.
    pub last_modified: DateTime<Utc>,
    /// Creation date.
    pub creation_date: DateTime<Utc>,
    /// ETag for cache validation (files only).
    pub etag: Option<String>,
}

impl DavResource {
    /// A collection (folder) resource.
    pub fn collection(
        href: String,
        name: String,
        modified: DateTime<Utc>,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            href,
            is_collection: true,
            display_name: name,
            content_length: 0,
            last_modified: modified,
            creation_date: created,
            etag: None,
        }
    }

    /// A file resource.
    pub fn file(
        href: String,
        name: String,
        size: u64,
        modified: DateTime<Utc>,
        created: DateTime<Utc>,
        etag: Option<String>,
    ) -> Self {
        Self {
            href,
            is_collection: false,
            display_name: name,
            content_length: size,
            last_modified: modified,
            creation_date: created,
            etag,
        }
    }
}

/// PROPFIND `Depth` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// Only the resource itself.
    Zero,
    /// The resource and its immediate children.
    One,
    /// The resource and all descendants.
    Infinity,
}

impl Depth {
    /// RFC 4918 defaults a missing or unrecognized header to infinity.
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("0") => Self::Zero,
            Some("1") => Self::One,
            _ => Self::Infinity,
        }
    }
}

/// Render resources as a `<D:multistatus>` document.
pub fn render_multistatus(resources: &[DavResource]) -> String {
    let mut out = String::with_capacity(256 + resources.len() * 512);
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str("<D:multistatus xmlns:D=\"DAV:\">\n");
    for resource in resources {
        render_response(&mut out, resource);
    }
    out.push_str("</D:multistatus>\n");
    out
}

fn render_response(out: &mut String, resource: &DavResource) {
    out.push_str("  <D:response>\n");
    prop(out, 4, "D:href", &escape_text(&resource.href));
    out.push_str("    <D:propstat>\n      <D:prop>\n");

    prop(out, 8, "D:displayname", &escape_text(&resource.display_name));
    if resource.is_collection {
        out.push_str("        <D:resourcetype><D:collection/></D:resourcetype>\n");
    } else {
        out.push_str("        <D:resourcetype/>\n");
        prop(
            out,
            8,
            "D:getcontentlength",
            &resource.content_length.to_string(),
        );
    }
    prop(out, 8, "D:getlastmodified", &http_date(&resource.last_modified));
    prop(out, 8, "D:creationdate", &resource.creation_date.to_rfc3339());
    if let Some(etag) = &resource.etag {
        prop(out, 8, "D:getetag", &format!("\"{}\"", escape_text(etag)));
    }

    out.push_str("      </D:prop>\n");
    out.push_str("      <D:status>HTTP/1.1 200 OK</D:status>\n");
    out.push_str("    </D:propstat>\n");
    out.push_str("  </D:response>\n");
}

fn prop(out: &mut String, indent: usize, tag: &str, value: &str) {
    let _ = writeln!(out, "{:indent$}<{tag}>{value}</{tag}>", "");
}

/// Escape text for XML element content.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Format a timestamp as an RFC 7231 HTTP date, as `getlastmodified`
/// requires.
pub fn http_date(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Percent-encode one logical path segment for an href.
pub fn encode_segment(s: &str) -> String {
    percent_encoding::utf8_percent_encode(s, percent_encoding::NON_ALPHANUMERIC).to_string()
}

/// Convert a normalized logical path to encoded href segments.
pub fn path_to_href(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}
