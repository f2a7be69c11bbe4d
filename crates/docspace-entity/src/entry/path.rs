//! Resolved paths and physical key translation.
//!
//! A [`PathSpec`] is the resolved form of a human path: the path-id chain
//! from the space root down to the target plus the reconstructed name
//! chain. The key translator methods here are the only place physical
//! object-storage keys are built or parsed — no other component
//! constructs a key string.

use serde::{Deserialize, Serialize};

use docspace_core::types::{PathId, SpaceId};

use super::model::FileSystemEntry;

/// The resolved form of a human path within a document space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSpec {
    /// The space the path was resolved in.
    pub document_space_id: SpaceId,
    /// The terminal entry; `None` for the space root, which has no row.
    pub entry: Option<FileSystemEntry>,
    /// The normalized human path, always starting with `/`.
    pub path: String,
    /// Path identifiers from the root down to the terminal entry. Empty
    /// for the space root.
    pub path_id_chain: Vec<PathId>,
}

impl PathSpec {
    /// The spec of a space's root.
    pub fn root(document_space_id: SpaceId) -> Self {
        Self {
            document_space_id,
            entry: None,
            path: "/".to_string(),
            path_id_chain: Vec::new(),
        }
    }

    /// Whether this spec addresses the space root.
    pub fn is_root(&self) -> bool {
        self.path_id_chain.is_empty()
    }

    /// Whether the terminal is a folder. The root counts as one.
    pub fn is_folder(&self) -> bool {
        self.entry.as_ref().map_or(true, |e| e.is_folder)
    }

    /// Name of the terminal entry, if it has one.
    pub fn item_name(&self) -> Option<&str> {
        self.entry.as_ref().map(|e| e.item_name.as_str())
    }

    /// Nesting depth below the root (0 for the root itself).
    pub fn depth(&self) -> usize {
        self.path_id_chain.len()
    }

    /// Path identifier of the terminal entry; [`PathId::NIL`] for the
    /// root. This is what children of this folder carry as their parent.
    pub fn terminal_path_id(&self) -> PathId {
        self.path_id_chain.last().copied().unwrap_or(PathId::NIL)
    }

    /// The spec of a direct child of this folder.
    pub fn child(&self, entry: FileSystemEntry) -> Self {
        let mut chain = self.path_id_chain.clone();
        chain.push(entry.path_id);
        let path = if self.is_root() {
            format!("/{}", entry.item_name)
        } else {
            format!("{}/{}", self.path, entry.item_name)
        };
        Self {
            document_space_id: self.document_space_id,
            entry: Some(entry),
            path,
            path_id_chain: chain,
        }
    }

    /// Physical key prefix of this folder:
    /// `{space}/{chain[0]}/.../{chain[n]}/`. The root's key is `{space}/`.
    pub fn folder_key(&self) -> String {
        let mut key = format!("{}/", self.document_space_id);
        for path_id in &self.path_id_chain {
            key.push_str(&path_id.to_string());
            key.push('/');
        }
        key
    }

    /// Physical key of this file: the parent folder's chain with the item
    /// name appended. `None` for the root, which has no terminal entry.
    ///
    /// The name is part of the key, which is why renaming or moving a
    /// file means copying the underlying object while renaming a folder
    /// touches no object at all.
    pub fn file_key(&self) -> Option<String> {
        let entry = self.entry.as_ref()?;
        let mut key = format!("{}/", self.document_space_id);
        for path_id in &self.path_id_chain[..self.path_id_chain.len() - 1] {
            key.push_str(&path_id.to_string());
            key.push('/');
        }
        key.push_str(&entry.item_name);
        Some(key)
    }

    /// Physical key a file named `item_name` directly under this folder
    /// would be stored at.
    pub fn file_key_for_child(&self, item_name: &str) -> String {
        format!("{}{}", self.folder_key(), item_name)
    }

    /// Physical key a sibling file of this file named `item_name` would
    /// be stored at. `None` for the root.
    pub fn sibling_file_key(&self, item_name: &str) -> Option<String> {
        self.entry.as_ref()?;
        let mut key = format!("{}/", self.document_space_id);
        for path_id in &self.path_id_chain[..self.path_id_chain.len() - 1] {
            key.push_str(&path_id.to_string());
            key.push('/');
        }
        key.push_str(item_name);
        Some(key)
    }
}

/// A physical key split back into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    /// The space segment of the key.
    pub document_space_id: SpaceId,
    /// The folder path-id segments.
    pub path_ids: Vec<PathId>,
    /// The trailing file name, absent for folder-prefix keys ending in `/`.
    pub file_name: Option<String>,
}

/// Parse a physical key produced by [`PathSpec::folder_key`] or
/// [`PathSpec::file_key`]. Returns `None` for keys this layer never
/// produced (foreign objects in the bucket).
pub fn parse_key(key: &str) -> Option<ParsedKey> {
    let mut segments = key.split('/');
    let document_space_id: SpaceId = segments.next()?.parse().ok()?;

    let rest: Vec<&str> = segments.collect();
    let (folders, file_name) = match rest.split_last() {
        Some((last, folders)) if last.is_empty() => (folders, None),
        Some((last, folders)) => (folders, Some(last.to_string())),
        None => return None,
    };

    let mut path_ids = Vec::with_capacity(folders.len());
    for segment in folders {
        path_ids.push(segment.parse().ok()?);
    }

    Some(ParsedKey {
        document_space_id,
        path_ids,
        file_name,
    })
}

/// If `key` addresses an object directly under `folder_prefix` (no deeper
/// nesting), return its name.
pub fn direct_child_name<'a>(folder_prefix: &str, key: &'a str) -> Option<&'a str> {
    let rest = key.strip_prefix(folder_prefix)?;
    if rest.is_empty() || rest.contains('/') {
        None
    } else {
        Some(rest)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use docspace_core::types::{EntryId, UserId};

    use super::*;

    fn entry(name: &str, is_folder: bool) -> FileSystemEntry {
        FileSystemEntry {
            id: EntryId::new(),
            document_space_id: SpaceId::new(),
            parent_path_id: PathId::NIL,
            path_id: PathId::new(),
            item_name: name.to_string(),
            is_folder,
            size: 0,
            etag: None,
            is_archived: false,
            created_by: UserId::new(),
            created_at: Utc::now(),
            last_modified_by: None,
            last_modified_at: Utc::now(),
            last_activity: Utc::now(),
        }
    }

    #[test]
    fn test_root_key() {
        let space = SpaceId::new();
        let root = PathSpec::root(space);
        assert_eq!(root.folder_key(), format!("{space}/"));
        assert!(root.file_key().is_none());
        assert!(root.is_root());
        assert!(root.is_folder());
    }

    #[test]
    fn test_nested_folder_and_file_keys() {
        let space = SpaceId::new();
        let root = PathSpec::root(space);

        let reports = entry("reports", true);
        let reports_pid = reports.path_id;
        let reports_spec = root.child(reports);
        assert_eq!(reports_spec.path, "/reports");
        assert_eq!(reports_spec.folder_key(), format!("{space}/{reports_pid}/"));

        let q1 = entry("q1.csv", false);
        let q1_spec = reports_spec.child(q1);
        assert_eq!(q1_spec.path, "/reports/q1.csv");
        assert_eq!(
            q1_spec.file_key().unwrap(),
            format!("{space}/{reports_pid}/q1.csv")
        );
        assert_eq!(
            reports_spec.file_key_for_child("q1.csv"),
            q1_spec.file_key().unwrap()
        );
    }

    #[test]
    fn test_parse_key_roundtrip() {
        let space = SpaceId::new();
        let root = PathSpec::root(space);
        let sub = root.child(entry("sub", true));
        let file = sub.child(entry("data.bin", false));

        let parsed = parse_key(&file.file_key().unwrap()).unwrap();
        assert_eq!(parsed.document_space_id, space);
        assert_eq!(parsed.path_ids, sub.path_id_chain);
        assert_eq!(parsed.file_name.as_deref(), Some("data.bin"));

        let parsed = parse_key(&sub.folder_key()).unwrap();
        assert_eq!(parsed.path_ids, sub.path_id_chain);
        assert!(parsed.file_name.is_none());
    }

    #[test]
    fn test_parse_key_rejects_foreign_keys() {
        assert!(parse_key("not-a-uuid/whatever").is_none());
        assert!(parse_key("").is_none());
    }

    #[test]
    fn test_direct_child_name() {
        let prefix = "space/pid/";
        assert_eq!(direct_child_name(prefix, "space/pid/a.txt"), Some("a.txt"));
        assert_eq!(direct_child_name(prefix, "space/pid/sub/a.txt"), None);
        assert_eq!(direct_child_name(prefix, "space/pid/"), None);
        assert_eq!(direct_child_name(prefix, "other/pid/a.txt"), None);
    }
}
