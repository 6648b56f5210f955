//! Entries shown by the browser and the wire records they are built from.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

// =============================================================================
// Entries
// =============================================================================

/// What an entry represents in the object store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// Top-level namespace (only listed at root)
    Bucket,
    /// Synthetic directory: a common prefix shared by one or more keys
    Directory,
    /// Stored bytes
    Object,
}

impl EntryKind {
    /// Buckets and synthetic directories can be navigated into.
    pub fn is_container(self) -> bool {
        matches!(self, Self::Bucket | Self::Directory)
    }
}

/// One row of a listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Last path segment (no separators)
    pub name: String,
    pub kind: EntryKind,
    /// Size in bytes (objects only)
    pub size: Option<u64>,
    /// Last modification time as Unix timestamp
    pub last_modified: Option<u64>,
}

impl Entry {
    pub fn bucket(name: impl Into<String>, last_modified: Option<u64>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Bucket,
            size: None,
            last_modified,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
            size: None,
            last_modified: None,
        }
    }

    pub fn object(name: impl Into<String>, size: Option<u64>, last_modified: Option<u64>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Object,
            size,
            last_modified,
        }
    }

    #[inline]
    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }
}

/// Sort a listing: containers first, then objects, alphabetical within each group.
pub fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(|a, b| match (a.is_container(), b.is_container()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name.cmp(&b.name),
    });
}

// =============================================================================
// Wire Records
// =============================================================================

/// Bucket record from `listBuckets`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BucketRecord {
    pub name: String,
    #[serde(default)]
    pub updated: Option<u64>,
}

/// Object record from `listFiles` and `saveFile`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ObjectRecord {
    /// Full object key
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub updated: Option<u64>,
}

/// Response of `listFiles`.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ObjectListing {
    /// Common prefixes (each ending with `/`), only with a delimiter
    #[serde(default)]
    pub prefixes: Vec<String>,
    #[serde(default)]
    pub files: Vec<ObjectRecord>,
}

/// Response of `credentials`.
///
/// Flags are integers on the wire (`0` or `1`).
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CredentialsRecord {
    #[serde(default)]
    pub config_error: u8,
    #[serde(default)]
    pub login_error: u8,
}

/// Response of `login`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LoginRecord {
    pub login: String,
}

impl LoginRecord {
    pub const SUCCEEDED: &'static str = "SUCCEEDED";

    pub fn succeeded(&self) -> bool {
        self.login == Self::SUCCEEDED
    }
}

// =============================================================================
// Request Bodies
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateFolderRequest<'a> {
    pub bucket: &'a str,
    pub path: &'a str,
    pub folder_name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct SaveFileRequest<'a> {
    pub bucket: &'a str,
    pub path: &'a str,
    /// Base64-encoded bytes
    pub contents: String,
    pub overwrite: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeleteFileRequest<'a> {
    pub bucket: &'a str,
    pub path: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_entries_containers_first() {
        let mut entries = vec![
            Entry::object("b.txt", Some(1), None),
            Entry::directory("zeta"),
            Entry::object("a.txt", Some(1), None),
            Entry::directory("alpha"),
        ];
        sort_entries(&mut entries);
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta", "a.txt", "b.txt"]);
    }

    #[test]
    fn test_listing_tolerates_missing_fields() {
        let listing: ObjectListing =
            serde_json::from_str(r#"{"files":[{"name":"a/b.txt"}]}"#).unwrap();
        assert!(listing.prefixes.is_empty());
        assert_eq!(listing.files[0].name, "a/b.txt");
        assert_eq!(listing.files[0].size, None);
    }

    #[test]
    fn test_create_folder_request_uses_camel_case() {
        let body = serde_json::to_value(CreateFolderRequest {
            bucket: "b1",
            path: "docs",
            folder_name: "f1",
        })
        .unwrap();
        assert_eq!(body["folderName"], "f1");
    }
}
