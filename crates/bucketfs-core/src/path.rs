//! Path translation between browser paths and bucket/key pairs.
//!
//! A browser path has the form `[<drive>:]<bucket>[/<key-prefix>...]`.
//!
//! # Path Convention
//!
//! - Root (bucket listing): no bucket, empty path
//! - Bucket root: `bucket = Some("b1")`, `path = ""`
//! - Inside a bucket: `path = "dir/sub"`, no leading or trailing slashes
//!
//! Segments are taken literally. Object keys may legitimately contain `.` or
//! `..`, so they are not resolved.

use std::fmt;
use std::str::FromStr;

/// Separator between bucket, directories and object names.
pub const SEPARATOR: char = '/';

/// Marker separating an optional drive name from the path.
const DRIVE_MARKER: char = ':';

/// A parsed location in the object store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StoragePath {
    bucket: Option<String>,
    path: String,
}

impl StoragePath {
    /// The root location (list of buckets).
    pub fn root() -> Self {
        Self::default()
    }

    /// A location inside `bucket`. `path` is normalized.
    ///
    /// An empty bucket name yields the root.
    pub fn in_bucket(bucket: impl Into<String>, path: &str) -> Self {
        let bucket = bucket.into();
        if bucket.is_empty() {
            return Self::root();
        }
        Self {
            bucket: Some(bucket),
            path: normalize(path),
        }
    }

    /// Parse a raw browser path.
    ///
    /// Everything before the first `/` is the bucket, the rest is the
    /// intra-bucket path. A leading `<drive>:` is stripped when the colon
    /// comes before any separator. Input without a bucket segment is root.
    pub fn parse(raw: &str) -> Self {
        let raw = strip_drive(raw);
        let mut segments = raw.split(SEPARATOR).filter(|s| !s.is_empty());

        let Some(bucket) = segments.next() else {
            return Self::root();
        };

        let path = segments.collect::<Vec<_>>().join("/");
        Self {
            bucket: Some(bucket.to_string()),
            path,
        }
    }

    /// Format back to a raw browser path (without drive prefix).
    pub fn format(&self) -> String {
        match &self.bucket {
            None => String::new(),
            Some(bucket) if self.path.is_empty() => bucket.clone(),
            Some(bucket) => format!("{}/{}", bucket, self.path),
        }
    }

    /// Bucket name, or `None` at root.
    pub fn bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    /// Intra-bucket path (empty at bucket root and at root).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// True when no bucket is selected.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.bucket.is_none()
    }

    /// True for the top level of a bucket.
    #[inline]
    pub fn is_bucket_root(&self) -> bool {
        self.bucket.is_some() && self.path.is_empty()
    }

    /// Number of segments below the bucket (0 at bucket root and at root).
    pub fn depth(&self) -> usize {
        if self.path.is_empty() {
            0
        } else {
            self.path.split(SEPARATOR).count()
        }
    }

    /// Last segment: the object/directory name, or the bucket at bucket root.
    pub fn name(&self) -> Option<&str> {
        if self.path.is_empty() {
            return self.bucket.as_deref();
        }
        self.path.rsplit(SEPARATOR).next()
    }

    /// Key prefix for listing the children of this location.
    ///
    /// `""` at bucket root, otherwise `path/`.
    pub fn key_prefix(&self) -> String {
        if self.path.is_empty() {
            String::new()
        } else {
            format!("{}/", self.path)
        }
    }

    /// Child location. At root the child is a bucket.
    pub fn join(&self, name: &str) -> Self {
        match &self.bucket {
            None => Self::parse(name),
            Some(bucket) => {
                let combined = if self.path.is_empty() {
                    name.to_string()
                } else {
                    format!("{}/{}", self.path, name)
                };
                Self::in_bucket(bucket.clone(), &combined)
            }
        }
    }

    /// Parent location. The parent of a bucket root is root.
    pub fn parent(&self) -> Self {
        match &self.bucket {
            None => Self::root(),
            Some(_) if self.path.is_empty() => Self::root(),
            Some(bucket) => {
                let parent = match self.path.rsplit_once(SEPARATOR) {
                    Some((parent, _)) => parent,
                    None => "",
                };
                Self::in_bucket(bucket.clone(), parent)
            }
        }
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

impl FromStr for StoragePath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Remove a `<drive>:` prefix when the colon precedes any separator.
fn strip_drive(raw: &str) -> &str {
    match raw.find(DRIVE_MARKER) {
        Some(idx) if !raw[..idx].contains(SEPARATOR) => &raw[idx + 1..],
        _ => raw,
    }
}

/// Drop empty segments, so no leading, trailing or doubled separators remain.
fn normalize(path: &str) -> String {
    path.split(SEPARATOR)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
