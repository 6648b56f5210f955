//! Directory semantics over an object store.
//!
//! The backing store only knows buckets and flat keys. Directories are
//! synthesized from common prefixes, folders are zero-byte placeholder
//! objects ending with `/`, and copy/move are read-write(-delete) sequences.
//!
//! # Guards
//!
//! Requests that are known to be invalid fail with
//! [`DriveError::InvalidOperation`] before the gateway is touched:
//! creating or writing at root, deleting a bucket, names containing `/`.
//!
//! # Consistency
//!
//! The store is pull-only and eventually consistent. A listing right after a
//! write may not show it yet; [`StorageDrive::refresh`] simply lists again.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::de::DeserializeOwned;

use crate::actions::NO_FOLDER_AT_ROOT;
use crate::busy::BusyController;
use crate::config::{CONTENT_FORMAT, DELIMITER, endpoints};
use crate::error::{DriveError, ItemFailure};
use crate::events::EventChannel;
use crate::gateway::{Body, Gateway, RequestInit};
use crate::models::{
    BucketRecord, CreateFolderRequest, CredentialsRecord, DeleteFileRequest, Entry, EntryKind,
    LoginRecord, ObjectListing, ObjectRecord, SaveFileRequest, sort_entries,
};
use crate::path::{SEPARATOR, StoragePath};
use crate::transport::Transport;

pub(crate) const NO_BUCKET_DELETE: &str = "deleting a bucket is not allowed";
pub(crate) const NO_BUCKET_TRANSFER: &str = "buckets cannot be copied or moved";
const NO_OBJECT_AT_ROOT: &str = "files cannot be stored outside of a bucket";
const NO_ROOT_DELETE: &str = "the bucket list cannot be deleted";

/// Credential state of the server-side session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    /// Credentials are valid; storage calls will succeed
    Ready,
    /// The server has no usable storage configuration
    ConfigError,
    /// An interactive login is needed first
    LoginRequired,
}

/// A listing produced by [`StorageDrive::refresh`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Refreshed {
    pub path: StoragePath,
    pub entries: Vec<Entry>,
}

/// Filesystem adapter over the storage API.
pub struct StorageDrive<T> {
    gateway: Gateway<T>,
    busy: BusyController,
    refreshed: EventChannel<Refreshed>,
}

impl<T: Transport> StorageDrive<T> {
    /// Drive with a busy controller that renders nothing.
    pub fn new(gateway: Gateway<T>) -> Self {
        Self {
            gateway,
            busy: BusyController::detached(),
            refreshed: EventChannel::new(),
        }
    }

    /// Report pending operations to `busy`.
    pub fn with_busy(mut self, busy: BusyController) -> Self {
        self.busy = busy;
        self
    }

    pub fn busy(&self) -> &BusyController {
        &self.busy
    }

    pub fn gateway(&self) -> &Gateway<T> {
        &self.gateway
    }

    /// Listings produced by [`refresh`](Self::refresh).
    pub fn refreshed(&self) -> &EventChannel<Refreshed> {
        &self.refreshed
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Query the credential state of the server-side session.
    pub async fn session_status(&self) -> Result<SessionStatus, DriveError> {
        let _busy = self.busy.begin();
        let record: CredentialsRecord = self
            .fetch(endpoints::CREDENTIALS, RequestInit::get())
            .await?;

        Ok(if record.config_error != 0 {
            SessionStatus::ConfigError
        } else if record.login_error != 0 {
            SessionStatus::LoginRequired
        } else {
            SessionStatus::Ready
        })
    }

    /// Trigger the interactive login. Returns whether it succeeded.
    pub async fn login(&self) -> Result<bool, DriveError> {
        let _busy = self.busy.begin();
        let record: LoginRecord = self.fetch(endpoints::LOGIN, RequestInit::post()).await?;
        tracing::debug!("login finished: {}", record.login);
        Ok(record.succeeded())
    }

    // =========================================================================
    // Reading
    // =========================================================================

    /// List one level below `path`.
    ///
    /// At root this lists buckets. Inside a bucket, common prefixes become
    /// directories and keys become objects; folder placeholders are hidden.
    /// A path without matching keys yields an empty listing.
    pub async fn list(&self, path: &StoragePath) -> Result<Vec<Entry>, DriveError> {
        let _busy = self.busy.begin();
        tracing::debug!("list: {:?}", path.format());

        let Some(bucket) = path.bucket() else {
            return self.list_buckets().await;
        };

        let prefix = path.key_prefix();
        let listing = self.list_files(bucket, &prefix, true).await?;

        let directories = listing.prefixes.iter().filter_map(|p| {
            let name = p.strip_prefix(&prefix)?.trim_end_matches(SEPARATOR);
            (!name.is_empty()).then(|| Entry::directory(name))
        });
        let objects = listing.files.iter().filter_map(|f| {
            let name = f.name.strip_prefix(&prefix)?;
            (!name.is_empty() && !name.contains(SEPARATOR))
                .then(|| Entry::object(name, f.size, f.updated))
        });

        let mut entries: Vec<Entry> = directories.chain(objects).collect();
        sort_entries(&mut entries);
        Ok(entries)
    }

    /// Read the bytes of an object.
    pub async fn read(&self, bucket: &str, key: &str) -> Result<Vec<u8>, DriveError> {
        if bucket.is_empty() {
            return Err(DriveError::invalid(NO_OBJECT_AT_ROOT));
        }
        let _busy = self.busy.begin();
        tracing::debug!("read: {}/{}", bucket, key);

        let init = RequestInit::get()
            .query("bucket", bucket)
            .query("path", key)
            .query("format", CONTENT_FORMAT);
        let body = self.gateway.request(endpoints::LOAD_FILE, init).await?;
        if let Some(error) = body.embedded_error() {
            return Err(DriveError::Backend(error));
        }

        let encoded = body.to_text();
        STANDARD
            .decode(encoded.trim())
            .map_err(|e| DriveError::Decode(format!("content of {} is not base64: {}", key, e)))
    }

    /// Metadata of the object stored under exactly `key`.
    pub async fn stat(&self, bucket: &str, key: &str) -> Result<Option<Entry>, DriveError> {
        if bucket.is_empty() || key.is_empty() {
            return Ok(None);
        }
        let _busy = self.busy.begin();
        let listing = self.list_files(bucket, key, true).await?;
        let name = key.rsplit(SEPARATOR).next().unwrap_or(key);
        Ok(listing
            .files
            .into_iter()
            .find(|f| f.name == key)
            .map(|f| Entry::object(name, f.size, f.updated)))
    }

    /// True when an object with exactly this key exists.
    pub async fn exists(&self, bucket: &str, key: &str) -> Result<bool, DriveError> {
        Ok(self.stat(bucket, key).await?.is_some())
    }

    /// Re-list `path` and publish the result on [`refreshed`](Self::refreshed).
    pub async fn refresh(&self, path: &StoragePath) -> Result<Vec<Entry>, DriveError> {
        let entries = self.list(path).await?;
        self.refreshed.emit(&Refreshed {
            path: path.clone(),
            entries: entries.clone(),
        });
        Ok(entries)
    }

    // =========================================================================
    // Writing
    // =========================================================================

    /// Create folder `name` below `path` as a placeholder object.
    ///
    /// Creating an existing folder succeeds.
    pub async fn mkdir(&self, path: &StoragePath, name: &str) -> Result<Entry, DriveError> {
        let Some(bucket) = path.bucket() else {
            return Err(DriveError::invalid(NO_FOLDER_AT_ROOT));
        };
        validate_name(name)?;
        let _busy = self.busy.begin();
        tracing::debug!("mkdir: {:?} in {:?}", name, path.format());

        let init = RequestInit::post_json(&CreateFolderRequest {
            bucket,
            path: path.path(),
            folder_name: name,
        })?;
        let body = self.gateway.request(endpoints::CREATE_FOLDER, init).await?;
        if let Some(error) = body.embedded_error() {
            return Err(DriveError::Backend(error));
        }
        Ok(Entry::directory(name))
    }

    /// Put an object.
    ///
    /// With `overwrite == false` the backend refuses to replace an existing
    /// key; the caller decides, the drive never overwrites on its own.
    pub async fn write(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        overwrite: bool,
    ) -> Result<Entry, DriveError> {
        if bucket.is_empty() {
            return Err(DriveError::invalid(NO_OBJECT_AT_ROOT));
        }
        let name = key.rsplit(SEPARATOR).next().unwrap_or_default();
        validate_name(name)?;
        let _busy = self.busy.begin();
        tracing::debug!("write: {}/{} ({} bytes, overwrite={})", bucket, key, bytes.len(), overwrite);

        let init = RequestInit::post_json(&SaveFileRequest {
            bucket,
            path: key,
            contents: STANDARD.encode(bytes),
            overwrite,
        })?;
        let body = self.gateway.request(endpoints::SAVE_FILE, init).await?;
        if let Some(error) = body.embedded_error() {
            return Err(DriveError::Backend(error));
        }

        let (size, updated) = match body.parse::<ObjectRecord>() {
            Some(record) => (record.size, record.updated),
            None => (Some(bytes.len() as u64), None),
        };
        Ok(Entry::object(name, size, updated))
    }

    /// Delete the object at `path`, or every object under the synthetic
    /// directory `path` when `kind` is [`EntryKind::Directory`].
    ///
    /// An object and a folder may share a name; `kind` picks which one goes.
    /// Returns the number of deleted objects. Failures of single objects do
    /// not stop the others and are reported as [`DriveError::Partial`].
    pub async fn remove(&self, path: &StoragePath, kind: EntryKind) -> Result<usize, DriveError> {
        let Some(bucket) = path.bucket() else {
            return Err(DriveError::invalid(NO_ROOT_DELETE));
        };
        if path.is_bucket_root() || kind == EntryKind::Bucket {
            return Err(DriveError::invalid(NO_BUCKET_DELETE));
        }
        let _busy = self.busy.begin();
        tracing::debug!("remove: {:?} ({:?})", path.format(), kind);

        let keys = self.keys_of(bucket, path.path(), kind).await?;
        if keys.is_empty() {
            return Err(DriveError::NotFound(path.format()));
        }

        let mut completed = 0;
        let mut failures = Vec::new();
        for key in keys {
            match self.delete_object(bucket, &key).await {
                Ok(()) => completed += 1,
                Err(err) => failures.push(ItemFailure {
                    key,
                    error: Box::new(err),
                }),
            }
        }
        settle(completed, failures)
    }

    /// Copy an object or a directory tree from `src` to `dst`.
    ///
    /// Existing destination keys are not replaced. Returns the number of
    /// copied objects.
    pub async fn copy(
        &self,
        src: &StoragePath,
        dst: &StoragePath,
        kind: EntryKind,
    ) -> Result<usize, DriveError> {
        self.transfer(src, dst, kind, false).await
    }

    /// Move an object or a directory tree from `src` to `dst`.
    ///
    /// Each object is read, written, then deleted at the source. Not atomic:
    /// when the delete fails both copies remain and the key is reported.
    pub async fn move_to(
        &self,
        src: &StoragePath,
        dst: &StoragePath,
        kind: EntryKind,
    ) -> Result<usize, DriveError> {
        self.transfer(src, dst, kind, true).await
    }

    async fn transfer(
        &self,
        src: &StoragePath,
        dst: &StoragePath,
        kind: EntryKind,
        remove_source: bool,
    ) -> Result<usize, DriveError> {
        let (Some(src_bucket), Some(dst_bucket)) = (src.bucket(), dst.bucket()) else {
            return Err(DriveError::invalid(NO_BUCKET_TRANSFER));
        };
        if src.is_bucket_root() || dst.is_bucket_root() || kind == EntryKind::Bucket {
            return Err(DriveError::invalid(NO_BUCKET_TRANSFER));
        }
        if src_bucket == dst_bucket {
            if dst.path() == src.path() {
                return Err(DriveError::invalid("source and destination are the same"));
            }
            if kind == EntryKind::Directory && dst.path().starts_with(&src.key_prefix()) {
                return Err(DriveError::invalid("cannot copy or move a folder into itself"));
            }
        }

        let _busy = self.busy.begin();
        tracing::debug!(
            "{}: {:?} -> {:?} ({:?})",
            if remove_source { "move" } else { "copy" },
            src.format(),
            dst.format(),
            kind
        );

        let keys = self.keys_of(src_bucket, src.path(), kind).await?;
        if keys.is_empty() {
            return Err(DriveError::NotFound(src.format()));
        }

        let mut completed = 0;
        let mut failures = Vec::new();
        for src_key in keys {
            let dst_key = rebase(&src_key, src.path(), dst.path());
            let result = self
                .transfer_object(src_bucket, &src_key, dst_bucket, &dst_key, remove_source)
                .await;
            match result {
                Ok(()) => completed += 1,
                Err(err) => {
                    tracing::warn!("transfer of {} failed: {}", src_key, err);
                    failures.push(ItemFailure {
                        key: src_key,
                        error: Box::new(err),
                    });
                }
            }
        }
        settle(completed, failures)
    }

    async fn transfer_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
        remove_source: bool,
    ) -> Result<(), DriveError> {
        if src_key.ends_with(SEPARATOR) {
            // Folder placeholder: recreate it, there are no bytes to carry
            let (parent, name) = split_placeholder(dst_key);
            let parent = StoragePath::in_bucket(dst_bucket, parent);
            self.mkdir(&parent, name).await?;
        } else {
            let bytes = self.read(src_bucket, src_key).await?;
            self.write(dst_bucket, dst_key, &bytes, false).await?;
        }

        if remove_source {
            self.delete_object(src_bucket, src_key).await?;
        }
        Ok(())
    }

    // =========================================================================
    // Requests
    // =========================================================================

    async fn list_buckets(&self) -> Result<Vec<Entry>, DriveError> {
        let records: Vec<BucketRecord> = self
            .fetch(endpoints::LIST_BUCKETS, RequestInit::get().query("prefix", ""))
            .await?;
        let mut entries: Vec<Entry> = records
            .into_iter()
            .map(|b| Entry::bucket(b.name, b.updated))
            .collect();
        sort_entries(&mut entries);
        Ok(entries)
    }

    async fn list_files(
        &self,
        bucket: &str,
        prefix: &str,
        delimited: bool,
    ) -> Result<ObjectListing, DriveError> {
        let mut init = RequestInit::get().query("bucket", bucket).query("prefix", prefix);
        if delimited {
            init = init.query("delimiter", DELIMITER);
        }
        self.fetch(endpoints::LIST_FILES, init).await
    }

    /// Keys an entry of `kind` at `path` stands for: the key itself for an
    /// object, every key below `path/` for a directory.
    async fn keys_of(
        &self,
        bucket: &str,
        path: &str,
        kind: EntryKind,
    ) -> Result<Vec<String>, DriveError> {
        let dir_prefix = format!("{}{}", path, SEPARATOR);
        let prefix = match kind {
            EntryKind::Object => path,
            EntryKind::Directory | EntryKind::Bucket => dir_prefix.as_str(),
        };
        let listing = self.list_files(bucket, prefix, false).await?;
        Ok(listing
            .files
            .into_iter()
            .map(|f| f.name)
            .filter(|key| match kind {
                EntryKind::Object => key == path,
                EntryKind::Directory | EntryKind::Bucket => key.starts_with(&dir_prefix),
            })
            .collect())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), DriveError> {
        let init = RequestInit::post_json(&DeleteFileRequest { bucket, path: key })?;
        let body = self.gateway.request(endpoints::DELETE_FILE, init).await?;
        match body.embedded_error() {
            Some(error) => Err(DriveError::Backend(error)),
            None => Ok(()),
        }
    }

    /// Request `endpoint` and decode a JSON answer of type `R`.
    async fn fetch<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        init: RequestInit,
    ) -> Result<R, DriveError> {
        let body = self.gateway.request(endpoint, init).await?;
        decode(endpoint, body)
    }
}

/// Decode a success body, surfacing an `{"error": ...}` payload first.
fn decode<R: DeserializeOwned>(endpoint: &str, body: Body) -> Result<R, DriveError> {
    if let Some(error) = body.embedded_error() {
        return Err(DriveError::Backend(error));
    }
    body.parse::<R>()
        .ok_or_else(|| DriveError::Decode(format!("{}: {}", endpoint, body.to_text())))
}

fn settle(completed: usize, failures: Vec<ItemFailure>) -> Result<usize, DriveError> {
    if failures.is_empty() {
        Ok(completed)
    } else {
        Err(DriveError::Partial {
            completed,
            failures,
        })
    }
}

/// Replace the `from` prefix of `key` by `to`.
fn rebase(key: &str, from: &str, to: &str) -> String {
    match key.strip_prefix(from) {
        Some(rest) => format!("{}{}", to, rest),
        None => key.to_string(),
    }
}

/// `a/b/c/` -> (`a/b`, `c`)
fn split_placeholder(key: &str) -> (&str, &str) {
    let trimmed = key.trim_end_matches(SEPARATOR);
    match trimmed.rsplit_once(SEPARATOR) {
        Some((parent, name)) => (parent, name),
        None => ("", trimmed),
    }
}

/// Entry names must be non-empty and must not contain the separator.
pub(crate) fn validate_name(name: &str) -> Result<(), DriveError> {
    if name.trim().is_empty() {
        return Err(DriveError::invalid("name must not be empty"));
    }
    if name.contains(SEPARATOR) {
        return Err(DriveError::invalid(format!(
            "name '{}' must not contain '{}'",
            name, SEPARATOR
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::mock::{InjectedFailure, MockBackend, RecordingBusyView};

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_root_returns_buckets() {
        let backend = MockBackend::new().with_bucket("zeta").with_bucket("alpha");
        let drive = backend.drive().unwrap();

        let entries = drive.list(&StoragePath::root()).await.unwrap();
        assert_eq!(names(&entries), vec!["alpha", "zeta"]);
        assert!(entries.iter().all(|e| e.kind == EntryKind::Bucket));
    }

    #[tokio::test]
    async fn test_list_synthesizes_directories_and_hides_placeholders() {
        let backend = MockBackend::new()
            .with_object("b1", "readme.md", b"hi")
            .with_object("b1", "docs/", b"")
            .with_object("b1", "docs/guide.md", b"guide")
            .with_object("b1", "docs/api/v1.md", b"v1")
            .with_object("b1", "empty/", b"");
        let drive = backend.drive().unwrap();

        let root = drive.list(&StoragePath::parse("b1")).await.unwrap();
        assert_eq!(names(&root), vec!["docs", "empty", "readme.md"]);
        assert_eq!(root[2].size, Some(2));

        let docs = drive.list(&StoragePath::parse("b1/docs")).await.unwrap();
        assert_eq!(names(&docs), vec!["api", "guide.md"]);
        assert_eq!(docs[0].kind, EntryKind::Directory);

        let empty = drive.list(&StoragePath::parse("b1/empty")).await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_list_without_matches_is_empty() {
        let backend = MockBackend::new().with_bucket("b1");
        let drive = backend.drive().unwrap();
        let entries = drive.list(&StoragePath::parse("b1/nothing/here")).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_mkdir_at_root_never_reaches_network() {
        let backend = MockBackend::new();
        let drive = backend.drive().unwrap();

        let err = drive.mkdir(&StoragePath::root(), "f1").await.unwrap_err();
        assert!(err.is_invalid_operation());
        assert_eq!(err.to_string(), NO_FOLDER_AT_ROOT);

        let err = drive.write("", "a.txt", b"x", false).await.unwrap_err();
        assert!(err.is_invalid_operation());
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_mkdir_creates_placeholder_and_is_idempotent() {
        let backend = MockBackend::new().with_bucket("b1");
        let drive = backend.drive().unwrap();
        let bucket = StoragePath::parse("b1");

        drive.mkdir(&bucket, "f1").await.unwrap();
        drive.mkdir(&bucket, "f1").await.unwrap();
        drive.mkdir(&bucket.join("f1"), "inner").await.unwrap();

        assert_eq!(backend.keys("b1"), vec!["f1/", "f1/inner/"]);
        let entries = drive.list(&bucket).await.unwrap();
        assert_eq!(entries, vec![Entry::directory("f1")]);
    }

    #[tokio::test]
    async fn test_mkdir_rejects_invalid_names() {
        let backend = MockBackend::new().with_bucket("b1");
        let drive = backend.drive().unwrap();
        for name in ["", "  ", "a/b"] {
            let err = drive.mkdir(&StoragePath::parse("b1"), name).await.unwrap_err();
            assert!(err.is_invalid_operation(), "{:?}", name);
        }
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_write_then_read_round_trips_bytes() {
        let backend = MockBackend::new().with_bucket("b1");
        let drive = backend.drive().unwrap();

        let bytes = [0u8, 159, 146, 150, b'\n'];
        let entry = drive.write("b1", "bin/blob.dat", &bytes, false).await.unwrap();
        assert_eq!(entry.name, "blob.dat");
        assert_eq!(entry.size, Some(5));
        assert_eq!(drive.read("b1", "bin/blob.dat").await.unwrap(), bytes);
    }

    #[tokio::test]
    async fn test_write_without_overwrite_keeps_existing_object() {
        let backend = MockBackend::new().with_object("b1", "a.txt", b"old");
        let drive = backend.drive().unwrap();

        let err = drive.write("b1", "a.txt", b"new", false).await.unwrap_err();
        match err {
            DriveError::Gateway(gw) => assert_eq!(gw.status(), Some(412)),
            other => panic!("expected precondition failure, got {:?}", other),
        }
        assert_eq!(backend.object("b1", "a.txt").unwrap(), b"old");

        drive.write("b1", "a.txt", b"new", true).await.unwrap();
        assert_eq!(backend.object("b1", "a.txt").unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_read_missing_object_is_response_error() {
        let backend = MockBackend::new().with_bucket("b1");
        let drive = backend.drive().unwrap();
        let err = drive.read("b1", "missing.txt").await.unwrap_err();
        assert_eq!(err.user_message(), "No such object: missing.txt");
    }

    #[tokio::test]
    async fn test_exists_matches_exact_key_only() {
        let backend = MockBackend::new()
            .with_object("b1", "a.txt.bak", b"x")
            .with_object("b1", "dir/a.txt", b"x");
        let drive = backend.drive().unwrap();

        assert!(!drive.exists("b1", "a.txt").await.unwrap());
        assert!(drive.exists("b1", "a.txt.bak").await.unwrap());
        assert!(drive.exists("b1", "dir/a.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_bucket_is_invalid() {
        let backend = MockBackend::new().with_object("b1", "a.txt", b"x");
        let drive = backend.drive().unwrap();

        let err = drive.remove(&StoragePath::parse("b1"), EntryKind::Directory).await.unwrap_err();
        assert_eq!(err.to_string(), NO_BUCKET_DELETE);
        assert!(drive.remove(&StoragePath::root(), EntryKind::Directory).await.unwrap_err().is_invalid_operation());
        assert_eq!(backend.request_count(), 0);
        assert_eq!(backend.keys("b1"), vec!["a.txt"]);
    }

    #[tokio::test]
    async fn test_remove_directory_deletes_every_key_under_prefix() {
        let backend = MockBackend::new()
            .with_object("b1", "docs/", b"")
            .with_object("b1", "docs/a.md", b"a")
            .with_object("b1", "docs/deep/b.md", b"b")
            .with_object("b1", "docs-old/c.md", b"c");
        let drive = backend.drive().unwrap();

        let removed = drive.remove(&StoragePath::parse("b1/docs"), EntryKind::Directory).await.unwrap();
        assert_eq!(removed, 3);
        assert_eq!(backend.keys("b1"), vec!["docs-old/c.md"]);
    }

    #[tokio::test]
    async fn test_remove_missing_path_is_not_found() {
        let backend = MockBackend::new().with_bucket("b1");
        let drive = backend.drive().unwrap();
        let err = drive.remove(&StoragePath::parse("b1/ghost"), EntryKind::Object).await.unwrap_err();
        assert!(matches!(err, DriveError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_reports_failed_keys_and_continues() {
        let backend = MockBackend::new()
            .with_object("b1", "d/a", b"a")
            .with_object("b1", "d/b", b"b")
            .with_object("b1", "d/c", b"c");
        backend.fail_key("d/b", InjectedFailure::Status(403));
        let drive = backend.drive().unwrap();

        let err = drive.remove(&StoragePath::parse("b1/d"), EntryKind::Directory).await.unwrap_err();
        assert_eq!(err.failed_keys(), vec!["d/b"]);
        assert_eq!(err.to_string(), "1 of 3 items failed");
        assert_eq!(backend.keys("b1"), vec!["d/b"]);
    }

    #[tokio::test]
    async fn test_copy_directory_rebases_keys() {
        let backend = MockBackend::new()
            .with_object("b1", "src/", b"")
            .with_object("b1", "src/a.txt", b"a")
            .with_object("b1", "src/sub/b.txt", b"b");
        let drive = backend.drive().unwrap();

        let copied = drive
            .copy(
                &StoragePath::parse("b1/src"),
                &StoragePath::parse("b1/dst"),
                EntryKind::Directory,
            )
            .await
            .unwrap();
        assert_eq!(copied, 3);
        assert_eq!(backend.object("b1", "dst/sub/b.txt").unwrap(), b"b");
        assert!(backend.object("b1", "dst/").is_some());
        assert!(backend.object("b1", "src/a.txt").is_some());
    }

    #[tokio::test]
    async fn test_copy_into_itself_is_invalid() {
        let backend = MockBackend::new().with_object("b1", "src/a.txt", b"a");
        let drive = backend.drive().unwrap();
        let err = drive
            .copy(
                &StoragePath::parse("b1/src"),
                &StoragePath::parse("b1/src/inner"),
                EntryKind::Directory,
            )
            .await
            .unwrap_err();
        assert!(err.is_invalid_operation());
    }

    #[tokio::test]
    async fn test_move_across_buckets_removes_source() {
        let backend = MockBackend::new()
            .with_object("b1", "report.csv", b"1,2")
            .with_bucket("b2");
        let drive = backend.drive().unwrap();

        drive
            .move_to(
                &StoragePath::parse("b1/report.csv"),
                &StoragePath::parse("b2/archive/report.csv"),
                EntryKind::Object,
            )
            .await
            .unwrap();
        assert!(backend.keys("b1").is_empty());
        assert_eq!(backend.object("b2", "archive/report.csv").unwrap(), b"1,2");
    }

    #[tokio::test]
    async fn test_move_failure_on_delete_keeps_both_copies() {
        let backend = MockBackend::new()
            .with_object("b1", "d/keep", b"k")
            .with_object("b1", "d/ok", b"o");
        let drive = backend.drive().unwrap();
        backend.fail_request(endpoints::DELETE_FILE, "d/keep", InjectedFailure::Payload);

        let err = drive
            .move_to(
                &StoragePath::parse("b1/d"),
                &StoragePath::parse("b1/e"),
                EntryKind::Directory,
            )
            .await
            .unwrap_err();
        assert_eq!(err.failed_keys(), vec!["d/keep"]);
        assert_eq!(backend.object("b1", "e/ok").unwrap(), b"o");
        assert!(backend.object("b1", "d/ok").is_none());
        assert!(backend.object("b1", "d/keep").is_some());
        assert_eq!(backend.object("b1", "e/keep").unwrap(), b"k");
    }

    fn report_and_folder() -> MockBackend {
        MockBackend::new()
            .with_object("b1", "report", b"summary")
            .with_object("b1", "report/q1.csv", b"1,2")
            .with_object("b1", "report/q2.csv", b"3,4")
    }

    #[tokio::test]
    async fn test_object_and_folder_may_share_a_name() {
        let backend = report_and_folder();
        let drive = backend.drive().unwrap();

        let entries = drive.list(&StoragePath::parse("b1")).await.unwrap();
        let kinds: Vec<(&str, EntryKind)> =
            entries.iter().map(|e| (e.name.as_str(), e.kind)).collect();
        assert_eq!(
            kinds,
            vec![("report", EntryKind::Directory), ("report", EntryKind::Object)]
        );
    }

    #[tokio::test]
    async fn test_remove_object_keeps_folder_of_same_name() {
        let backend = report_and_folder();
        let drive = backend.drive().unwrap();

        let removed = drive
            .remove(&StoragePath::parse("b1/report"), EntryKind::Object)
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(backend.keys("b1"), vec!["report/q1.csv", "report/q2.csv"]);
    }

    #[tokio::test]
    async fn test_remove_folder_keeps_object_of_same_name() {
        let backend = report_and_folder();
        let drive = backend.drive().unwrap();

        let removed = drive
            .remove(&StoragePath::parse("b1/report"), EntryKind::Directory)
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(backend.keys("b1"), vec!["report"]);
    }

    #[tokio::test]
    async fn test_move_object_leaves_folder_of_same_name() {
        let backend = report_and_folder();
        let drive = backend.drive().unwrap();

        let moved = drive
            .move_to(
                &StoragePath::parse("b1/report"),
                &StoragePath::parse("b1/report.txt"),
                EntryKind::Object,
            )
            .await
            .unwrap();
        assert_eq!(moved, 1);
        assert_eq!(
            backend.keys("b1"),
            vec!["report.txt", "report/q1.csv", "report/q2.csv"]
        );
    }

    #[tokio::test]
    async fn test_copy_folder_leaves_object_of_same_name_behind() {
        let backend = report_and_folder();
        let drive = backend.drive().unwrap();

        let copied = drive
            .copy(
                &StoragePath::parse("b1/report"),
                &StoragePath::parse("b1/archive"),
                EntryKind::Directory,
            )
            .await
            .unwrap();
        assert_eq!(copied, 2);
        assert!(backend.object("b1", "archive").is_none());
        assert_eq!(backend.object("b1", "archive/q2.csv").unwrap(), b"3,4");
    }

    #[tokio::test]
    async fn test_object_may_move_below_its_own_name() {
        let backend = MockBackend::new().with_object("b1", "notes", b"n");
        let drive = backend.drive().unwrap();

        drive
            .move_to(
                &StoragePath::parse("b1/notes"),
                &StoragePath::parse("b1/notes/old"),
                EntryKind::Object,
            )
            .await
            .unwrap();
        assert_eq!(backend.keys("b1"), vec!["notes/old"]);
    }

    #[tokio::test]
    async fn test_transfer_onto_itself_is_invalid() {
        let backend = MockBackend::new().with_object("b1", "a.txt", b"a");
        let drive = backend.drive().unwrap();
        let path = StoragePath::parse("b1/a.txt");
        let err = drive.copy(&path, &path, EntryKind::Object).await.unwrap_err();
        assert!(err.is_invalid_operation());
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_payload_error_is_backend_error() {
        let backend = MockBackend::new().with_bucket("b1");
        backend.fail_key("docs/", InjectedFailure::Payload);
        let drive = backend.drive().unwrap();
        let err = drive.list(&StoragePath::parse("b1/docs")).await.unwrap_err();
        assert!(matches!(err, DriveError::Backend(_)));
    }

    #[tokio::test]
    async fn test_busy_is_released_on_failure() {
        let backend = MockBackend::new();
        backend.set_unreachable(true);
        let view = Rc::new(RecordingBusyView::default());
        let drive = backend
            .drive()
            .unwrap()
            .with_busy(BusyController::new(view.clone()));

        let err = drive.list(&StoragePath::root()).await.unwrap_err();
        assert!(matches!(err, DriveError::Gateway(ref gw) if gw.is_network()));
        assert!(!drive.busy().is_busy());
        assert!(!view.indicator_visible());
    }

    #[tokio::test]
    async fn test_session_status_and_login() {
        let backend = MockBackend::new();
        let drive = backend.drive().unwrap();
        assert_eq!(drive.session_status().await.unwrap(), SessionStatus::Ready);

        backend.set_session(false, true);
        assert_eq!(drive.session_status().await.unwrap(), SessionStatus::LoginRequired);
        assert!(drive.login().await.unwrap());
        assert_eq!(drive.session_status().await.unwrap(), SessionStatus::Ready);

        backend.set_session(true, false);
        assert_eq!(drive.session_status().await.unwrap(), SessionStatus::ConfigError);
    }

    #[tokio::test]
    async fn test_refresh_publishes_listing() {
        let backend = MockBackend::new().with_object("b1", "a.txt", b"a");
        let drive = backend.drive().unwrap();
        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let _sub = {
            let seen = seen.clone();
            drive
                .refreshed()
                .subscribe(move |r: &Refreshed| seen.borrow_mut().push(r.clone()))
        };

        let path = StoragePath::parse("b1");
        drive.refresh(&path).await.unwrap();
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].path, path);
        assert_eq!(names(&seen[0].entries), vec!["a.txt"]);
    }

    #[test]
    fn test_rebase_and_split_placeholder() {
        assert_eq!(rebase("src/a/b", "src", "dst/x"), "dst/x/a/b");
        assert_eq!(rebase("src", "src", "dst"), "dst");
        assert_eq!(split_placeholder("a/b/c/"), ("a/b", "c"));
        assert_eq!(split_placeholder("c/"), ("", "c"));
    }
}
