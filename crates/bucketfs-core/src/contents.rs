//! Contents-provider contract consumed by directory-browser widgets.
//!
//! Widgets address everything by [`StoragePath`] and expect `get`, `save`,
//! `delete`, `rename`, `copy` and untitled-folder creation. [`StorageDrive`]
//! implements the contract on top of its bucket/key operations.

use crate::actions::NO_FOLDER_AT_ROOT;
use crate::config::{COPY_SUFFIX, UNTITLED_FOLDER};
use crate::drive::{NO_BUCKET_TRANSFER, StorageDrive};
use crate::error::DriveError;
use crate::models::{Entry, EntryKind};
use crate::path::StoragePath;
use crate::transport::Transport;

const NO_CROSS_BUCKET_RENAME: &str = "Cross-bucket renaming is not supported";

/// Payload of [`Contents`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentsBody {
    /// Metadata only
    None,
    /// Children of a bucket or directory
    Listing(Vec<Entry>),
    /// Object bytes
    Bytes(Vec<u8>),
}

/// A file or directory model as returned to the widget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contents {
    pub name: String,
    pub path: StoragePath,
    pub kind: EntryKind,
    pub size: Option<u64>,
    pub last_modified: Option<u64>,
    pub body: ContentsBody,
}

impl Contents {
    fn directory(path: StoragePath, body: ContentsBody) -> Self {
        let kind = match (path.is_root(), path.is_bucket_root()) {
            (false, true) => EntryKind::Bucket,
            _ => EntryKind::Directory,
        };
        Self {
            name: path.name().unwrap_or_default().to_string(),
            path,
            kind,
            size: None,
            last_modified: None,
            body,
        }
    }

    fn object(path: StoragePath, entry: Entry, body: ContentsBody) -> Self {
        Self {
            name: entry.name,
            path,
            kind: EntryKind::Object,
            size: entry.size,
            last_modified: entry.last_modified,
            body,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind.is_container()
    }
}

/// Operations a directory-browser widget performs on its backing store.
#[allow(async_fn_in_trait)]
pub trait ContentsProvider {
    /// Directory listing, or object bytes when `path` names an object.
    async fn get(&self, path: &StoragePath) -> Result<Contents, DriveError>;

    /// Create `UntitledFolder`, `UntitledFolder1`, ... inside `path`.
    async fn new_untitled_directory(&self, path: &StoragePath) -> Result<Contents, DriveError>;

    /// Delete an object or a directory tree.
    async fn delete(&self, path: &StoragePath) -> Result<(), DriveError>;

    /// Rename within one bucket.
    async fn rename(&self, from: &StoragePath, to: &StoragePath) -> Result<Contents, DriveError>;

    /// Copy into directory `to_dir`, suffixing the name on collision.
    async fn copy(&self, from: &StoragePath, to_dir: &StoragePath) -> Result<Contents, DriveError>;

    /// Store bytes at `path`, replacing what is there.
    async fn save(&self, path: &StoragePath, bytes: &[u8]) -> Result<Contents, DriveError>;
}

impl<T: Transport> ContentsProvider for StorageDrive<T> {
    async fn get(&self, path: &StoragePath) -> Result<Contents, DriveError> {
        if let Some(bucket) = path.bucket()
            && let Some(entry) = self.stat(bucket, path.path()).await?
        {
            let bytes = self.read(bucket, path.path()).await?;
            return Ok(Contents::object(path.clone(), entry, ContentsBody::Bytes(bytes)));
        }

        let entries = self.list(path).await?;
        Ok(Contents::directory(path.clone(), ContentsBody::Listing(entries)))
    }

    async fn new_untitled_directory(&self, path: &StoragePath) -> Result<Contents, DriveError> {
        if path.is_root() {
            return Err(DriveError::invalid(NO_FOLDER_AT_ROOT));
        }
        let taken = self.list(path).await?;
        let name = (0..)
            .map(|n| match n {
                0 => UNTITLED_FOLDER.to_string(),
                n => format!("{}{}", UNTITLED_FOLDER, n),
            })
            .find(|candidate| !taken.iter().any(|e| &e.name == candidate))
            .unwrap_or_else(|| UNTITLED_FOLDER.to_string());

        self.mkdir(path, &name).await?;
        Ok(Contents::directory(path.join(&name), ContentsBody::None))
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), DriveError> {
        let kind = self.kind_of(path).await?;
        self.remove(path, kind).await.map(|_| ())
    }

    async fn rename(&self, from: &StoragePath, to: &StoragePath) -> Result<Contents, DriveError> {
        if from.bucket() != to.bucket() {
            return Err(DriveError::invalid(NO_CROSS_BUCKET_RENAME));
        }
        let kind = self.kind_of(from).await?;
        self.rename_entry(from, kind, to).await
    }

    async fn copy(&self, from: &StoragePath, to_dir: &StoragePath) -> Result<Contents, DriveError> {
        let kind = self.kind_of(from).await?;
        self.copy_into(from, kind, to_dir).await
    }

    async fn save(&self, path: &StoragePath, bytes: &[u8]) -> Result<Contents, DriveError> {
        let bucket = path.bucket().unwrap_or_default();
        let entry = self.write(bucket, path.path(), bytes, true).await?;
        Ok(Contents::object(path.clone(), entry, ContentsBody::None))
    }
}

impl<T: Transport> StorageDrive<T> {
    /// Kind of the entry `path` names when only the path is known.
    ///
    /// An object stored under exactly this key wins over a folder of the
    /// same name.
    pub async fn kind_of(&self, path: &StoragePath) -> Result<EntryKind, DriveError> {
        let Some(bucket) = path.bucket() else {
            return Ok(EntryKind::Directory);
        };
        if path.is_bucket_root() {
            return Ok(EntryKind::Bucket);
        }
        Ok(match self.stat(bucket, path.path()).await? {
            Some(_) => EntryKind::Object,
            None => EntryKind::Directory,
        })
    }

    /// Rename the `kind` entry at `from` to `to` within one bucket.
    pub async fn rename_entry(
        &self,
        from: &StoragePath,
        kind: EntryKind,
        to: &StoragePath,
    ) -> Result<Contents, DriveError> {
        if from.bucket() != to.bucket() {
            return Err(DriveError::invalid(NO_CROSS_BUCKET_RENAME));
        }
        self.move_to(from, to, kind).await?;
        self.metadata(to, kind).await
    }

    /// Copy the `kind` entry at `from` into `to_dir`, suffixing the name
    /// when it is taken there.
    pub async fn copy_into(
        &self,
        from: &StoragePath,
        kind: EntryKind,
        to_dir: &StoragePath,
    ) -> Result<Contents, DriveError> {
        let Some(name) = from.name().filter(|_| kind != EntryKind::Bucket) else {
            return Err(DriveError::invalid(NO_BUCKET_TRANSFER));
        };
        let taken = self.list(to_dir).await?;
        let target = (0..)
            .map(|n| copy_name(name, n))
            .find(|candidate| !taken.iter().any(|e| &e.name == candidate))
            .unwrap_or_else(|| name.to_string());

        let destination = to_dir.join(&target);
        StorageDrive::copy(self, from, &destination, kind).await?;
        self.metadata(&destination, kind).await
    }

    /// Metadata of the `kind` entry at `path` without its body.
    async fn metadata(&self, path: &StoragePath, kind: EntryKind) -> Result<Contents, DriveError> {
        if kind == EntryKind::Object
            && let Some(bucket) = path.bucket()
            && let Some(entry) = self.stat(bucket, path.path()).await?
        {
            return Ok(Contents::object(path.clone(), entry, ContentsBody::None));
        }
        Ok(Contents::directory(path.clone(), ContentsBody::None))
    }
}

/// `name` for n = 0, otherwise `<stem>-Copy<n><.ext>`.
fn copy_name(name: &str, n: usize) -> String {
    if n == 0 {
        return name.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}{}{}.{}", stem, COPY_SUFFIX, n, ext),
        _ => format!("{}{}{}", name, COPY_SUFFIX, n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;

    #[test]
    fn test_copy_name() {
        assert_eq!(copy_name("a.txt", 0), "a.txt");
        assert_eq!(copy_name("a.txt", 1), "a-Copy1.txt");
        assert_eq!(copy_name("archive.tar.gz", 2), "archive.tar-Copy2.gz");
        assert_eq!(copy_name("docs", 3), "docs-Copy3");
        assert_eq!(copy_name(".env", 1), ".env-Copy1");
    }

    #[tokio::test]
    async fn test_get_distinguishes_objects_and_directories() {
        let backend = MockBackend::new()
            .with_object("b1", "docs/a.md", b"# a")
            .with_object("b1", "notes.txt", b"n");
        let drive = backend.drive().unwrap();

        let file = drive.get(&StoragePath::parse("b1/docs/a.md")).await.unwrap();
        assert_eq!(file.kind, EntryKind::Object);
        assert_eq!(file.body, ContentsBody::Bytes(b"# a".to_vec()));

        let dir = drive.get(&StoragePath::parse("b1/docs")).await.unwrap();
        assert_eq!(dir.kind, EntryKind::Directory);
        match &dir.body {
            ContentsBody::Listing(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].name, "a.md");
                assert_eq!(entries[0].size, Some(3));
            }
            other => panic!("expected listing, got {:?}", other),
        }

        let bucket = drive.get(&StoragePath::parse("b1")).await.unwrap();
        assert_eq!(bucket.kind, EntryKind::Bucket);
        assert_eq!(bucket.name, "b1");
    }

    #[tokio::test]
    async fn test_untitled_directory_numbers_collisions() {
        let backend = MockBackend::new().with_bucket("b1");
        let drive = backend.drive().unwrap();
        let bucket = StoragePath::parse("b1");

        let first = drive.new_untitled_directory(&bucket).await.unwrap();
        let second = drive.new_untitled_directory(&bucket).await.unwrap();
        let third = drive.new_untitled_directory(&bucket).await.unwrap();
        assert_eq!(first.name, "UntitledFolder");
        assert_eq!(second.name, "UntitledFolder1");
        assert_eq!(third.path.format(), "b1/UntitledFolder2");
    }

    #[tokio::test]
    async fn test_untitled_directory_at_root_is_invalid() {
        let backend = MockBackend::new().with_bucket("b1");
        let drive = backend.drive().unwrap();
        let err = drive.new_untitled_directory(&StoragePath::root()).await.unwrap_err();
        assert!(err.is_invalid_operation());
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_rename_within_bucket() {
        let backend = MockBackend::new().with_object("b1", "old.txt", b"x");
        let drive = backend.drive().unwrap();

        let renamed = drive
            .rename(&StoragePath::parse("b1/old.txt"), &StoragePath::parse("b1/new.txt"))
            .await
            .unwrap();
        assert_eq!(renamed.name, "new.txt");
        assert_eq!(renamed.kind, EntryKind::Object);
        assert_eq!(backend.keys("b1"), vec!["new.txt"]);
    }

    #[tokio::test]
    async fn test_rename_across_buckets_is_refused() {
        let backend = MockBackend::new()
            .with_object("b1", "a.txt", b"x")
            .with_bucket("b2");
        let drive = backend.drive().unwrap();
        backend.clear_requests();

        let err = drive
            .rename(&StoragePath::parse("b1/a.txt"), &StoragePath::parse("b2/a.txt"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), NO_CROSS_BUCKET_RENAME);
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_copy_into_same_directory_adds_suffix() {
        let backend = MockBackend::new().with_object("b1", "d/a.txt", b"x");
        let drive = backend.drive().unwrap();

        let source = StoragePath::parse("b1/d/a.txt");
        let dir = StoragePath::parse("b1/d");
        let first = ContentsProvider::copy(&drive, &source, &dir).await.unwrap();
        let second = ContentsProvider::copy(&drive, &source, &dir).await.unwrap();
        assert_eq!(first.name, "a-Copy1.txt");
        assert_eq!(second.name, "a-Copy2.txt");
        assert_eq!(backend.object("b1", "d/a-Copy2.txt").unwrap(), b"x");
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let backend = MockBackend::new().with_object("b1", "a.txt", b"old");
        let drive = backend.drive().unwrap();
        let saved = drive.save(&StoragePath::parse("b1/a.txt"), b"new").await.unwrap();
        assert_eq!(saved.size, Some(3));
        assert_eq!(backend.object("b1", "a.txt").unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_delete_directory() {
        let backend = MockBackend::new()
            .with_object("b1", "d/", b"")
            .with_object("b1", "d/a.txt", b"x");
        let drive = backend.drive().unwrap();
        drive.delete(&StoragePath::parse("b1/d")).await.unwrap();
        assert!(backend.keys("b1").is_empty());
    }

    #[tokio::test]
    async fn test_path_operations_prefer_object_over_same_named_folder() {
        let backend = MockBackend::new()
            .with_object("b1", "report", b"summary")
            .with_object("b1", "report/q1.csv", b"1");
        let drive = backend.drive().unwrap();
        let report = StoragePath::parse("b1/report");

        assert_eq!(drive.kind_of(&report).await.unwrap(), EntryKind::Object);
        let renamed = drive
            .rename(&report, &StoragePath::parse("b1/report.txt"))
            .await
            .unwrap();
        assert_eq!(renamed.kind, EntryKind::Object);
        assert_eq!(backend.keys("b1"), vec!["report.txt", "report/q1.csv"]);

        assert_eq!(drive.kind_of(&report).await.unwrap(), EntryKind::Directory);
        drive.delete(&report).await.unwrap();
        assert_eq!(backend.keys("b1"), vec!["report.txt"]);
    }

    #[tokio::test]
    async fn test_copy_into_folder_kind_skips_same_named_object() {
        let backend = MockBackend::new()
            .with_object("b1", "report", b"summary")
            .with_object("b1", "report/q1.csv", b"1")
            .with_bucket("b2");
        let drive = backend.drive().unwrap();

        let copied = drive
            .copy_into(
                &StoragePath::parse("b1/report"),
                EntryKind::Directory,
                &StoragePath::parse("b2"),
            )
            .await
            .unwrap();
        assert_eq!(copied.kind, EntryKind::Directory);
        assert_eq!(backend.keys("b2"), vec!["report/q1.csv"]);
    }
}
