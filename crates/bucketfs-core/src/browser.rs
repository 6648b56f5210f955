//! Browser controller: navigation, gated actions and lifecycle.
//!
//! [`BucketBrowser`] composes a [`StorageDrive`], an [`ActionAvailability`]
//! and an [`OverwritePrompt`]. UI events come in as method calls, results go
//! out through the drive's busy controller, the toolbar and the
//! [`navigated`](BucketBrowser::navigated) channel.
//!
//! Navigations are numbered. A navigation that settles after a newer one was
//! already applied is dropped, so the current path and the toolbar follow the
//! latest request that succeeded. A failing navigation leaves the previous
//! one standing.
//!
//! Row actions take the [`EntryKind`] of the row, since a bucket may hold an
//! object and a folder under the same name.

use std::cell::RefCell;
use std::rc::Rc;

use crate::actions::{ActionAvailability, NavigationState, Toolbar, ToolbarAction};
use crate::contents::{Contents, ContentsProvider};
use crate::drive::{SessionStatus, StorageDrive};
use crate::error::DriveError;
use crate::events::{EventChannel, Subscription};
use crate::models::{Entry, EntryKind};
use crate::path::StoragePath;
use crate::transport::Transport;
use crate::upload::{OverwritePrompt, SelectedFile, UploadReport, UploadResolver};

#[derive(Default)]
struct BrowserState {
    current: StoragePath,
    entries: Vec<Entry>,
    /// Sequence number of the latest issued navigation
    issued: u64,
    /// Sequence number of the navigation `current` came from
    applied: u64,
    disposed: bool,
}

/// A storage browser bound to one drive.
pub struct BucketBrowser<T, P> {
    drive: StorageDrive<T>,
    prompt: P,
    actions: Rc<ActionAvailability>,
    navigated: EventChannel<StoragePath>,
    state: Rc<RefCell<BrowserState>>,
    subscriptions: RefCell<Vec<Subscription>>,
}

impl<T: Transport, P: OverwritePrompt> BucketBrowser<T, P> {
    /// Wire a browser. Nothing is requested until [`init`](Self::init).
    pub fn new(drive: StorageDrive<T>, toolbar: Rc<dyn Toolbar>, prompt: P) -> Self {
        let actions = Rc::new(ActionAvailability::new(toolbar));
        let navigated = EventChannel::new();
        let state = Rc::new(RefCell::new(BrowserState::default()));

        let on_navigated = {
            let actions = Rc::clone(&actions);
            navigated.subscribe(move |path: &StoragePath| actions.on_navigated(path))
        };
        let on_refreshed = {
            let state = Rc::clone(&state);
            drive.refreshed().subscribe(move |refreshed| {
                let mut state = state.borrow_mut();
                // Listings of a directory that is no longer shown are dropped
                if state.current == refreshed.path {
                    state.entries = refreshed.entries.clone();
                }
            })
        };

        Self {
            drive,
            prompt,
            actions,
            navigated,
            state,
            subscriptions: RefCell::new(vec![on_navigated, on_refreshed]),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Check the session and, when ready, list the buckets.
    pub async fn init(&self) -> Result<SessionStatus, DriveError> {
        self.ensure_live()?;
        let status = self.drive.session_status().await?;
        tracing::debug!("browser init: {:?}", status);
        if status == SessionStatus::Ready {
            self.cd("").await?;
        }
        Ok(status)
    }

    /// Run the interactive login, then initialize again on success.
    pub async fn login(&self) -> Result<SessionStatus, DriveError> {
        self.ensure_live()?;
        if self.drive.login().await? {
            self.init().await
        } else {
            Ok(SessionStatus::LoginRequired)
        }
    }

    /// Drop all subscriptions. Every later call fails with `Disposed`.
    pub fn dispose(&self) {
        self.state.borrow_mut().disposed = true;
        self.subscriptions.borrow_mut().clear();
        tracing::debug!("browser disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn current_path(&self) -> StoragePath {
        self.state.borrow().current.clone()
    }

    /// Listing of the current path.
    pub fn entries(&self) -> Vec<Entry> {
        self.state.borrow().entries.clone()
    }

    pub fn navigation(&self) -> NavigationState {
        self.actions.navigation()
    }

    pub fn is_enabled(&self, action: ToolbarAction) -> bool {
        self.actions.is_enabled(action)
    }

    pub fn drive(&self) -> &StorageDrive<T> {
        &self.drive
    }

    /// Settled navigations.
    pub fn navigated(&self) -> &EventChannel<StoragePath> {
        &self.navigated
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Navigate to a raw path and list it.
    pub async fn cd(&self, raw: &str) -> Result<Vec<Entry>, DriveError> {
        self.ensure_live()?;
        let path = StoragePath::parse(raw);
        let seq = {
            let mut state = self.state.borrow_mut();
            state.issued += 1;
            state.issued
        };

        let entries = self.drive.list(&path).await.inspect_err(|err| {
            tracing::debug!("navigation #{} to {:?} failed: {}", seq, path.format(), err);
        })?;

        let fresh = {
            let mut state = self.state.borrow_mut();
            if state.disposed {
                return Err(DriveError::Disposed);
            }
            let fresh = seq > state.applied;
            if fresh {
                state.applied = seq;
                state.current = path.clone();
                state.entries = entries.clone();
            }
            fresh
        };

        if fresh {
            self.navigated.emit(&path);
        } else {
            tracing::debug!(
                "navigation #{} to {:?} dropped: a newer navigation already settled",
                seq,
                path.format()
            );
        }
        Ok(entries)
    }

    /// Enter the child `name` of the current path.
    pub async fn open(&self, name: &str) -> Result<Vec<Entry>, DriveError> {
        let target = self.current_path().join(name);
        self.cd(&target.format()).await
    }

    /// Go one level up.
    pub async fn up(&self) -> Result<Vec<Entry>, DriveError> {
        let target = self.current_path().parent();
        self.cd(&target.format()).await
    }

    /// List the current path again.
    pub async fn refresh(&self) -> Result<Vec<Entry>, DriveError> {
        self.ensure_live()?;
        let path = self.current_path();
        self.drive.refresh(&path).await
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Create folder `name` in the current directory.
    pub async fn new_folder(&self, name: &str) -> Result<Entry, DriveError> {
        self.ensure_live()?;
        self.actions.ensure(ToolbarAction::NewFolder)?;
        let path = self.current_path();
        let entry = self.drive.mkdir(&path, name).await?;
        self.refresh_quietly(&path).await;
        Ok(entry)
    }

    /// Create the next free `UntitledFolder<n>` in the current directory.
    pub async fn new_untitled_folder(&self) -> Result<Contents, DriveError> {
        self.ensure_live()?;
        self.actions.ensure(ToolbarAction::NewFolder)?;
        let path = self.current_path();
        let contents = self.drive.new_untitled_directory(&path).await?;
        self.refresh_quietly(&path).await;
        Ok(contents)
    }

    /// Upload files into the current directory.
    pub async fn upload(&self, files: Vec<SelectedFile>) -> Result<Vec<UploadReport>, DriveError> {
        self.ensure_live()?;
        self.actions.ensure(ToolbarAction::Upload)?;
        let path = self.current_path();
        UploadResolver::new(&self.drive, &self.prompt)
            .upload_all(&path, files)
            .await
    }

    /// Delete the child `name` of the current directory.
    pub async fn delete(&self, name: &str, kind: EntryKind) -> Result<usize, DriveError> {
        self.ensure_live()?;
        let path = self.current_path();
        let removed = self.drive.remove(&path.join(name), kind).await?;
        self.refresh_quietly(&path).await;
        Ok(removed)
    }

    /// Rename the child `name` of the current directory.
    pub async fn rename(
        &self,
        name: &str,
        kind: EntryKind,
        new_name: &str,
    ) -> Result<Contents, DriveError> {
        self.ensure_live()?;
        crate::drive::validate_name(new_name)?;
        let path = self.current_path();
        let renamed = self
            .drive
            .rename_entry(&path.join(name), kind, &path.join(new_name))
            .await?;
        self.refresh_quietly(&path).await;
        Ok(renamed)
    }

    /// Copy the child `name` into directory `destination` (raw path).
    pub async fn copy_to(
        &self,
        name: &str,
        kind: EntryKind,
        destination: &str,
    ) -> Result<Contents, DriveError> {
        self.ensure_live()?;
        let path = self.current_path();
        let copied = self
            .drive
            .copy_into(&path.join(name), kind, &StoragePath::parse(destination))
            .await?;
        self.refresh_quietly(&path).await;
        Ok(copied)
    }

    /// Move the child `name` into directory `destination` (raw path).
    pub async fn move_to(
        &self,
        name: &str,
        kind: EntryKind,
        destination: &str,
    ) -> Result<usize, DriveError> {
        self.ensure_live()?;
        let path = self.current_path();
        let target = StoragePath::parse(destination).join(name);
        let moved = self.drive.move_to(&path.join(name), &target, kind).await?;
        self.refresh_quietly(&path).await;
        Ok(moved)
    }

    /// Bytes of the object `name` in the current directory.
    pub async fn download(&self, name: &str) -> Result<Vec<u8>, DriveError> {
        self.ensure_live()?;
        let target = self.current_path().join(name);
        let bucket = target.bucket().unwrap_or_default();
        self.drive.read(bucket, target.path()).await
    }

    fn ensure_live(&self) -> Result<(), DriveError> {
        if self.is_disposed() {
            return Err(DriveError::Disposed);
        }
        Ok(())
    }

    /// Resynchronize after a mutation. The mutation already succeeded, so a
    /// failing listing is only logged.
    async fn refresh_quietly(&self, path: &StoragePath) {
        if let Err(err) = self.drive.refresh(path).await {
            tracing::warn!("refresh of {:?} failed: {}", path.format(), err);
        }
    }
}
