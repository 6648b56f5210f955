//! Per-file upload with overwrite arbitration.
//!
//! For every selected file, in order:
//!
//! 1. destination key = current directory + file name
//! 2. look for an object with exactly that key
//! 3. found: ask the user; accept writes with `overwrite = true`, decline skips the file
//! 4. not found: write with `overwrite = false`
//! 5. refresh the directory the upload was issued in
//!
//! A failing file is reported and the batch moves on.

use crate::actions::NO_UPLOAD_AT_ROOT;
use crate::drive::{StorageDrive, validate_name};
use crate::error::DriveError;
use crate::path::StoragePath;
use crate::transport::Transport;

/// A file picked by the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// One file on its way to the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadCandidate {
    pub file_name: String,
    pub destination_key: String,
    pub bucket: String,
    pub content: Vec<u8>,
}

impl UploadCandidate {
    /// Place `file` into directory `dir`.
    pub fn new(dir: &StoragePath, file: SelectedFile) -> Result<Self, DriveError> {
        let Some(bucket) = dir.bucket() else {
            return Err(DriveError::invalid(NO_UPLOAD_AT_ROOT));
        };
        validate_name(&file.name)?;

        Ok(Self {
            destination_key: format!("{}{}", dir.key_prefix(), file.name),
            bucket: bucket.to_string(),
            file_name: file.name,
            content: file.content,
        })
    }
}

/// Asks whether an existing object may be replaced.
#[allow(async_fn_in_trait)]
pub trait OverwritePrompt {
    /// Blocking confirmation. `true` replaces the object.
    async fn confirm_overwrite(&self, candidate: &UploadCandidate) -> bool;
}

/// What happened to one file.
#[derive(Clone, Debug)]
pub enum UploadOutcome {
    /// Written to a free key
    Uploaded,
    /// Replaced an existing object after confirmation
    Overwritten,
    /// Existing object kept, user declined
    Skipped,
    Failed(DriveError),
}

impl UploadOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Per-file result of a batch.
#[derive(Clone, Debug)]
pub struct UploadReport {
    pub file_name: String,
    pub destination_key: String,
    pub outcome: UploadOutcome,
}

/// Runs uploads against a drive, asking `prompt` on conflicts.
pub struct UploadResolver<'a, T, P> {
    drive: &'a StorageDrive<T>,
    prompt: &'a P,
}

impl<'a, T: Transport, P: OverwritePrompt> UploadResolver<'a, T, P> {
    pub fn new(drive: &'a StorageDrive<T>, prompt: &'a P) -> Self {
        Self { drive, prompt }
    }

    /// Upload `files` into `dir`, one after the other.
    ///
    /// Fails up front with `InvalidOperation` at root. Otherwise every file
    /// gets a report, failures included.
    pub async fn upload_all(
        &self,
        dir: &StoragePath,
        files: Vec<SelectedFile>,
    ) -> Result<Vec<UploadReport>, DriveError> {
        if dir.is_root() {
            return Err(DriveError::invalid(NO_UPLOAD_AT_ROOT));
        }
        let _busy = self.drive.busy().begin();
        tracing::debug!("upload started: {} file(s) into {:?}", files.len(), dir.format());

        let mut reports = Vec::with_capacity(files.len());
        for file in files {
            reports.push(self.upload_one(dir, file).await);
        }

        let failed = reports.iter().filter(|r| r.outcome.is_failure()).count();
        tracing::debug!("upload ended: {} of {} failed", failed, reports.len());
        Ok(reports)
    }

    /// Full cycle for one file. Never fails; the outcome carries errors.
    pub async fn upload_one(&self, dir: &StoragePath, file: SelectedFile) -> UploadReport {
        let _busy = self.drive.busy().begin();
        let file_name = file.name.clone();
        let candidate = match UploadCandidate::new(dir, file) {
            Ok(candidate) => candidate,
            Err(err) => {
                return UploadReport {
                    destination_key: format!("{}{}", dir.key_prefix(), file_name),
                    file_name,
                    outcome: UploadOutcome::Failed(err),
                };
            }
        };

        let outcome = match self.resolve(&candidate).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!("upload of {} failed: {}", candidate.destination_key, err);
                UploadOutcome::Failed(err)
            }
        };

        // Refresh the directory the upload was issued in, whatever is on screen now
        if let Err(err) = self.drive.refresh(dir).await {
            tracing::warn!("refresh after upload of {} failed: {}", candidate.file_name, err);
        }

        UploadReport {
            file_name: candidate.file_name,
            destination_key: candidate.destination_key,
            outcome,
        }
    }

    async fn resolve(&self, candidate: &UploadCandidate) -> Result<UploadOutcome, DriveError> {
        let exists = self
            .drive
            .exists(&candidate.bucket, &candidate.destination_key)
            .await?;

        let overwrite = if exists {
            if !self.prompt.confirm_overwrite(candidate).await {
                tracing::debug!("upload of {} declined", candidate.destination_key);
                return Ok(UploadOutcome::Skipped);
            }
            true
        } else {
            false
        };

        self.drive
            .write(
                &candidate.bucket,
                &candidate.destination_key,
                &candidate.content,
                overwrite,
            )
            .await?;

        Ok(if overwrite {
            UploadOutcome::Overwritten
        } else {
            UploadOutcome::Uploaded
        })
    }
}
