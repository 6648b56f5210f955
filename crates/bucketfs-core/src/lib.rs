//! Cloud object storage exposed as a browsable filesystem.
//!
//! This crate holds everything that does not touch the DOM:
//! - [`Gateway`] - HTTP calls into the storage API namespace with body
//!   normalization and error classification
//! - [`StoragePath`] - `<bucket>[/<key-prefix>...]` path translation
//! - [`StorageDrive`] - directory semantics over prefix listing and object put/get/delete
//! - [`BusyController`] - reference-counted busy indicator
//! - [`ActionAvailability`] - toolbar enablement derived from navigation depth
//! - [`UploadResolver`] - per-file upload with overwrite confirmation
//! - [`BucketBrowser`] - composition of the above with an explicit lifecycle

pub mod actions;
pub mod browser;
pub mod busy;
pub mod config;
pub mod contents;
pub mod drive;
pub mod error;
pub mod events;
pub mod gateway;
pub mod models;
pub mod path;
pub mod transport;
pub mod upload;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use actions::{ActionAvailability, ActionState, NavigationState, Toolbar, ToolbarAction};
pub use browser::BucketBrowser;
pub use busy::{BusyController, BusyGuard, BusyView};
pub use config::GatewayConfig;
pub use contents::{Contents, ContentsBody, ContentsProvider};
pub use drive::{Refreshed, SessionStatus, StorageDrive};
pub use error::{DriveError, GatewayError, ItemFailure};
pub use events::{EventChannel, Subscription};
pub use gateway::{Body, Gateway, RequestInit};
pub use models::{Entry, EntryKind};
pub use path::StoragePath;
pub use transport::{FetchTransport, HttpRequest, HttpResponse, Method, Transport, TransportError};
pub use upload::{OverwritePrompt, SelectedFile, UploadCandidate, UploadOutcome, UploadReport, UploadResolver};
