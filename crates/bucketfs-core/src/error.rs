//! Error types for the storage browser.
//!
//! Two layers, matching where a failure is detected:
//!
//! - [`GatewayError`] - the HTTP exchange failed: backend unreachable
//!   ([`GatewayError::Network`]) or reachable but rejecting
//!   ([`GatewayError::Response`])
//! - [`DriveError`] - adapter-level failures, including policy violations
//!   ([`DriveError::InvalidOperation`]) that are reported before any request
//!   is made

use thiserror::Error;

use crate::gateway::Body;

/// Failures of a single gateway request.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// No response was received (connection refused, DNS, aborted).
    #[error("network error contacting {url}: {cause}")]
    Network { url: String, cause: String },

    /// The backend answered with a non-success status.
    #[error("request failed with status {status} {status_text}: {message}")]
    Response {
        status: u16,
        status_text: String,
        /// Server-reported message, or the raw body when none was reported
        message: String,
        /// Parsed (or raw) response body for diagnostics
        body: Body,
    },

    /// The endpoint would resolve outside of the API namespace.
    #[error("endpoint '{0}' is outside of the API namespace")]
    InvalidEndpoint(String),

    /// The request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(String),
}

impl GatewayError {
    /// True when the backend could not be reached at all.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// HTTP status of a rejected request.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// One failed item of a batch operation.
#[derive(Debug, Clone)]
pub struct ItemFailure {
    /// Object key (or file name) the failure belongs to
    pub key: String,
    /// What went wrong for this item
    pub error: Box<DriveError>,
}

/// Failures of filesystem-level operations.
#[derive(Debug, Clone, Error)]
pub enum DriveError {
    /// Policy violation detected before any network call.
    #[error("{0}")]
    InvalidOperation(String),

    /// The gateway request failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The backend answered 200 but reported an error in its payload.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// No object or prefix matched the path.
    #[error("no such file or directory: {0}")]
    NotFound(String),

    /// A batch finished with some items failed.
    #[error("{} of {} items failed", failures.len(), completed + failures.len())]
    Partial {
        completed: usize,
        failures: Vec<ItemFailure>,
    },

    /// The browser was used after `dispose`.
    #[error("storage browser has been disposed")]
    Disposed,
}

impl DriveError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    /// True for policy violations (no request was issued).
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, Self::InvalidOperation(_))
    }

    /// Keys that failed, for batch errors.
    pub fn failed_keys(&self) -> Vec<&str> {
        match self {
            Self::Partial { failures, .. } => failures.iter().map(|f| f.key.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// Message suitable for a user-facing dialog.
    ///
    /// Prefers the backend's own message when one was reported.
    pub fn user_message(&self) -> String {
        match self {
            Self::Gateway(GatewayError::Response { message, .. }) if !message.is_empty() => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_message_counts_items() {
        let err = DriveError::Partial {
            completed: 2,
            failures: vec![ItemFailure {
                key: "dir/a.txt".to_string(),
                error: Box::new(DriveError::NotFound("dir/a.txt".to_string())),
            }],
        };
        assert_eq!(err.to_string(), "1 of 3 items failed");
        assert_eq!(err.failed_keys(), vec!["dir/a.txt"]);
    }

    #[test]
    fn test_user_message_prefers_backend_message() {
        let err = DriveError::from(GatewayError::Response {
            status: 403,
            status_text: "Forbidden".to_string(),
            message: "caller lacks storage.objects.create".to_string(),
            body: Body::Text(String::new()),
        });
        assert_eq!(err.user_message(), "caller lacks storage.objects.create");
        assert_eq!(
            err.to_string(),
            "request failed with status 403 Forbidden: caller lacks storage.objects.create"
        );
    }

    #[test]
    fn test_network_error_is_distinguishable() {
        let err = GatewayError::Network {
            url: "http://localhost/bucketfs/credentials".to_string(),
            cause: "connection refused".to_string(),
        };
        assert!(err.is_network());
        assert_eq!(err.status(), None);
    }
}
