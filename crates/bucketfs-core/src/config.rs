//! Storage API configuration.
//!
//! Centralizes the namespace, endpoint paths and naming conventions shared by
//! the gateway, the drive and the in-memory backend used in tests.

// =============================================================================
// API Namespace
// =============================================================================

/// Path segment under the server base URL that every endpoint lives in.
pub const API_NAMESPACE: &str = "bucketfs";

/// Endpoint paths, relative to the API namespace.
pub mod endpoints {
    /// Credential state of the server-side session.
    pub const CREDENTIALS: &str = "credentials";
    /// Interactive login trigger.
    pub const LOGIN: &str = "login";
    /// Bucket listing.
    pub const LIST_BUCKETS: &str = "api/storage/listBuckets";
    /// Object and common-prefix listing inside a bucket.
    pub const LIST_FILES: &str = "api/storage/listFiles";
    /// Zero-byte folder placeholder creation.
    pub const CREATE_FOLDER: &str = "api/storage/createFolder";
    /// Object upload.
    pub const SAVE_FILE: &str = "api/storage/saveFile";
    /// Object download (base64 text body).
    pub const LOAD_FILE: &str = "api/storage/loadFile";
    /// Single object deletion.
    pub const DELETE_FILE: &str = "api/storage/deleteFile";
}

// =============================================================================
// Naming Conventions
// =============================================================================

/// Delimiter used for one-level listings.
pub const DELIMITER: &str = "/";

/// Base name for folders created through the contents provider.
pub const UNTITLED_FOLDER: &str = "UntitledFolder";

/// Infix inserted before the counter of a copy that would collide.
pub const COPY_SUFFIX: &str = "-Copy";

/// Content encoding requested from `loadFile` and sent to `saveFile`.
pub const CONTENT_FORMAT: &str = "base64";

// =============================================================================
// Gateway Configuration
// =============================================================================

/// Where the storage API is served.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Server base URL (e.g. `http://localhost:8888/`)
    pub base_url: String,
    /// Namespace segment joined after the base URL
    pub namespace: String,
}

impl GatewayConfig {
    /// Configuration for the default namespace under `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            namespace: API_NAMESPACE.to_string(),
        }
    }

    /// Override the namespace segment.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new("http://localhost:8888/")
    }
}
