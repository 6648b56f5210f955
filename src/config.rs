//! Application configuration.
//!
//! Centralizes the constants of the browser front end. Gateway endpoints and
//! storage conventions live in `bucketfs_core::config`.

use bucketfs_core::GatewayConfig;

use crate::utils::dom;

// =============================================================================
// Application Metadata
// =============================================================================

/// Title shown in the panel header.
pub const PANEL_TITLE: &str = "Object Storage";

/// Console log verbosity.
pub const LOG_LEVEL: tracing::Level = tracing::Level::DEBUG;

// =============================================================================
// Browser Behavior
// =============================================================================

/// Period of the background listing refresh in milliseconds.
pub const AUTO_REFRESH_INTERVAL_MS: u32 = 300_000;

/// Element id the application mounts into.
pub const MOUNT_ELEMENT_ID: &str = "app";

// =============================================================================
// UI Configuration
// =============================================================================

/// Icon theme selection.
///
/// Available themes:
/// - `Bootstrap` - Familiar, slightly bolder (default)
/// - `Lucide` - Minimal, thin strokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(dead_code)]
pub enum IconTheme {
    #[default]
    Bootstrap,
    Lucide,
}

/// Current icon theme used throughout the application.
pub const ICON_THEME: IconTheme = IconTheme::Bootstrap;

// =============================================================================
// Gateway
// =============================================================================

/// Gateway settings for the server that served this page.
///
/// Storage calls go to the page's own origin so the server-side session
/// cookie authenticates them. Falls back to the library default outside a
/// browser.
pub fn gateway_config() -> GatewayConfig {
    match dom::location_origin() {
        Some(origin) => GatewayConfig::new(origin),
        None => GatewayConfig::default(),
    }
}
