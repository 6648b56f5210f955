//! UI components built with Leptos.
//!
//! - [`browser`] - Object storage browser panel
//! - [`icons`] - Centralized icon definitions (change theme here)

pub mod browser;
pub mod icons;

pub use browser::BrowserPanel;
