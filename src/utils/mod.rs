//! Browser-side helpers.
//!
//! - [`console`] - tracing subscriber writing to the browser console
//! - [`dom`] - dialogs, file selection and downloads
//! - [`format`] - listing column formatting

pub mod console;
pub mod dom;
pub mod format;
