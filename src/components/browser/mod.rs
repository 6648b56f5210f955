//! Object storage browser.
//!
//! Layout (top to bottom): action bar, path bar, file list. A session gate
//! replaces all three until the server reports usable credentials.

mod action_bar;
mod file_list;
mod panel;
mod pathbar;
mod session;

pub use panel::BrowserPanel;
