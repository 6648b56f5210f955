//! Root application module.
//!
//! Contains the App component, the [`AppContext`] definition and the
//! [`PanelState`] signals the storage browser renders from.

use std::future::Future;
use std::rc::Rc;

use bucketfs_core::{
    BucketBrowser, BusyController, BusyView, DriveError, Entry, EntryKind, FetchTransport,
    Gateway, SelectedFile, SessionStatus, StorageDrive, StoragePath, Toolbar, ToolbarAction,
    UploadOutcome,
};
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::components::BrowserPanel;
use crate::config;
use crate::utils::dom::{self, ConfirmPrompt};

/// The browser as wired up in the page.
pub type WebBrowser = BucketBrowser<FetchTransport, ConfirmPrompt>;

// ============================================================================
// PanelState
// ============================================================================

/// Enablement of the toolbar buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToolbarFlags {
    new_folder: bool,
    upload: bool,
    refresh: bool,
}

impl ToolbarFlags {
    pub fn get(&self, action: ToolbarAction) -> bool {
        match action {
            ToolbarAction::NewFolder => self.new_folder,
            ToolbarAction::Upload => self.upload,
            ToolbarAction::Refresh => self.refresh,
        }
    }

    fn set(&mut self, action: ToolbarAction, enabled: bool) {
        match action {
            ToolbarAction::NewFolder => self.new_folder = enabled,
            ToolbarAction::Upload => self.upload = enabled,
            ToolbarAction::Refresh => self.refresh = enabled,
        }
    }
}

impl Default for ToolbarFlags {
    fn default() -> Self {
        Self {
            new_folder: false,
            upload: false,
            refresh: true,
        }
    }
}

/// Signals behind the storage panel.
///
/// `Copy` like every signal bundle; it is also handed to the core crate as
/// its [`BusyView`] and [`Toolbar`], so busy and enablement changes made
/// there show up here without extra plumbing.
#[derive(Clone, Copy)]
pub struct PanelState {
    /// Listing of the current directory.
    pub entries: RwSignal<Vec<Entry>>,
    /// Directory the listing belongs to.
    pub current_path: RwSignal<StoragePath>,
    /// `None` until the credential check returns.
    pub session: RwSignal<Option<SessionStatus>>,
    /// Startup failure shown instead of the listing.
    pub error: RwSignal<Option<String>>,
    pub toolbar: RwSignal<ToolbarFlags>,
    /// Progress indicator visibility.
    pub busy: RwSignal<bool>,
    pub content_interactive: RwSignal<bool>,
    pub content_hidden: RwSignal<bool>,
    /// Name of the highlighted row.
    pub selection: RwSignal<Option<(String, EntryKind)>>,
}

impl PanelState {
    pub fn new() -> Self {
        Self {
            entries: RwSignal::new(Vec::new()),
            current_path: RwSignal::new(StoragePath::root()),
            session: RwSignal::new(None),
            error: RwSignal::new(None),
            toolbar: RwSignal::new(ToolbarFlags::default()),
            busy: RwSignal::new(false),
            content_interactive: RwSignal::new(true),
            content_hidden: RwSignal::new(false),
            selection: RwSignal::new(None),
        }
    }

    pub fn is_enabled(&self, action: ToolbarAction) -> Signal<bool> {
        let toolbar = self.toolbar;
        Signal::derive(move || toolbar.get().get(action))
    }
}

impl Default for PanelState {
    fn default() -> Self {
        Self::new()
    }
}

impl BusyView for PanelState {
    fn show_indicator(&self) {
        self.busy.set(true);
    }

    fn hide_indicator(&self) {
        self.busy.set(false);
    }

    fn set_content_interactive(&self, interactive: bool) {
        self.content_interactive.set(interactive);
    }

    fn is_content_hidden(&self) -> bool {
        self.content_hidden.get_untracked()
    }

    fn set_content_hidden(&self, hidden: bool) {
        self.content_hidden.set(hidden);
    }
}

impl Toolbar for PanelState {
    fn set_enabled(&self, action: ToolbarAction, enabled: bool) {
        self.toolbar.update(|flags| flags.set(action, enabled));
    }
}

// ============================================================================
// AppContext
// ============================================================================

/// Application-wide reactive context.
///
/// Provided at the root of the component tree; children reach it with
/// `use_context::<AppContext>()`. The browser handle is not `Send`, so it is
/// kept in local storage of the reactive arena.
#[derive(Clone, Copy)]
pub struct AppContext {
    pub panel: PanelState,
    browser: StoredValue<Option<Rc<WebBrowser>>, LocalStorage>,
}

impl AppContext {
    pub fn new() -> Self {
        let panel = PanelState::new();
        let browser = match build_browser(panel) {
            Ok(browser) => Some(Rc::new(browser)),
            Err(message) => {
                tracing::error!("storage gateway unavailable: {}", message);
                panel.error.set(Some(message));
                None
            }
        };
        Self {
            panel,
            browser: StoredValue::new_local(browser),
        }
    }

    fn browser(&self) -> Option<Rc<WebBrowser>> {
        self.browser.get_value()
    }

    /// Run `op` in the background, then mirror the browser state into the
    /// panel signals and report a failure, if any.
    fn run<F, Fut, R>(&self, label: &'static str, op: F)
    where
        F: FnOnce(Rc<WebBrowser>) -> Fut + 'static,
        Fut: Future<Output = Result<R, DriveError>> + 'static,
        R: 'static,
    {
        let Some(browser) = self.browser() else {
            tracing::warn!("{} skipped: no storage gateway", label);
            return;
        };
        let ctx = *self;
        spawn_local(async move {
            let result = op(browser.clone()).await;
            ctx.sync(&browser);
            if let Err(e) = result {
                report_failure(label, &e);
            }
        });
    }

    fn sync(&self, browser: &WebBrowser) {
        if browser.is_disposed() {
            return;
        }
        self.panel.current_path.set(browser.current_path());
        self.panel.entries.set(browser.entries());
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Check credentials and, when ready, list the buckets.
    pub fn init(&self) {
        let panel = self.panel;
        self.run("init", move |browser| async move {
            match browser.init().await {
                Ok(status) => panel.session.set(Some(status)),
                Err(e) => panel.error.set(Some(e.user_message())),
            }
            Ok(())
        });
    }

    pub fn login(&self) {
        let panel = self.panel;
        self.run("login", move |browser| async move {
            let status = browser.login().await?;
            panel.session.set(Some(status));
            if status != SessionStatus::Ready {
                dom::alert("Sign-in did not complete. Please try again.");
            }
            Ok(())
        });
    }

    /// Stop the browser; later operations are refused.
    pub fn dispose(&self) {
        if let Some(browser) = self.browser() {
            browser.dispose();
        }
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    pub fn cd(&self, raw: String) {
        self.panel.selection.set(None);
        self.run("cd", move |browser| async move { browser.cd(&raw).await });
    }

    /// Enter a bucket or directory of the current listing.
    pub fn open(&self, name: String) {
        self.panel.selection.set(None);
        self.run("open", move |browser| async move { browser.open(&name).await });
    }

    pub fn up(&self) {
        self.panel.selection.set(None);
        self.run("up", |browser| async move { browser.up().await });
    }

    pub fn refresh(&self) {
        self.run("refresh", |browser| async move { browser.refresh().await });
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Create a folder named by the user, or `UntitledFolder...` when the
    /// prompt is left empty.
    pub fn new_folder(&self) {
        let Some(name) = dom::prompt("Folder name", "") else {
            return;
        };
        let name = name.trim().to_string();
        self.run("new folder", move |browser| async move {
            if name.is_empty() {
                browser.new_untitled_folder().await.map(|_| ())
            } else {
                browser.new_folder(&name).await.map(|_| ())
            }
        });
    }

    pub fn upload(&self, files: Vec<SelectedFile>) {
        if files.is_empty() {
            return;
        }
        self.run("upload", move |browser| async move {
            let reports = browser.upload(files).await?;
            let failed: Vec<String> = reports
                .iter()
                .filter_map(|report| match &report.outcome {
                    UploadOutcome::Failed(e) => {
                        Some(format!("{}: {}", report.file_name, e.user_message()))
                    }
                    _ => None,
                })
                .collect();
            if !failed.is_empty() {
                dom::alert(&format!("Some files were not uploaded:\n{}", failed.join("\n")));
            }
            Ok(())
        });
    }

    pub fn delete(&self, name: String, kind: EntryKind) {
        if !dom::confirm(&format!("Delete \"{}\"? This cannot be undone.", name)) {
            return;
        }
        self.panel.selection.set(None);
        self.run("delete", move |browser| async move { browser.delete(&name, kind).await });
    }

    pub fn rename(&self, name: String, kind: EntryKind) {
        let Some(new_name) = dom::prompt("New name", &name) else {
            return;
        };
        let new_name = new_name.trim().to_string();
        if new_name.is_empty() || new_name == name {
            return;
        }
        self.panel.selection.set(Some((new_name.clone(), kind)));
        self.run("rename", move |browser| async move {
            browser.rename(&name, kind, &new_name).await
        });
    }

    /// Copy an entry next to itself with a `-Copy<n>` suffix.
    pub fn duplicate(&self, name: String, kind: EntryKind) {
        self.run("duplicate", move |browser| async move {
            let here = browser.current_path().format();
            browser.copy_to(&name, kind, &here).await
        });
    }

    /// Move an entry into a directory typed by the user.
    pub fn relocate(&self, name: String, kind: EntryKind) {
        let current = self.panel.current_path.get_untracked().format();
        let Some(destination) = dom::prompt("Move to (bucket/path)", &current) else {
            return;
        };
        if destination.trim().is_empty() {
            return;
        }
        self.panel.selection.set(None);
        self.run("move", move |browser| async move {
            browser.move_to(&name, kind, destination.trim()).await
        });
    }

    pub fn download(&self, name: String) {
        self.run("download", move |browser| async move {
            let bytes = browser.download(&name).await?;
            dom::save_bytes(&name, &bytes);
            Ok(())
        });
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

fn build_browser(panel: PanelState) -> Result<WebBrowser, String> {
    let gateway = Gateway::new(&config::gateway_config(), FetchTransport::new())
        .map_err(|e| e.to_string())?;
    let drive = StorageDrive::new(gateway).with_busy(BusyController::new(Rc::new(panel)));
    Ok(BucketBrowser::new(drive, Rc::new(panel), ConfirmPrompt))
}

fn report_failure(label: &str, error: &DriveError) {
    tracing::warn!("{} failed: {}", label, error);
    match error {
        DriveError::Disposed => {}
        DriveError::Partial { .. } => dom::alert(&format!(
            "{}\n\nFailed:\n{}",
            error.user_message(),
            error.failed_keys().join("\n")
        )),
        other => dom::alert(&other.user_message()),
    }
}

/// Root application component with error boundary.
#[component]
pub fn App() -> impl IntoView {
    let ctx = AppContext::new();
    provide_context(ctx);

    view! {
        <ErrorBoundary
            fallback=|errors| view! {
                <div style="
                    display: flex;
                    flex-direction: column;
                    align-items: center;
                    justify-content: center;
                    height: 100vh;
                    padding: 2rem;
                    font-family: system-ui, sans-serif;
                ">
                    <h1 style="color: #c0392b; margin-bottom: 1rem;">
                        "Something went wrong"
                    </h1>
                    <ul style="color: #c0392b; font-size: 0.9rem;">
                        {move || errors.get()
                            .into_iter()
                            .map(|(_, e)| view! { <li>{e.to_string()}</li> })
                            .collect::<Vec<_>>()
                        }
                    </ul>
                    <button
                        on:click=move |_| {
                            if let Some(window) = web_sys::window() {
                                let _ = window.location().reload();
                            }
                        }
                    >
                        "Reload Page"
                    </button>
                </div>
            }
        >
            <BrowserPanel />
        </ErrorBoundary>
    }
}
