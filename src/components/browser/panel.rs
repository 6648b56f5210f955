//! Browser panel: header, busy indicator and the session-dependent body.

use bucketfs_core::SessionStatus;
use gloo_timers::callback::Interval;
use leptos::prelude::*;
use leptos_icons::Icon;

use super::action_bar::ActionBar;
use super::file_list::FileList;
use super::pathbar::PathBar;
use super::session::{LoginPrompt, Notice};
use crate::app::AppContext;
use crate::components::icons as ic;
use crate::config::{AUTO_REFRESH_INTERVAL_MS, PANEL_TITLE};

stylance::import_crate_style!(css, "src/components/browser/panel.module.css");

const CONFIG_ERROR_MESSAGE: &str =
    "Object storage is not configured on the server. Ask an administrator to set up credentials.";

/// Storage browser panel.
///
/// Starts the credential check on mount, refreshes the listing periodically
/// while the session is ready, and disposes of the browser on unmount.
#[component]
pub fn BrowserPanel() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let panel = ctx.panel;

    ctx.init();

    let refresher = Interval::new(AUTO_REFRESH_INTERVAL_MS, move || {
        if panel.session.get_untracked() == Some(SessionStatus::Ready) {
            tracing::debug!("auto refresh");
            ctx.refresh();
        }
    });
    let refresher = StoredValue::new_local(Some(refresher));

    on_cleanup(move || {
        refresher.set_value(None);
        ctx.dispose();
    });

    let indicator_class = move || {
        if panel.busy.get() {
            format!("{} {}", css::indicator, css::indicatorActive)
        } else {
            css::indicator.to_string()
        }
    };

    view! {
        <section class=css::panel aria-label=PANEL_TITLE>
            <header class=css::header>
                <span class=css::headerIcon><Icon icon=ic::STORAGE /></span>
                <h1 class=css::title>{PANEL_TITLE}</h1>
                <div
                    class=indicator_class
                    role="progressbar"
                    aria-hidden=move || (!panel.busy.get()).to_string()
                ></div>
            </header>
            {move || match (panel.error.get(), panel.session.get()) {
                (Some(message), _) => view! { <Notice message=message /> }.into_any(),
                (None, None) => view! { <Notice message="Connecting...".to_string() /> }.into_any(),
                (None, Some(SessionStatus::ConfigError)) => {
                    view! { <Notice message=CONFIG_ERROR_MESSAGE.to_string() /> }.into_any()
                }
                (None, Some(SessionStatus::LoginRequired)) => view! { <LoginPrompt /> }.into_any(),
                (None, Some(SessionStatus::Ready)) => view! { <BrowserBody /> }.into_any(),
            }}
        </section>
    }
}

#[component]
fn BrowserBody() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let panel = ctx.panel;

    let content_class = move || {
        let mut class = css::content.to_string();
        if !panel.content_interactive.get() {
            class.push(' ');
            class.push_str(css::contentDimmed);
        }
        if panel.content_hidden.get() {
            class.push(' ');
            class.push_str(css::contentHidden);
        }
        class
    };

    view! {
        <ActionBar />
        <PathBar />
        <div class=content_class aria-busy=move || panel.busy.get().to_string()>
            <FileList />
        </div>
    }
}
