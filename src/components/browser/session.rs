//! Screens shown instead of the listing while the session is not ready.

use leptos::prelude::*;
use leptos_icons::Icon;

use crate::app::AppContext;
use crate::components::icons as ic;

stylance::import_crate_style!(css, "src/components/browser/session.module.css");

/// Centered status message.
#[component]
pub fn Notice(message: String) -> impl IntoView {
    view! {
        <div class=css::gate role="status">
            <p class=css::message>{message}</p>
        </div>
    }
}

/// Sign-in screen for a session that still needs an interactive login.
#[component]
pub fn LoginPrompt() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let busy = ctx.panel.busy;

    view! {
        <div class=css::gate>
            <p class=css::message>"Sign in to browse your buckets."</p>
            <button
                class=css::loginButton
                on:click=move |_| ctx.login()
                disabled=move || busy.get()
            >
                <Icon icon=ic::LOGIN />
                <span>"Sign in"</span>
            </button>
        </div>
    }
}
