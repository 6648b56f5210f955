//! Action bar: toolbar buttons plus actions on the selected row.

use bucketfs_core::{EntryKind, ToolbarAction};
use icondata::Icon as IconData;
use leptos::html;
use leptos::prelude::*;
use leptos_icons::Icon;
use wasm_bindgen_futures::spawn_local;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::utils::dom;

stylance::import_crate_style!(css, "src/components/browser/action_bar.module.css");

#[component]
pub fn ActionBar() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let panel = ctx.panel;
    let file_input: NodeRef<html::Input> = NodeRef::new();

    let can_create = panel.is_enabled(ToolbarAction::NewFolder);
    let can_upload = panel.is_enabled(ToolbarAction::Upload);
    let can_refresh = panel.is_enabled(ToolbarAction::Refresh);
    let at_root = Signal::derive(move || panel.current_path.get().is_root());

    // Kind of the selected row, if it is still listed
    let selected_kind = Signal::derive(move || {
        let (name, kind) = panel.selection.get()?;
        panel
            .entries
            .with(|entries| entries.iter().any(|e| e.name == name && e.kind == kind))
            .then_some(kind)
    });
    let has_selection = Signal::derive(move || {
        matches!(
            selected_kind.get(),
            Some(EntryKind::Directory | EntryKind::Object)
        )
    });
    let object_selected = Signal::derive(move || selected_kind.get() == Some(EntryKind::Object));

    let with_selection = move |action: fn(&AppContext, String, EntryKind)| {
        move || {
            if let Some((name, kind)) = panel.selection.get_untracked() {
                action(&ctx, name, kind);
            }
        }
    };

    let on_files_chosen = move |_: leptos::ev::Event| {
        let Some(input) = file_input.get_untracked() else {
            return;
        };
        let Some(files) = input.files() else {
            return;
        };
        spawn_local(async move {
            let selected = dom::read_selection(files).await;
            // Clear so choosing the same file again fires `change`
            input.set_value("");
            ctx.upload(selected);
        });
    };

    view! {
        <div class=css::bar role="toolbar">
            <div class=css::group>
                <BarButton
                    icon=ic::UP
                    label="Up"
                    enabled=Signal::derive(move || !at_root.get())
                    on_click=move || ctx.up()
                />
                <BarButton
                    icon=ic::NEW_FOLDER
                    label=ToolbarAction::NewFolder.label()
                    enabled=can_create
                    on_click=move || ctx.new_folder()
                />
                <BarButton
                    icon=ic::UPLOAD
                    label=ToolbarAction::Upload.label()
                    enabled=can_upload
                    on_click=move || {
                        if let Some(input) = file_input.get_untracked() {
                            input.click();
                        }
                    }
                />
                <BarButton
                    icon=ic::REFRESH
                    label=ToolbarAction::Refresh.label()
                    enabled=can_refresh
                    on_click=move || ctx.refresh()
                />
                <input
                    class=css::fileInput
                    type="file"
                    multiple=true
                    node_ref=file_input
                    on:change=on_files_chosen
                />
            </div>
            <div class=css::group>
                <BarButton
                    icon=ic::DOWNLOAD
                    label="Download"
                    enabled=object_selected
                    on_click=with_selection(|ctx, name, _| ctx.download(name))
                />
                <BarButton
                    icon=ic::RENAME
                    label="Rename"
                    enabled=has_selection
                    on_click=with_selection(AppContext::rename)
                />
                <BarButton
                    icon=ic::DUPLICATE
                    label="Duplicate"
                    enabled=has_selection
                    on_click=with_selection(AppContext::duplicate)
                />
                <BarButton
                    icon=ic::MOVE
                    label="Move"
                    enabled=has_selection
                    on_click=with_selection(AppContext::relocate)
                />
                <BarButton
                    icon=ic::DELETE
                    label="Delete"
                    enabled=has_selection
                    on_click=with_selection(AppContext::delete)
                />
            </div>
        </div>
    }
}

#[component]
fn BarButton<F>(
    icon: IconData,
    label: &'static str,
    #[prop(into)] enabled: Signal<bool>,
    on_click: F,
) -> impl IntoView
where
    F: Fn() + 'static,
{
    view! {
        <button
            class=css::button
            title=label
            aria-label=label
            disabled=move || !enabled.get()
            on:click=move |_| on_click()
        >
            <span class=css::icon><Icon icon=icon /></span>
            <span class=css::label>{label}</span>
        </button>
    }
}
