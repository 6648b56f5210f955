//! Listing of the current directory.

use bucketfs_core::{Entry, EntryKind};
use icondata::Icon as IconData;
use leptos::prelude::*;
use leptos_icons::Icon;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::utils::format::{display_name, format_modified, format_size};

stylance::import_crate_style!(css, "src/components/browser/file_list.module.css");

fn icon_for(kind: EntryKind) -> IconData {
    match kind {
        EntryKind::Bucket => ic::BUCKET,
        EntryKind::Directory => ic::FOLDER,
        EntryKind::Object => ic::FILE,
    }
}

#[component]
pub fn FileList() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let entries = ctx.panel.entries;

    view! {
        <div class=css::list role="grid" aria-label="File list">
            <div class=css::listHeader role="row">
                <span class=css::headerIcon></span>
                <span>"Name"</span>
                <span class=css::headerDate>"Modified"</span>
                <span class=css::headerSize>"Size"</span>
            </div>
            <Show
                when=move || !entries.with(|e| e.is_empty())
                fallback=|| view! { <div class=css::empty>"This folder is empty"</div> }
            >
                <For
                    each=move || entries.get()
                    key=|entry| (entry.name.clone(), entry.kind, entry.last_modified)
                    children=move |entry| view! { <FileListItem entry=entry /> }
                />
            </Show>
        </div>
    }
}

#[component]
fn FileListItem(entry: Entry) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let selection = ctx.panel.selection;

    let is_container = entry.is_container();
    let icon = icon_for(entry.kind);
    let label = display_name(&entry);
    let modified = format_modified(&entry);
    let size = format_size(entry.size);

    // Rows are told apart by name and kind
    let kind = entry.kind;
    let name = entry.name.clone();
    let name_for_select = entry.name.clone();
    let is_selected = Signal::derive(move || {
        selection.with(|s| matches!(s, Some((n, k)) if *n == name && *k == kind))
    });

    // Single click selects
    let handle_click = move |_: leptos::ev::MouseEvent| {
        selection.set(Some((name_for_select.clone(), kind)));
    };

    // Double click enters containers and downloads objects
    let entry_name = entry.name.clone();
    let handle_dblclick = move |_: leptos::ev::MouseEvent| {
        if is_container {
            ctx.open(entry_name.clone());
        } else {
            ctx.download(entry_name.clone());
        }
    };

    let item_class = move || {
        if is_selected.get() {
            format!("{} {}", css::listItem, css::selected)
        } else {
            css::listItem.to_string()
        }
    };
    let name_class = if is_container {
        format!("{} {}", css::name, css::nameDir)
    } else {
        css::name.to_string()
    };

    let aria_label = match entry.kind {
        EntryKind::Bucket => format!("Bucket: {}", entry.name),
        EntryKind::Directory => format!("Folder: {}", entry.name),
        EntryKind::Object => format!("File: {}", entry.name),
    };

    view! {
        <div
            class=item_class
            on:click=handle_click
            on:dblclick=handle_dblclick
            role="row"
            tabindex="0"
            aria-label=aria_label
            aria-selected=move || is_selected.get().to_string()
        >
            <span class=css::icon aria-hidden="true"><Icon icon=icon /></span>
            <span class=name_class>{label}</span>
            <span class=css::itemDate>{modified}</span>
            <span class=css::size>{size}</span>
        </div>
    }
}
