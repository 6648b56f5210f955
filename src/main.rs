mod app;
mod components;
mod config;
mod utils;

use app::App;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

fn main() {
    console_error_panic_hook::set_once();
    utils::console::init_tracing();

    let Some(root) = document().get_element_by_id(config::MOUNT_ELEMENT_ID) else {
        tracing::error!("#{} element not found", config::MOUNT_ELEMENT_ID);
        return;
    };

    mount_to(root.unchecked_into::<web_sys::HtmlElement>(), App).forget();
}
