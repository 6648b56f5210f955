//! Path bar with one clickable segment per level.

use bucketfs_core::StoragePath;
use leptos::prelude::*;
use leptos_icons::Icon;

use crate::app::AppContext;
use crate::components::icons as ic;

stylance::import_crate_style!(css, "src/components/browser/pathbar.module.css");

/// Segment data for path bar rendering.
#[derive(Clone)]
struct PathSegment {
    label: String,
    icon: icondata::Icon,
    /// Raw path to navigate to
    target: String,
}

/// Root, bucket, then every directory level of `path`.
fn segments(path: &StoragePath) -> Vec<PathSegment> {
    let mut segments = vec![PathSegment {
        label: "/".to_string(),
        icon: ic::STORAGE,
        target: String::new(),
    }];

    let Some(bucket) = path.bucket() else {
        return segments;
    };
    segments.push(PathSegment {
        label: bucket.to_string(),
        icon: ic::BUCKET,
        target: bucket.to_string(),
    });

    let mut target = bucket.to_string();
    for part in path.path().split('/').filter(|s| !s.is_empty()) {
        target.push('/');
        target.push_str(part);
        segments.push(PathSegment {
            label: part.to_string(),
            icon: ic::FOLDER,
            target: target.clone(),
        });
    }
    segments
}

#[component]
pub fn PathBar() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");

    view! {
        <nav class=css::pathbar aria-label="Current location">
            {move || {
                let segments = segments(&ctx.panel.current_path.get());
                let last = segments.len() - 1;

                segments
                    .into_iter()
                    .enumerate()
                    .map(|(idx, seg)| {
                        let is_current = idx == last;
                        let class = if is_current {
                            format!("{} {}", css::segment, css::segmentCurrent)
                        } else {
                            css::segment.to_string()
                        };
                        let target = seg.target;

                        view! {
                            {(idx > 0).then(|| view! {
                                <span class=css::separator>
                                    <Icon icon=ic::CHEVRON_RIGHT />
                                </span>
                            })}
                            <button
                                class=class
                                disabled=is_current
                                on:click=move |_| ctx.cd(target.clone())
                            >
                                <span class=css::icon><Icon icon=seg.icon /></span>
                                <span class=css::label>{seg.label}</span>
                            </button>
                        }
                    })
                    .collect_view()
            }}
        </nav>
    }
}
