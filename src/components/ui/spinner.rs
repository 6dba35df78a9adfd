use icons::LoaderCircle;
use leptos::prelude::*;
use tw_merge::tw_merge;

/// Busy indicator; exposes `role="status"` so loading regions are announced.
#[component]
pub fn Spinner(
    #[prop(into, optional)] class: String,
    #[prop(into, default = "Loading".to_string())] label: String,
) -> impl IntoView {
    let merged_class = tw_merge!("size-4 animate-spin", class);

    view! { <LoaderCircle class=merged_class attr:role="status" attr:aria-label=label /> }
}
