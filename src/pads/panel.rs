use super::{panel_toggle_label, PadList};
use crate::components::ui::{Button, ButtonSize, ButtonVariant};
use icons::{ChevronLeft, ChevronRight};
use leptos::prelude::*;

/// Collapsible side panel listing recent pads.
///
/// Closing only hides the content region; the list stays mounted and keeps
/// its query subscription.
#[component]
pub fn Panel() -> impl IntoView {
    let open = RwSignal::new(true);

    view! {
        <aside data-name="PadsPanel" class="flex shrink-0 flex-col gap-2 border-r px-3 py-4">
            <div class="flex justify-end">
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Icon
                    attr:aria-label=move || panel_toggle_label(open.get())
                    on:click=move |_| open.update(|o| *o = !*o)
                >
                    {move || if open.get() {
                        view! { <ChevronLeft class="size-4" /> }.into_any()
                    } else {
                        view! { <ChevronRight class="size-4" /> }.into_any()
                    }}
                </Button>
            </div>
            <div
                class=move || if open.get() { "flex w-64 flex-col gap-2" } else { "hidden" }
                aria-hidden=move || (!open.get()).to_string()
            >
                <h2 class="text-sm font-semibold">"Recents"</h2>
                <PadList />
            </div>
        </aside>
    }
}
