use leptos::prelude::*;
use tw_merge::tw_merge;

/// Labelled on/off switch. `checked` is owned by the caller; `on_change`
/// receives the requested value.
#[component]
pub fn Switch(
    #[prop(into)] checked: Signal<bool>,
    #[prop(into)] on_change: Callback<bool>,
    #[prop(into)] label: Signal<String>,
    #[prop(into, optional)] text: Signal<String>,
    #[prop(into, optional)] disabled: Signal<bool>,
    #[prop(into, optional)] class: String,
) -> impl IntoView {
    let wrapper_class = tw_merge!("flex items-start gap-3", class);

    let track_class = move || {
        tw_merge!(
            "relative inline-flex h-5 w-9 shrink-0 items-center rounded-full border-2 border-transparent transition-colors outline-none focus-visible:ring-[3px] focus-visible:ring-ring/50 disabled:cursor-not-allowed disabled:opacity-50",
            if checked.get() { "bg-primary" } else { "bg-input" }
        )
    };
    let thumb_class = move || {
        tw_merge!(
            "pointer-events-none block size-4 rounded-full bg-background shadow-sm transition-transform",
            if checked.get() { "translate-x-4" } else { "translate-x-0" }
        )
    };

    view! {
        <label data-name="Switch" class=wrapper_class>
            <button
                type="button"
                role="switch"
                class=track_class
                aria-checked=move || checked.get().to_string()
                disabled=move || disabled.get()
                on:click=move |_| on_change.run(!checked.get_untracked())
            >
                <span class=thumb_class />
            </button>
            <span class="flex flex-col gap-0.5">
                <span class="text-sm font-medium leading-none">{move || label.get()}</span>
                <Show when=move || !text.get().is_empty() fallback=|| ().into_view()>
                    <span class="text-xs text-muted-foreground">{move || text.get()}</span>
                </Show>
            </span>
        </label>
    }
}
