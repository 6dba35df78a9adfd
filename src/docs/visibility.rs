use crate::api::LinkConfigurationRequest;
use crate::components::ui::{Button, ButtonSize, ButtonVariant, Card, Switch};
use crate::models::{Doc, LinkReach, LinkRole};
use crate::query::Partition;
use crate::state::AppContext;
use crate::toast::{ToastVariant, TOAST_DEFAULT_MS, TOAST_SHORT_MS};
use crate::util::{current_href, write_clipboard_text};
use icons::{Copy as CopyIcon, Globe};
use leptos::logging::{error, log};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// Partitions refreshed after a link configuration request, successful or
/// not, so the switch, capability flags and list counts follow the server.
pub(crate) const LINK_UPDATE_INVALIDATES: [Partition; 2] = [Partition::DocList, Partition::Doc];

pub(crate) const VISIBILITY_UPDATED: &str = "The document visibility has been updated.";
pub(crate) const VISIBILITY_FAILED: &str = "The document visibility could not be updated.";
pub(crate) const LINK_COPIED: &str = "Link Copied !";
pub(crate) const LINK_COPY_FAILED: &str = "Failed to copy link";

/// Switch label and help text for the displayed state.
pub(crate) fn visibility_copy(is_public: bool) -> (&'static str, &'static str) {
    if is_public {
        ("Doc public", "Anyone on the internet with the link can view")
    } else {
        ("Doc private", "Only for people with access")
    }
}

/// Body that flips the displayed state. Opening the link always grants read only.
pub(crate) fn toggled_link(is_public: bool) -> LinkConfigurationRequest {
    LinkConfigurationRequest {
        link_reach: if is_public {
            LinkReach::Restricted
        } else {
            LinkReach::Public
        },
        link_role: LinkRole::Reader,
    }
}

pub(crate) fn copy_link_outcome(result: &Result<(), String>) -> (&'static str, ToastVariant) {
    match result {
        Ok(()) => (LINK_COPIED, ToastVariant::Success),
        Err(_) => (LINK_COPY_FAILED, ToastVariant::Error),
    }
}

/// Sharing card: public/private switch plus a copy-link button.
///
/// The switch flips immediately whatever the request outcome; the displayed
/// value is provisional and is replaced by the server value each time a fetch
/// of the document completes (`synced` ticks), even if nothing changed.
#[component]
pub fn DocVisibility(
    #[prop(into)] doc: Signal<Doc>,
    #[prop(into)] synced: Signal<u64>,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let toaster = app_state.toaster;

    let doc_public = RwSignal::new(doc.with_untracked(Doc::is_public));
    Effect::new(move |_| {
        synced.track();
        doc_public.set(doc.with(Doc::is_public));
    });

    let on_change = {
        let app_state = app_state.clone();
        Callback::new(move |_requested: bool| {
            let was_public = doc_public.get_untracked();
            let id = doc.with_untracked(|d| d.id.clone());
            let body = toggled_link(was_public);
            doc_public.set(!was_public);

            let api_client = app_state.api_client.get_untracked();
            let queries = app_state.queries.clone();
            let toaster = app_state.toaster;
            spawn_local(async move {
                match api_client.update_doc_link(&id, &body).await {
                    Ok(_) => {
                        log!("doc {id}: link reach set to {}", body.link_reach.as_ref());
                        toaster.success(VISIBILITY_UPDATED, TOAST_DEFAULT_MS);
                    }
                    Err(e) => {
                        error!("doc {id}: link update failed: {e}");
                        toaster.error(
                            format!("{VISIBILITY_FAILED} {}", e.describe()),
                            TOAST_DEFAULT_MS,
                        );
                    }
                }
                for partition in LINK_UPDATE_INVALIDATES {
                    queries.invalidate_queries(partition);
                }
            });
        })
    };

    let on_copy = move |_| {
        spawn_local(async move {
            let result = match current_href() {
                Some(href) => write_clipboard_text(&href).await,
                None => Err("location unavailable".to_string()),
            };
            if let Err(e) = &result {
                error!("copy link: {e}");
            }
            let (message, variant) = copy_link_outcome(&result);
            toaster.toast(message, variant, TOAST_SHORT_MS);
        });
    };

    view! {
        <Card class="flex-row items-center justify-between gap-4 px-4 py-2" attr:aria-label="Doc visibility card">
            <Globe class="size-5 text-primary" />
            <div class="flex w-full flex-wrap items-center justify-between gap-4">
                <Switch
                    checked=doc_public
                    on_change=on_change
                    label=Signal::derive(move || visibility_copy(doc_public.get()).0.to_string())
                    text=Signal::derive(move || visibility_copy(doc_public.get()).1.to_string())
                    disabled=Signal::derive(move || !doc.with(|d| d.abilities.link_configuration))
                />
                <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=on_copy>
                    <CopyIcon class="size-4" />
                    "Copy link"
                </Button>
            </div>
        </Card>
    }
}
