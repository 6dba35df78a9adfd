use super::{PadIconVariant, PADS_EMPTY_TEXT};
use crate::components::ui::{CardItem, CardList, Spinner};
use crate::models::Pad;
use crate::panels::{ListView, LIST_ERROR_TEXT};
use crate::query::{Partition, QueryKey};
use crate::state::AppContext;
use icons::{User, Users};
use leptos::prelude::*;

#[component]
fn PadIcon(variant: PadIconVariant) -> impl IntoView {
    let label = variant.aria_label();
    match variant {
        PadIconVariant::Empty => {
            view! { <User class="size-5 text-muted-foreground" attr:aria-label=label /> }.into_any()
        }
        PadIconVariant::Populated => {
            view! { <Users class="size-5 text-primary" attr:aria-label=label /> }.into_any()
        }
    }
}

/// First page of the viewer's pads, most recent first.
#[component]
pub fn PadList() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let api_client = app_state.api_client;

    let pads = app_state.queries.use_query(
        move || Some(QueryKey::new(Partition::PadList).with(1)),
        move |_key| {
            let api = api_client.get_untracked();
            async move { api.list_pads(1).await }
        },
    );
    let view_state = Memo::new(move |_| ListView::from_query(&pads.get()));

    view! {
        <div data-name="PadList">
            {move || match view_state.get() {
                ListView::Loading => view! {
                    <div class="flex justify-center py-4">
                        <Spinner label="Loading pads" />
                    </div>
                }
                .into_any(),
                ListView::Error => view! {
                    <p class="text-sm text-destructive">{LIST_ERROR_TEXT}</p>
                }
                .into_any(),
                ListView::Empty => view! {
                    <div class="flex flex-col items-center gap-2 py-4 text-center">
                        <PadIcon variant=PadIconVariant::Empty />
                        <p class="text-sm text-muted-foreground">{PADS_EMPTY_TEXT}</p>
                    </div>
                }
                .into_any(),
                ListView::Items(items) => view! { <PadRows pads=items /> }.into_any(),
            }}
        </div>
    }
}

#[component]
fn PadRows(pads: Vec<Pad>) -> impl IntoView {
    view! {
        <CardList>
            {pads
                .into_iter()
                .map(|pad| {
                    let variant = PadIconVariant::for_pad(&pad);
                    view! {
                        <CardItem>
                            <PadIcon variant=variant />
                            <span class="truncate text-sm">{pad.name}</span>
                        </CardItem>
                    }
                })
                .collect_view()}
        </CardList>
    }
}
