use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardHeader, CardItem, CardList, CardTitle,
    Spinner,
};
use crate::models::{Doc, Page};
use crate::panels::{ListView, LIST_ERROR_TEXT};
use crate::query::{Partition, QueryKey, QueryState};
use crate::state::AppContext;
use icons::{ChevronLeft, ChevronRight};
use leptos::prelude::*;

pub(crate) fn doc_href(id: &str) -> String {
    format!("/docs/{id}")
}

/// Page reached by the pagination buttons, if the server announced one.
pub(crate) fn adjacent_page<T>(page: &Page<T>, current: u32, forward: bool) -> Option<u32> {
    if forward {
        page.next.as_ref().map(|_| current + 1)
    } else {
        page.previous.as_ref().and(current.checked_sub(1)).filter(|p| *p >= 1)
    }
}

/// Documents the viewer can reach, most recent first.
#[component]
pub fn DocList() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let api_client = app_state.api_client;
    let page_number: RwSignal<u32> = RwSignal::new(1);

    let docs = app_state.queries.use_query(
        move || Some(QueryKey::new(Partition::DocList).with(page_number.get())),
        move |_key| {
            let api = api_client.get_untracked();
            let page = page_number.get_untracked();
            async move { api.list_docs(page).await }
        },
    );

    let view_state = Memo::new(move |_| ListView::from_query(&docs.get()));
    let go = move |forward: bool| {
        if let QueryState::Success(page) = docs.get_untracked() {
            if let Some(n) = adjacent_page(&page, page_number.get_untracked(), forward) {
                page_number.set(n);
            }
        }
    };
    let has = move |forward: bool| {
        docs.with(|s| {
            s.data()
                .and_then(|p| adjacent_page(p, page_number.get(), forward))
                .is_some()
        })
    };

    view! {
        <Card attr:aria-label="Documents">
            <CardHeader>
                <CardTitle class="text-base">"Documents"</CardTitle>
                {move || docs.with(|s| s.data().map(|p| p.count)).map(|n| {
                    view! { <span class="text-xs text-muted-foreground">{format!("{n} documents")}</span> }
                })}
            </CardHeader>
            <CardContent>
                {move || match view_state.get() {
                    ListView::Loading => view! { <Spinner label="Loading documents" /> }.into_any(),
                    ListView::Error => view! { <div class="text-sm text-destructive">{LIST_ERROR_TEXT}</div> }.into_any(),
                    ListView::Empty => view! {
                        <div class="text-sm text-muted-foreground">"No document yet."</div>
                    }
                    .into_any(),
                    ListView::Items(items) => view! { <DocRows docs=items /> }.into_any(),
                }}
            </CardContent>
            <div class="flex items-center justify-end gap-2 px-4">
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Sm
                    attr:aria-label="Previous page"
                    attr:disabled=move || !has(false)
                    on:click=move |_| go(false)
                >
                    <ChevronLeft class="size-4" />
                </Button>
                <span class="text-xs text-muted-foreground">{move || page_number.get()}</span>
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Sm
                    attr:aria-label="Next page"
                    attr:disabled=move || !has(true)
                    on:click=move |_| go(true)
                >
                    <ChevronRight class="size-4" />
                </Button>
            </div>
        </Card>
    }
}

#[component]
fn DocRows(docs: Vec<Doc>) -> impl IntoView {
    view! {
        <CardList>
            {docs
                .into_iter()
                .map(|doc| {
                    let href = doc_href(&doc.id);
                    let title = doc.display_title().to_string();
                    let reach = if doc.is_public() { "Public" } else { "Private" };
                    view! {
                        <CardItem class="justify-between">
                            <a href=href class="truncate text-sm hover:underline">{title}</a>
                            <span class="text-xs text-muted-foreground">{reach}</span>
                        </CardItem>
                    }
                })
                .collect_view()}
        </CardList>
    }
}
