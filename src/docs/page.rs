use super::{AccessList, AddMembers, DocVisibility};
use crate::components::ui::{Alert, AlertDescription, Spinner};
use crate::editor::{DocEditor, EditorState};
use crate::models::Doc;
use crate::outline::TableContent;
use crate::query::{Partition, QueryKey, QueryState};
use crate::state::AppContext;
use leptos::prelude::*;
use leptos_router::params::Params;

#[derive(Params, PartialEq, Clone, Debug)]
pub struct DocRouteParams {
    pub id: Option<String>,
}

pub(crate) fn doc_key(id: &str) -> Option<QueryKey> {
    if id.is_empty() {
        return None;
    }
    Some(QueryKey::new(Partition::Doc).with(id))
}

/// Editor content is loaded once per document: refetches of the same doc
/// (after a visibility change, say) must not clobber local edits.
pub(crate) fn should_load_content(loaded: Option<&str>, doc_id: &str) -> bool {
    loaded != Some(doc_id)
}

#[component]
pub fn DocPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let api_client = app_state.api_client;
    let params = leptos_router::hooks::use_params::<DocRouteParams>();

    let doc_id = Memo::new(move |_| params.get().ok().and_then(|p| p.id).unwrap_or_default());

    let doc_query = app_state.queries.use_query(
        move || doc_key(&doc_id.get()),
        move |_key| {
            let api = api_client.get_untracked();
            let id = doc_id.get_untracked();
            async move { api.get_doc(&id).await }
        },
    );
    let doc: Memo<Option<Doc>> = Memo::new(move |_| doc_query.with(|s| s.data().cloned()));

    let editor = EditorState::new("");
    let loaded_id: RwSignal<Option<String>> = RwSignal::new(None);
    Effect::new(move |_| {
        let Some(d) = doc.get() else {
            return;
        };
        if should_load_content(loaded_id.get_untracked().as_deref(), &d.id) {
            editor.replace_content(&d.content);
            loaded_id.set(Some(d.id));
        }
    });

    let abilities = Signal::derive(move || doc.get().map(|d| d.abilities).unwrap_or_default());

    view! {
        <div data-name="DocPage" class="mx-auto flex w-full max-w-6xl gap-6 px-4 py-6">
            <div class="flex min-w-0 flex-1 flex-col gap-4">
                {move || match doc_query.get() {
                    QueryState::Idle | QueryState::Loading if doc.with_untracked(Option::is_none) => {
                        view! { <Spinner label="Loading document" /> }.into_any()
                    }
                    QueryState::Error(e) => view! {
                        <Alert>
                            <AlertDescription>{e.describe()}</AlertDescription>
                        </Alert>
                    }
                    .into_any(),
                    _ => ().into_any(),
                }}

                <Show when=move || doc.with(Option::is_some) fallback=|| ().into_view()>
                    <h1 class="text-2xl font-bold">
                        {move || doc.with(|d| d.as_ref().map(|d| d.display_title().to_string()))}
                    </h1>
                    // Rebuilt per document so member forms never carry over.
                    {move || {
                        let members_id = doc_id.get();
                        let accesses_id = members_id.clone();
                        view! {
                            <DocVisibility
                                doc=Signal::derive(move || doc.get().unwrap_or_default())
                                synced=doc_query.settled()
                            />
                            <Show when=move || abilities.get().accesses_manage fallback=|| ().into_view()>
                                <AddMembers doc_id=members_id.clone() abilities=abilities />
                            </Show>
                            <Show when=move || abilities.get().accesses_view fallback=|| ().into_view()>
                                <AccessList doc_id=accesses_id.clone() />
                            </Show>
                        }
                    }}
                    <DocEditor state=editor />
                </Show>
            </div>
            <aside class="hidden w-56 shrink-0 md:block">
                <div class="sticky top-4">
                    <TableContent editor=editor />
                </div>
            </aside>
        </div>
    }
}
