use crate::api::{ApiClient, ApiError, ApiResult, CauseContext, CreateDocAccessRequest};
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent, CardHeader,
    CardItem, CardList, CardTitle, Input, Spinner,
};
use crate::models::{Access, DocAbilities, Page, Role, User};
use crate::query::{Partition, QueryClient, QueryKey, QueryState};
use crate::state::AppContext;
use crate::toast::TOAST_DEFAULT_MS;
use crate::util::debounced;
use icons::X;
use leptos::logging::{error, log};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::str::FromStr;
use wasm_bindgen::JsCast;

/// Quiet period before a typed search becomes a request.
pub(crate) const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Adding a member changes both the addable-users view and the accesses view
/// of the same membership; those partitions and the doc list are reset and
/// refetched rather than patched.
pub(crate) const CREATE_ACCESS_RESETS: [Partition; 3] = [
    Partition::DocList,
    Partition::UserList,
    Partition::DocAccessList,
];

/// Role edits and removals only touch the access list and the viewer's
/// abilities on the doc.
pub(crate) const ACCESS_CHANGE_INVALIDATES: [Partition; 2] =
    [Partition::DocAccessList, Partition::Doc];

/// Roles the viewer may hand out when adding a member.
pub(crate) fn grantable_roles(abilities: &DocAbilities) -> Vec<Role> {
    if !abilities.accesses_manage {
        return Vec::new();
    }
    Role::ALL
        .into_iter()
        .filter(|r| *r != Role::Owner || abilities.invite_owner)
        .collect()
}

/// Current role first, then the roles the backend allows switching to.
pub(crate) fn role_options(access: &Access) -> Vec<Role> {
    let mut roles = vec![access.role];
    for r in &access.abilities.set_role_to {
        if !roles.contains(r) {
            roles.push(*r);
        }
    }
    roles
}

/// Only errors raised by the add-member form are shown inline in it.
pub(crate) fn is_new_member_error(e: &ApiError) -> bool {
    e.causes
        .as_ref()
        .is_some_and(|c| c.context == Some(CauseContext::NewMember))
}

pub(crate) fn accesses_key(doc_id: &str) -> QueryKey {
    QueryKey::new(Partition::DocAccessList).with(doc_id).with(1)
}

pub(crate) fn users_key(doc_id: &str, query: &str) -> Option<QueryKey> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    Some(QueryKey::new(Partition::UserList).with(doc_id).with(query))
}

pub(crate) async fn create_doc_access(
    api_client: &ApiClient,
    queries: &QueryClient,
    doc_id: &str,
    user_id: &str,
    role: Role,
) -> ApiResult<Access> {
    let access = api_client
        .create_doc_access(
            doc_id,
            &CreateDocAccessRequest {
                user_id: user_id.to_string(),
                role,
            },
        )
        .await?;

    log!("doc {doc_id}: access {} created as {}", access.id, role.as_ref());
    for partition in CREATE_ACCESS_RESETS {
        queries.reset_queries(partition);
    }
    Ok(access)
}

async fn change_access(
    api_client: &ApiClient,
    queries: &QueryClient,
    doc_id: &str,
    access_id: &str,
    role: Option<Role>,
) -> ApiResult<()> {
    match role {
        Some(role) => {
            api_client
                .update_doc_access(doc_id, access_id, role)
                .await?;
        }
        None => api_client.delete_doc_access(doc_id, access_id).await?,
    }
    for partition in ACCESS_CHANGE_INVALIDATES {
        queries.invalidate_queries(partition);
    }
    Ok(())
}

fn selected_role(ev: &web_sys::Event) -> Option<Role> {
    ev.target()
        .and_then(|t| t.dyn_into::<web_sys::HtmlSelectElement>().ok())
        .and_then(|s| Role::from_str(&s.value()).ok())
}

#[component]
fn RoleSelect(
    #[prop(into)] options: Vec<Role>,
    #[prop(into)] selected: Signal<Role>,
    #[prop(into)] on_select: Callback<Role>,
    #[prop(into, optional)] disabled: Signal<bool>,
) -> impl IntoView {
    view! {
        <select
            aria-label="Role"
            class="h-8 rounded-md border border-input bg-transparent px-2 text-sm disabled:opacity-50"
            disabled=move || disabled.get()
            on:change=move |ev| {
                if let Some(role) = selected_role(&ev) {
                    on_select.run(role);
                }
            }
        >
            {options
                .into_iter()
                .map(|r| {
                    view! {
                        <option value=r.as_ref().to_string() selected=move || selected.get() == r>
                            {r.label()}
                        </option>
                    }
                })
                .collect_view()}
        </select>
    }
}

/// Search users that are not members yet and grant one of them a role.
#[component]
pub fn AddMembers(doc_id: String, #[prop(into)] abilities: Signal<DocAbilities>) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let api_client = app_state.api_client;

    let search: RwSignal<String> = RwSignal::new(String::new());
    let picked: RwSignal<Option<User>> = RwSignal::new(None);
    let role: RwSignal<Role> = RwSignal::new(Role::Reader);
    let pending: RwSignal<bool> = RwSignal::new(false);
    let form_error: RwSignal<Option<ApiError>> = RwSignal::new(None);

    let query = debounced(search, SEARCH_DEBOUNCE_MS);

    let key_doc_id = doc_id.clone();
    let users = app_state.queries.use_query(
        move || users_key(&key_doc_id, &query.get()),
        {
            let doc_id = doc_id.clone();
            move |_key| {
                let api = api_client.get_untracked();
                let doc_id = doc_id.clone();
                let q = query.get_untracked();
                async move { api.list_users(&q, Some(&doc_id)).await }
            }
        },
    );

    let on_submit = {
        let app_state = app_state.clone();
        let doc_id = doc_id.clone();
        move |_| {
            let Some(user) = picked.get_untracked() else {
                return;
            };
            let api = app_state.api_client.get_untracked();
            let queries = app_state.queries.clone();
            let toaster = app_state.toaster;
            let doc_id = doc_id.clone();
            let role_val = role.get_untracked();

            pending.set(true);
            form_error.set(None);
            spawn_local(async move {
                match create_doc_access(&api, &queries, &doc_id, &user.id, role_val).await {
                    Ok(_) => {
                        toaster.success(
                            format!("{} has been added to the document.", user.display_name()),
                            TOAST_DEFAULT_MS,
                        );
                        picked.set(None);
                        search.set(String::new());
                    }
                    Err(e) => {
                        error!("doc {doc_id}: adding member failed: {e}");
                        if is_new_member_error(&e) {
                            form_error.set(Some(e));
                        } else {
                            toaster.error(e.describe(), TOAST_DEFAULT_MS);
                        }
                    }
                }
                pending.set(false);
            });
        }
    };

    let roles = Signal::derive(move || grantable_roles(&abilities.get()));

    view! {
        <Card>
            <CardHeader>
                <CardTitle class="text-base">"Share the document"</CardTitle>
            </CardHeader>
            <CardContent class="flex flex-col gap-3">
                <Input
                    placeholder="Search by email"
                    aria_label="Search new members"
                    bind_value=search
                />

                {move || match users.get() {
                    QueryState::Idle => ().into_any(),
                    QueryState::Loading => view! { <Spinner label="Searching users" /> }.into_any(),
                    QueryState::Error(e) => view! {
                        <div class="text-xs text-destructive">{e.to_string()}</div>
                    }
                    .into_any(),
                    QueryState::Success(page) => view! { <UserResults page=page picked=picked /> }.into_any(),
                }}

                <Show when=move || picked.get().is_some() fallback=|| ().into_view()>
                    <div class="flex items-center justify-between gap-2 rounded-md border px-3 py-2 text-sm">
                        <span>{move || picked.get().map(|u| u.display_name().to_string())}</span>
                        <button
                            class="text-muted-foreground hover:text-foreground"
                            aria-label="Remove the selected user"
                            on:click=move |_| picked.set(None)
                        >
                            <X class="size-4" />
                        </button>
                    </div>
                </Show>

                <div class="flex items-center gap-2">
                    {move || {
                        let options = roles.get();
                        view! {
                            <RoleSelect
                                options=options
                                selected=role
                                on_select=Callback::new(move |r| role.set(r))
                            />
                        }
                    }}
                    <Button
                        size=ButtonSize::Sm
                        attr:disabled=move || pending.get() || picked.get().is_none() || roles.get().is_empty()
                        on:click=on_submit
                    >
                        <Show when=move || pending.get() fallback=|| ().into_view()>
                            <Spinner />
                        </Show>
                        "Add"
                    </Button>
                </div>

                <Show when=move || form_error.get().is_some() fallback=|| ().into_view()>
                    {move || {
                        form_error.get().map(|e| {
                            let causes = e.causes.map(|c| c.causes).unwrap_or_default();
                            view! {
                                <Alert>
                                    <AlertDescription>{e.message.clone()}</AlertDescription>
                                    {causes
                                        .into_iter()
                                        .map(|c| view! { <AlertDescription class="text-xs">{c}</AlertDescription> })
                                        .collect_view()}
                                </Alert>
                            }
                        })
                    }}
                </Show>
            </CardContent>
        </Card>
    }
}

#[component]
fn UserResults(page: Page<User>, picked: RwSignal<Option<User>>) -> impl IntoView {
    if page.results.is_empty() {
        return view! { <div class="text-xs text-muted-foreground">"No user found."</div> }.into_any();
    }

    view! {
        <CardList attr:aria-label="Search results">
            {page
                .results
                .into_iter()
                .map(|user| {
                    let name = user.display_name().to_string();
                    let email = user.email.clone();
                    view! {
                        <CardItem>
                            <button
                                class="flex w-full flex-col items-start text-left"
                                on:click=move |_| picked.set(Some(user.clone()))
                            >
                                <span class="text-sm">{name}</span>
                                <span class="text-xs text-muted-foreground">{email}</span>
                            </button>
                        </CardItem>
                    }
                })
                .collect_view()}
        </CardList>
    }
    .into_any()
}

/// Current members of the document with role edition and removal.
#[component]
pub fn AccessList(doc_id: String) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let api_client = app_state.api_client;

    let key_doc_id = doc_id.clone();
    let fetch_doc_id = doc_id.clone();
    let accesses = app_state.queries.use_query(
        move || Some(accesses_key(&key_doc_id)),
        move |_key| {
            let api = api_client.get_untracked();
            let doc_id = fetch_doc_id.clone();
            async move { api.list_doc_accesses(&doc_id, 1).await }
        },
    );

    let change = {
        let app_state = app_state.clone();
        Callback::new(move |(access_id, role): (String, Option<Role>)| {
            let api = app_state.api_client.get_untracked();
            let queries = app_state.queries.clone();
            let toaster = app_state.toaster;
            let doc_id = doc_id.clone();
            spawn_local(async move {
                match change_access(&api, &queries, &doc_id, &access_id, role).await {
                    Ok(()) => {
                        let message = if role.is_some() {
                            "The role has been updated."
                        } else {
                            "The member has been removed from the document."
                        };
                        toaster.success(message, TOAST_DEFAULT_MS);
                    }
                    Err(e) => {
                        error!("doc {doc_id}: access {access_id} change failed: {e}");
                        toaster.error(e.describe(), TOAST_DEFAULT_MS);
                    }
                }
            });
        })
    };

    view! {
        <Card>
            <CardHeader>
                <CardTitle class="text-base">"Members"</CardTitle>
                {move || {
                    accesses
                        .get()
                        .data()
                        .map(|p| view! { <span class="text-xs text-muted-foreground">{format!("{} total", p.count)}</span> })
                }}
            </CardHeader>
            <CardContent>
                {move || match accesses.get() {
                    QueryState::Idle | QueryState::Loading => view! { <Spinner label="Loading members" /> }.into_any(),
                    QueryState::Error(e) => view! {
                        <Alert>
                            <AlertDescription>{e.describe()}</AlertDescription>
                        </Alert>
                    }
                    .into_any(),
                    QueryState::Success(page) => view! {
                        <CardList>
                            {page
                                .results
                                .into_iter()
                                .map(|access| view! { <AccessRow access=access change=change /> })
                                .collect_view()}
                        </CardList>
                    }
                    .into_any(),
                }}
            </CardContent>
        </Card>
    }
}

#[component]
fn AccessRow(access: Access, change: Callback<(String, Option<Role>)>) -> impl IntoView {
    let options = role_options(&access);
    let can_update = options.len() > 1;
    let can_destroy = access.abilities.destroy;
    let role = access.role;
    let name_class = if role.is_privileged() { "text-sm font-medium" } else { "text-sm" };
    let role_id = access.id.clone();
    let remove_id = access.id.clone();

    view! {
        <CardItem class="justify-between">
            <span class=name_class>{access.member_name()}</span>
            <div class="flex items-center gap-2">
                <RoleSelect
                    options=options
                    selected=Signal::derive(move || role)
                    disabled=Signal::derive(move || !can_update)
                    on_select=Callback::new(move |r: Role| {
                        if r != role {
                            change.run((role_id.clone(), Some(r)));
                        }
                    })
                />
                <Show when=move || can_destroy fallback=|| ().into_view()>
                    {
                        let remove_id = remove_id.clone();
                        view! {
                            <Button
                                variant=ButtonVariant::Ghost
                                size=ButtonSize::Icon
                                attr:aria-label="Remove the member"
                                on:click=move |_| change.run((remove_id.clone(), None))
                            >
                                <X class="size-4" />
                            </Button>
                        }
                    }
                </Show>
            </div>
        </CardItem>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiErrorKind, ErrorCauses};
    use crate::models::AccessAbilities;
    use crate::query::cache::CacheStatus;
    use crate::query::cache::QueryCache;
    use serde_json::json;

    fn access(role: Role, set_role_to: Vec<Role>) -> Access {
        Access {
            id: "a1".to_string(),
            role,
            user: None,
            team: None,
            abilities: AccessAbilities {
                set_role_to,
                ..AccessAbilities::default()
            },
        }
    }

    #[test]
    fn test_grantable_roles_require_manage_and_invite_owner() {
        let mut abilities = DocAbilities::default();
        assert!(grantable_roles(&abilities).is_empty());

        abilities.accesses_manage = true;
        assert_eq!(
            grantable_roles(&abilities),
            vec![Role::Reader, Role::Editor, Role::Administrator]
        );

        abilities.invite_owner = true;
        assert_eq!(grantable_roles(&abilities).last(), Some(&Role::Owner));
    }

    #[test]
    fn test_role_options_current_first_without_duplicates() {
        let a = access(Role::Editor, vec![Role::Reader, Role::Editor, Role::Owner]);
        assert_eq!(role_options(&a), vec![Role::Editor, Role::Reader, Role::Owner]);
        assert_eq!(role_options(&access(Role::Reader, vec![])), vec![Role::Reader]);
    }

    #[test]
    fn test_new_member_errors_are_recognized() {
        let mut e = ApiError {
            kind: ApiErrorKind::Http,
            message: "Failed to add the member in the doc.".to_string(),
            causes: Some(ErrorCauses {
                status: 400,
                causes: vec!["already a member".to_string()],
                context: Some(CauseContext::NewMember),
            }),
        };
        assert!(is_new_member_error(&e));
        e.causes = None;
        assert!(!is_new_member_error(&e));
    }

    #[test]
    fn test_users_key_requires_query() {
        assert_eq!(users_key("d1", "   "), None);
        assert_eq!(
            users_key("d1", " nicole ").map(|k| k.to_string()).as_deref(),
            Some("user_list/d1/nicole")
        );
    }

    #[test]
    fn test_create_access_resets_exactly_three_partitions() {
        let mut cache = QueryCache::default();
        let keys = [
            QueryKey::new(Partition::DocList).with(1),
            QueryKey::new(Partition::Doc).with("d1"),
            QueryKey::new(Partition::UserList).with("d1").with("nic"),
            accesses_key("d1"),
            QueryKey::new(Partition::PadList).with(1),
        ];
        for key in &keys {
            let t = cache.begin_fetch(key);
            cache.complete_fetch(&t, Ok(json!({"count": 1})), 0);
        }

        for partition in CREATE_ACCESS_RESETS {
            assert_eq!(cache.reset(partition), 1);
        }

        let loading: Vec<bool> = keys
            .iter()
            .map(|k| matches!(cache.status(k), CacheStatus::Loading))
            .collect();
        assert_eq!(loading, vec![true, false, true, true, false]);
    }
}
