use crate::docs::{DocList, DocPage};
use crate::pads::Panel;
use crate::state::{AppContext, AppState};
use crate::toast::ToastRegion;
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
fn HomePage() -> impl IntoView {
    view! {
        <div class="flex min-h-screen">
            <Panel />
            <main class="flex-1 px-4 py-6">
                <DocList />
            </main>
        </div>
    }
}

#[component]
pub fn App() -> impl IntoView {
    provide_context(AppContext(AppState::new()));

    // Router hooks (`use_params`) need the <Router> context.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("docs/:id") view=DocPage />
                <Route path=path!("") view=HomePage />
            </Routes>
        </Router>
        <ToastRegion />
    }
}
