use crate::api::ApiClient;
use crate::query::QueryClient;
use crate::toast::Toaster;
use leptos::prelude::*;

#[derive(Clone)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,

    /// Request cache for the whole session.
    pub queries: QueryClient,

    pub toaster: Toaster,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            api_client: RwSignal::new(ApiClient::from_env()),
            queries: QueryClient::default(),
            toaster: Toaster::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);
