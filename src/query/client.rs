use super::cache::{CacheStatus, Partition, QueryCache, QueryKey, DEFAULT_GC_TIME_MS};
use crate::api::{ApiError, ApiResult};
use crate::util::now_ms;
use leptos::logging::{log, warn};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::set_timeout;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Reactive view of one cached request.
#[derive(Clone, Debug)]
pub(crate) enum QueryState<T> {
    /// No key yet (e.g. an empty search box).
    Idle,
    Loading,
    Success(T),
    Error(ApiError),
}

impl<T: DeserializeOwned> QueryState<T> {
    fn from_status(status: CacheStatus) -> Self {
        match status {
            CacheStatus::Loading => Self::Loading,
            CacheStatus::Success(value) => match serde_json::from_value(value) {
                Ok(data) => Self::Success(data),
                Err(e) => Self::Error(ApiError::parse(e)),
            },
            CacheStatus::Error(e) => Self::Error(e),
        }
    }
}

impl<T> QueryState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }
}

/// One subscribed request: its current state plus the generation of the last
/// completed fetch, which ticks even when the server returned the same data.
pub(crate) struct Query<T: Send + Sync + 'static> {
    state: ReadSignal<QueryState<T>>,
    settled: ReadSignal<u64>,
}

impl<T: Send + Sync + 'static> Clone for Query<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Send + Sync + 'static> Copy for Query<T> {}

impl<T: Clone + Send + Sync + 'static> Query<T> {
    pub fn get(&self) -> QueryState<T> {
        self.state.get()
    }

    pub fn get_untracked(&self) -> QueryState<T> {
        self.state.get_untracked()
    }

    pub fn with<R>(&self, f: impl FnOnce(&QueryState<T>) -> R) -> R {
        self.state.with(f)
    }

    pub fn settled(&self) -> ReadSignal<u64> {
        self.settled
    }
}

/// Handle on the session request cache, shared through `AppContext`.
///
/// Every invalidation or reset bumps `revision`; queries track it and re-read
/// the cache, fetching whatever became missing or stale.
#[derive(Clone)]
pub(crate) struct QueryClient {
    cache: Arc<Mutex<QueryCache>>,
    revision: RwSignal<u64>,
}

impl QueryClient {
    pub fn new(cache: QueryCache) -> Self {
        Self {
            cache: Arc::new(Mutex::new(cache)),
            revision: RwSignal::new(0),
        }
    }

    fn with_cache<R>(&self, f: impl FnOnce(&mut QueryCache) -> R) -> R {
        let mut guard = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }

    fn notify(&self) {
        self.revision.update(|r| *r = r.wrapping_add(1));
    }

    /// Marks cached data stale; views keep showing it while refetching.
    pub fn invalidate_queries(&self, partition: Partition) {
        let n = self.with_cache(|c| c.invalidate(partition));
        log!("query: invalidated {partition} ({n} keys)");
        self.notify();
    }

    /// Discards cached data; views drop back to their loading state.
    pub fn reset_queries(&self, partition: Partition) {
        let n = self.with_cache(|c| c.reset(partition));
        log!("query: reset {partition} ({n} keys)");
        self.notify();
    }

    /// Moves the subscription held in `observed` to `next`. Released keys are
    /// collected once the gc time has passed without a new observer.
    fn observe(&self, observed: &Mutex<Option<QueryKey>>, next: Option<QueryKey>) {
        let mut current = observed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if *current == next {
            return;
        }

        let released = current.take();
        let now = now_ms();
        self.with_cache(|c| {
            if let Some(old) = &released {
                c.unsubscribe(old, now);
            }
            if let Some(new) = &next {
                c.subscribe(new);
            }
        });
        *current = next;

        if released.is_some() {
            self.schedule_gc();
        }
    }

    fn schedule_gc(&self) {
        let client = self.clone();
        set_timeout(
            move || {
                let n = client.with_cache(|c| c.collect_garbage(now_ms()));
                if n > 0 {
                    log!("query: collected {n} unused keys");
                }
            },
            Duration::from_millis(DEFAULT_GC_TIME_MS as u64),
        );
    }

    /// Subscribes to the request under `key()`, fetching it with `fetch` when
    /// it is missing or stale. A `None` key keeps the query idle. The
    /// subscription is released when the owning view is disposed.
    pub fn use_query<T, K, F, Fut>(&self, key: K, fetch: F) -> Query<T>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
        K: Fn() -> Option<QueryKey> + 'static,
        F: Fn(QueryKey) -> Fut + 'static,
        Fut: Future<Output = ApiResult<T>> + 'static,
    {
        let (state, set_state) = signal(QueryState::<T>::Idle);
        let (settled, set_settled) = signal(0u64);
        let observed: Arc<Mutex<Option<QueryKey>>> = Arc::new(Mutex::new(None));

        on_cleanup({
            let client = self.clone();
            let observed = observed.clone();
            move || client.observe(&observed, None)
        });

        let client = self.clone();
        Effect::new(move |_| {
            client.revision.track();
            let key = key();
            client.observe(&observed, key.clone());
            let Some(key) = key else {
                set_state.set(QueryState::Idle);
                return;
            };

            let (status, generation, ticket) = client.with_cache(|c| {
                let ticket = if c.needs_fetch(&key, now_ms()) {
                    Some(c.begin_fetch(&key))
                } else {
                    None
                };
                (c.status(&key), c.settled(&key), ticket)
            });
            set_state.set(QueryState::from_status(status));
            if let Some(generation) = generation {
                if settled.get_untracked() != generation {
                    set_settled.set(generation);
                }
            }

            let Some(ticket) = ticket else {
                return;
            };
            let request = fetch(key.clone());
            let client = client.clone();
            spawn_local(async move {
                let result = request
                    .await
                    .and_then(|data| serde_json::to_value(data).map_err(ApiError::parse));
                if let Err(e) = &result {
                    warn!("query: fetching {} failed ({:?}): {e}", ticket.key, e.status());
                }
                if client.with_cache(|c| c.complete_fetch(&ticket, result, now_ms())) {
                    client.notify();
                }
            });
        });

        Query { state, settled }
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(QueryCache::default())
    }
}
