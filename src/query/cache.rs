use crate::api::ApiError;
use std::collections::BTreeMap;
use std::fmt;

/// How long fetched data stays fresh before a read triggers a refetch.
pub(crate) const DEFAULT_STALE_TIME_MS: i64 = 3 * 60 * 1000;

/// How long an entry nobody observes is kept before being dropped.
pub(crate) const DEFAULT_GC_TIME_MS: i64 = 5 * 60 * 1000;

/// Top-level family of cached requests. Invalidation and reset always act on a
/// whole partition.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum Partition {
    DocList,
    Doc,
    UserList,
    DocAccessList,
    PadList,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct QueryKey {
    pub partition: Partition,
    pub params: Vec<String>,
}

impl QueryKey {
    pub fn new(partition: Partition) -> Self {
        Self {
            partition,
            params: Vec::new(),
        }
    }

    pub fn with(mut self, param: impl ToString) -> Self {
        self.params.push(param.to_string());
        self
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.partition)?;
        for p in &self.params {
            write!(f, "/{p}")?;
        }
        Ok(())
    }
}

/// What a reader sees for a key right now.
#[derive(Clone, Debug)]
pub(crate) enum CacheStatus {
    Loading,
    Success(serde_json::Value),
    Error(ApiError),
}

#[derive(Clone, Debug, Default)]
struct Entry {
    data: Option<serde_json::Value>,
    error: Option<ApiError>,
    updated_ms: i64,
    stale: bool,
    fetching: bool,
    generation: u64,
    /// Generation of the last fetch stored for this key, 0 before the first.
    settled: u64,
    observers: usize,
    released_ms: i64,
}

/// Handed out when a fetch starts; the result is only stored if the key was
/// not invalidated or reset in the meantime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FetchTicket {
    pub key: QueryKey,
    generation: u64,
}

/// Session-wide request cache. Entries change through fetch completion,
/// partition-wide `invalidate`/`reset` and garbage collection of keys that no
/// view observes anymore.
#[derive(Debug)]
pub(crate) struct QueryCache {
    entries: BTreeMap<QueryKey, Entry>,
    stale_time_ms: i64,
    gc_time_ms: i64,
    next_generation: u64,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_TIME_MS)
    }
}

impl QueryCache {
    pub fn new(stale_time_ms: i64) -> Self {
        Self {
            entries: BTreeMap::new(),
            stale_time_ms,
            gc_time_ms: DEFAULT_GC_TIME_MS,
            next_generation: 1,
        }
    }

    pub fn with_gc_time(mut self, gc_time_ms: i64) -> Self {
        self.gc_time_ms = gc_time_ms;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn bump(&mut self) -> u64 {
        let g = self.next_generation;
        self.next_generation += 1;
        g
    }

    pub fn status(&self, key: &QueryKey) -> CacheStatus {
        match self.entries.get(key) {
            Some(Entry {
                data: Some(data), ..
            }) => CacheStatus::Success(data.clone()),
            Some(Entry {
                error: Some(err), ..
            }) => CacheStatus::Error(err.clone()),
            _ => CacheStatus::Loading,
        }
    }

    /// Generation of the last stored result, once no fetch is in flight.
    /// Changes on every completed fetch, even when the data is identical.
    pub fn settled(&self, key: &QueryKey) -> Option<u64> {
        self.entries
            .get(key)
            .filter(|e| !e.fetching && e.settled != 0)
            .map(|e| e.settled)
    }

    pub fn subscribe(&mut self, key: &QueryKey) {
        self.entries.entry(key.clone()).or_default().observers += 1;
    }

    pub fn unsubscribe(&mut self, key: &QueryKey, now_ms: i64) {
        if let Some(e) = self.entries.get_mut(key) {
            e.observers = e.observers.saturating_sub(1);
            if e.observers == 0 {
                e.released_ms = now_ms;
            }
        }
    }

    /// Drops entries that have had no observer for the gc time.
    pub fn collect_garbage(&mut self, now_ms: i64) -> usize {
        let before = self.entries.len();
        let gc_time_ms = self.gc_time_ms;
        self.entries
            .retain(|_, e| e.observers > 0 || now_ms - e.released_ms < gc_time_ms);
        before - self.entries.len()
    }

    /// Missing, invalidated or expired entries need a fetch, unless one is
    /// already in flight. A failed fetch is not retried until invalidated.
    pub fn needs_fetch(&self, key: &QueryKey, now_ms: i64) -> bool {
        let Some(e) = self.entries.get(key) else {
            return true;
        };
        if e.fetching {
            return false;
        }
        if e.stale {
            return true;
        }
        match (&e.data, &e.error) {
            (Some(_), _) => now_ms - e.updated_ms >= self.stale_time_ms,
            (None, Some(_)) => false,
            (None, None) => true,
        }
    }

    pub fn begin_fetch(&mut self, key: &QueryKey) -> FetchTicket {
        let generation = self.bump();
        let e = self.entries.entry(key.clone()).or_default();
        e.fetching = true;
        e.generation = generation;
        FetchTicket {
            key: key.clone(),
            generation,
        }
    }

    /// Stores a fetch result. Returns `false` when the ticket was superseded.
    pub fn complete_fetch(
        &mut self,
        ticket: &FetchTicket,
        result: Result<serde_json::Value, ApiError>,
        now_ms: i64,
    ) -> bool {
        let Some(e) = self.entries.get_mut(&ticket.key) else {
            return false;
        };
        if e.generation != ticket.generation {
            return false;
        }

        e.fetching = false;
        e.stale = false;
        e.updated_ms = now_ms;
        e.settled = ticket.generation;
        match result {
            Ok(data) => {
                e.data = Some(data);
                e.error = None;
            }
            // Stale data stays on screen when a refetch fails.
            Err(err) => e.error = Some(err),
        }
        true
    }

    /// Marks every key of `partition` stale while keeping its data on screen.
    /// In-flight fetches for those keys are superseded.
    pub fn invalidate(&mut self, partition: Partition) -> usize {
        let keys = self.keys_in(partition);
        for key in &keys {
            let generation = self.bump();
            if let Some(e) = self.entries.get_mut(key) {
                e.stale = true;
                e.fetching = false;
                e.generation = generation;
            }
        }
        keys.len()
    }

    /// Drops everything cached for `partition`; readers fall back to loading.
    /// Unobserved keys are removed outright.
    pub fn reset(&mut self, partition: Partition) -> usize {
        let keys = self.keys_in(partition);
        for key in &keys {
            let generation = self.bump();
            let Some(e) = self.entries.get_mut(key) else {
                continue;
            };
            if e.observers == 0 {
                self.entries.remove(key);
            } else {
                *e = Entry {
                    generation,
                    observers: e.observers,
                    ..Entry::default()
                };
            }
        }
        keys.len()
    }

    fn keys_in(&self, partition: Partition) -> Vec<QueryKey> {
        self.entries
            .keys()
            .filter(|k| k.partition == partition)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiErrorKind;
    use serde_json::json;

    fn pads_key(page: u32) -> QueryKey {
        QueryKey::new(Partition::PadList).with(page)
    }

    fn server_error() -> ApiError {
        ApiError {
            kind: ApiErrorKind::Http,
            message: "Failed to get the pads.".to_string(),
            causes: None,
        }
    }

    fn fetched(cache: &mut QueryCache, key: &QueryKey, data: serde_json::Value, now: i64) {
        let t = cache.begin_fetch(key);
        assert!(cache.complete_fetch(&t, Ok(data), now));
    }

    #[test]
    fn test_key_display() {
        let key = QueryKey::new(Partition::DocAccessList).with("d1").with(2);
        assert_eq!(key.to_string(), "doc_access_list/d1/2");
    }

    #[test]
    fn test_unknown_key_is_loading_and_needs_fetch() {
        let cache = QueryCache::default();
        assert!(matches!(cache.status(&pads_key(1)), CacheStatus::Loading));
        assert!(cache.needs_fetch(&pads_key(1), 0));
    }

    #[test]
    fn test_in_flight_key_is_not_fetched_twice() {
        let mut cache = QueryCache::default();
        let key = pads_key(1);
        cache.begin_fetch(&key);
        assert!(!cache.needs_fetch(&key, 0));
        assert!(matches!(cache.status(&key), CacheStatus::Loading));
    }

    #[test]
    fn test_fresh_data_is_served_until_stale_time() {
        let mut cache = QueryCache::new(1_000);
        let key = pads_key(1);
        fetched(&mut cache, &key, json!({"count": 0}), 10);

        assert!(matches!(cache.status(&key), CacheStatus::Success(v) if v["count"] == 0));
        assert!(!cache.needs_fetch(&key, 500));
        assert!(cache.needs_fetch(&key, 1_010));
    }

    #[test]
    fn test_error_is_kept_and_not_retried() {
        let mut cache = QueryCache::default();
        let key = pads_key(1);
        let t = cache.begin_fetch(&key);
        assert!(cache.complete_fetch(&t, Err(server_error()), 0));

        assert!(matches!(cache.status(&key), CacheStatus::Error(e) if e.message.contains("pads")));
        assert!(!cache.needs_fetch(&key, i64::MAX / 2));
    }

    #[test]
    fn test_failed_refetch_keeps_stale_data() {
        let mut cache = QueryCache::default();
        let key = pads_key(1);
        fetched(&mut cache, &key, json!("v1"), 0);
        cache.invalidate(Partition::PadList);

        let t = cache.begin_fetch(&key);
        assert!(cache.complete_fetch(&t, Err(server_error()), 10));
        assert!(matches!(cache.status(&key), CacheStatus::Success(v) if v == "v1"));
        assert!(!cache.needs_fetch(&key, 11));
    }

    #[test]
    fn test_settled_changes_on_every_completed_fetch() {
        let mut cache = QueryCache::default();
        let key = QueryKey::new(Partition::Doc).with("d1");
        assert_eq!(cache.settled(&key), None);

        fetched(&mut cache, &key, json!({"link_reach": "restricted"}), 0);
        let first = cache.settled(&key).unwrap();

        cache.invalidate(Partition::Doc);
        let t = cache.begin_fetch(&key);
        assert_eq!(cache.settled(&key), None);
        cache.complete_fetch(&t, Ok(json!({"link_reach": "restricted"})), 1);
        let second = cache.settled(&key).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_reset_removes_unobserved_keys() {
        let mut cache = QueryCache::default();
        let typed = "nicole.fool@work.com";
        for end in 1..=typed.len() {
            let key = QueryKey::new(Partition::UserList).with("d1").with(&typed[..end]);
            fetched(&mut cache, &key, json!({"count": 0}), 0);
        }
        let watched = QueryKey::new(Partition::UserList).with("d1").with(typed);
        cache.subscribe(&watched);
        assert_eq!(cache.len(), typed.len());

        cache.reset(Partition::UserList);
        assert_eq!(cache.len(), 1);
        assert!(matches!(cache.status(&watched), CacheStatus::Loading));
        assert!(cache.needs_fetch(&watched, 1));
    }

    #[test]
    fn test_unobserved_keys_are_collected_after_gc_time() {
        let mut cache = QueryCache::default().with_gc_time(1_000);
        let a = pads_key(1);
        let b = pads_key(2);
        cache.subscribe(&a);
        cache.subscribe(&b);
        fetched(&mut cache, &a, json!("a"), 0);
        fetched(&mut cache, &b, json!("b"), 0);

        cache.unsubscribe(&a, 100);
        assert_eq!(cache.collect_garbage(500), 0);
        assert_eq!(cache.collect_garbage(1_100), 1);
        assert!(matches!(cache.status(&a), CacheStatus::Loading));
        assert!(matches!(cache.status(&b), CacheStatus::Success(_)));
    }

    #[test]
    fn test_resubscribed_key_survives_collection() {
        let mut cache = QueryCache::default().with_gc_time(1_000);
        let key = pads_key(1);
        cache.subscribe(&key);
        fetched(&mut cache, &key, json!("a"), 0);
        cache.unsubscribe(&key, 0);
        cache.subscribe(&key);
        assert_eq!(cache.collect_garbage(5_000), 0);
    }

    #[test]
    fn test_invalidate_keeps_data_and_marks_stale() {
        let mut cache = QueryCache::default();
        let key = pads_key(1);
        fetched(&mut cache, &key, json!([1]), 0);

        assert_eq!(cache.invalidate(Partition::PadList), 1);
        assert!(matches!(cache.status(&key), CacheStatus::Success(_)));
        assert!(cache.needs_fetch(&key, 1));
    }

    #[test]
    fn test_reset_drops_data_back_to_loading() {
        let mut cache = QueryCache::default();
        let key = pads_key(1);
        fetched(&mut cache, &key, json!([1]), 0);

        assert_eq!(cache.reset(Partition::PadList), 1);
        assert!(matches!(cache.status(&key), CacheStatus::Loading));
        assert!(cache.needs_fetch(&key, 1));
    }

    #[test]
    fn test_response_started_before_reset_is_discarded() {
        let mut cache = QueryCache::default();
        let key = pads_key(1);
        let old = cache.begin_fetch(&key);
        cache.reset(Partition::PadList);

        assert!(!cache.complete_fetch(&old, Ok(json!("old")), 5));
        assert!(matches!(cache.status(&key), CacheStatus::Loading));

        let new = cache.begin_fetch(&key);
        assert!(cache.complete_fetch(&new, Ok(json!("new")), 6));
        assert!(matches!(cache.status(&key), CacheStatus::Success(v) if v == "new"));
    }

    #[test]
    fn test_response_started_before_invalidate_is_discarded() {
        let mut cache = QueryCache::default();
        let key = pads_key(1);
        fetched(&mut cache, &key, json!("v1"), 0);
        let in_flight = cache.begin_fetch(&key);
        cache.invalidate(Partition::PadList);

        assert!(!cache.complete_fetch(&in_flight, Ok(json!("v2")), 1));
        assert!(matches!(cache.status(&key), CacheStatus::Success(v) if v == "v1"));
    }

    #[test]
    fn test_partition_operations_leave_other_partitions_alone() {
        let mut cache = QueryCache::default();
        let docs = QueryKey::new(Partition::DocList).with(1);
        let doc = QueryKey::new(Partition::Doc).with("d1");
        fetched(&mut cache, &docs, json!("docs"), 0);
        fetched(&mut cache, &doc, json!("doc"), 0);

        cache.reset(Partition::DocList);
        assert!(matches!(cache.status(&docs), CacheStatus::Loading));
        assert!(matches!(cache.status(&doc), CacheStatus::Success(_)));
        assert!(!cache.needs_fetch(&doc, 1));
    }
}
