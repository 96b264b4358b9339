//! Filter-keyed memo of successful listings.
//!
//! Entries live until a mutation invalidates them or LRU pressure evicts them.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use metrics::counter;
use postdeck_api_types::Post;
use tracing::debug;

use crate::domain::posts::PostFilter;

use super::lock::mutex_lock;

pub const METRIC_QUERY_CACHE_HIT: &str = "postdeck_query_cache_hit_total";
pub const METRIC_QUERY_CACHE_MISS: &str = "postdeck_query_cache_miss_total";
pub const METRIC_QUERY_CACHE_EVICT: &str = "postdeck_query_cache_evict_total";
pub const METRIC_QUERY_CACHE_INVALIDATE: &str = "postdeck_query_cache_invalidate_total";

const SOURCE: &str = "application::query_cache";

pub struct QueryCache {
    entries: Mutex<LruCache<PostFilter, Vec<Post>>>,
}

impl QueryCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, filter: &PostFilter) -> Option<Vec<Post>> {
        let mut entries = mutex_lock(&self.entries, SOURCE, "get");
        match entries.get(filter) {
            Some(posts) => {
                counter!(METRIC_QUERY_CACHE_HIT).increment(1);
                Some(posts.clone())
            }
            None => {
                counter!(METRIC_QUERY_CACHE_MISS).increment(1);
                None
            }
        }
    }

    pub fn put(&self, filter: PostFilter, posts: Vec<Post>) {
        let mut entries = mutex_lock(&self.entries, SOURCE, "put");
        if let Some((evicted, _)) = entries.push(filter, posts)
            && evicted != filter
        {
            debug!(filter = %evicted, "evicted cached listing");
            counter!(METRIC_QUERY_CACHE_EVICT).increment(1);
        }
    }

    /// Drop every cached listing, whatever its filter.
    pub fn invalidate_all(&self) {
        let mut entries = mutex_lock(&self.entries, SOURCE, "invalidate_all");
        let dropped = entries.len();
        entries.clear();
        if dropped > 0 {
            counter!(METRIC_QUERY_CACHE_INVALIDATE).increment(dropped as u64);
        }
    }
}

#[cfg(test)]
mod tests {
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};
    use postdeck_api_types::PostId;

    use super::*;

    fn post(id: u64, title: &str) -> Post {
        Post {
            id: PostId::from(id),
            title: title.to_string(),
            body: String::new(),
            user_id: None,
        }
    }

    fn capacity(value: usize) -> NonZeroUsize {
        NonZeroUsize::new(value).expect("non-zero capacity")
    }

    #[test]
    fn get_returns_what_was_put_per_filter() {
        let cache = QueryCache::new(capacity(4));
        cache.put(PostFilter::ALL, vec![post(1, "a")]);
        cache.put(PostFilter::user(2), vec![post(2, "b")]);

        assert_eq!(cache.get(&PostFilter::ALL), Some(vec![post(1, "a")]));
        assert_eq!(cache.get(&PostFilter::user(2)), Some(vec![post(2, "b")]));
        assert_eq!(cache.get(&PostFilter::user(3)), None);
    }

    #[test]
    fn invalidate_all_clears_every_filter() {
        let cache = QueryCache::new(capacity(4));
        cache.put(PostFilter::ALL, vec![post(1, "a")]);
        cache.put(PostFilter::user(1), vec![]);
        cache.invalidate_all();

        assert_eq!(cache.get(&PostFilter::ALL), None);
        assert_eq!(cache.get(&PostFilter::user(1)), None);
    }

    #[test]
    fn counters_track_hits_misses_and_evictions() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            let cache = QueryCache::new(capacity(1));
            cache.put(PostFilter::ALL, vec![post(1, "a")]);
            let _ = cache.get(&PostFilter::ALL);
            let _ = cache.get(&PostFilter::user(5));
            cache.put(PostFilter::user(5), vec![]);
            cache.invalidate_all();
        });

        let counters: Vec<(String, u64)> = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .filter_map(|(key, _, _, value)| match value {
                DebugValue::Counter(count) => Some((key.key().name().to_string(), count)),
                _ => None,
            })
            .collect();

        let count_of = |name: &str| {
            counters
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, count)| *count)
        };
        assert_eq!(count_of(METRIC_QUERY_CACHE_HIT), Some(1));
        assert_eq!(count_of(METRIC_QUERY_CACHE_MISS), Some(1));
        assert_eq!(count_of(METRIC_QUERY_CACHE_EVICT), Some(1));
        assert_eq!(count_of(METRIC_QUERY_CACHE_INVALIDATE), Some(1));
    }
}
