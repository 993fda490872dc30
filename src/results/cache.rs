//! Page cache and in-flight fetch registry.
//!
//! Both maps are keyed by the requested page offset (rows from the start of
//! the session), not by the absolute offset sent to the service. The base
//! offset is fixed for a session, so the two are interchangeable within one.

use std::collections::HashMap;

use crate::client::ResultRow;

struct Inflight<F> {
    id: u64,
    fetch: F,
}

/// Fetched pages plus the handles of fetches still outstanding.
///
/// `F` is the handle waiters clone to share one fetch. The session stores a
/// weak handle, so an entry can outlive the fetch it names.
pub struct PageCache<F> {
    pages: HashMap<u64, Vec<ResultRow>>,
    inflight: HashMap<u64, Inflight<F>>,
}

impl<F> Default for PageCache<F> {
    fn default() -> Self {
        Self {
            pages: HashMap::new(),
            inflight: HashMap::new(),
        }
    }
}

impl<F: Clone> PageCache<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows cached for `page_offset`.
    pub fn get(&self, page_offset: u64) -> Option<&[ResultRow]> {
        self.pages.get(&page_offset).map(Vec::as_slice)
    }

    /// Handle of the outstanding fetch for `page_offset`.
    pub fn get_inflight(&self, page_offset: u64) -> Option<F> {
        self.inflight.get(&page_offset).map(|entry| entry.fetch.clone())
    }

    /// Register a fetch for `page_offset` under `id`.
    ///
    /// Replaces any entry left for the offset; callers only start a fetch
    /// after [`get_inflight`](Self::get_inflight) gave them nothing live.
    pub fn start(&mut self, page_offset: u64, id: u64, fetch: F) {
        self.inflight.insert(page_offset, Inflight { id, fetch });
    }

    /// Store the rows of a successful fetch and retire its in-flight entry.
    pub fn complete(&mut self, page_offset: u64, id: u64, rows: Vec<ResultRow>) {
        self.pages.insert(page_offset, rows);
        self.finish(page_offset, id);
    }

    /// Retire the in-flight entry for fetch `id`, leaving the cache untouched.
    ///
    /// A later fetch registered for the same offset under another id is kept.
    pub fn finish(&mut self, page_offset: u64, id: u64) {
        if self
            .inflight
            .get(&page_offset)
            .is_some_and(|entry| entry.id == id)
        {
            self.inflight.remove(&page_offset);
        }
    }

    pub fn clear(&mut self) {
        self.pages.clear();
        self.inflight.clear();
    }

    /// Number of cached pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Number of fetches still outstanding.
    pub fn inflight_len(&self) -> usize {
        self.inflight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn row(id: u64) -> ResultRow {
        let mut row = Map::new();
        row.insert("id".to_string(), Value::from(id));
        row
    }

    #[test]
    fn test_empty_cache() {
        let cache: PageCache<u32> = PageCache::new();
        assert!(cache.get(0).is_none());
        assert!(cache.get_inflight(0).is_none());
        assert!(cache.is_empty());
        assert_eq!(cache.inflight_len(), 0);
    }

    #[test]
    fn test_start_then_complete() {
        let mut cache = PageCache::new();
        cache.start(100, 1, "fetch-a");
        assert_eq!(cache.get_inflight(100), Some("fetch-a"));
        assert!(cache.get(100).is_none());

        cache.complete(100, 1, vec![row(100), row(101)]);
        assert!(cache.get_inflight(100).is_none());
        let rows = cache.get(100).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], json!(100));
    }

    #[test]
    fn test_failed_fetch_leaves_no_entry() {
        let mut cache = PageCache::new();
        cache.start(0, 1, ());
        cache.finish(0, 1);
        assert!(cache.get(0).is_none());
        assert!(cache.get_inflight(0).is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_finish_ignores_newer_fetch() {
        let mut cache = PageCache::new();
        cache.start(0, 1, "old");
        cache.finish(0, 1);
        cache.start(0, 2, "new");

        // A late cleanup from the first fetch must not retire the second.
        cache.finish(0, 1);
        assert_eq!(cache.get_inflight(0), Some("new"));

        cache.complete(0, 1, vec![row(0)]);
        assert_eq!(cache.get_inflight(0), Some("new"));
        assert!(cache.get(0).is_some());
    }

    #[test]
    fn test_start_replaces_dead_entry() {
        let mut cache = PageCache::new();
        cache.start(0, 1, "gone");
        cache.start(0, 2, "live");
        assert_eq!(cache.inflight_len(), 1);

        // Cleanup of the replaced fetch arrives late.
        cache.finish(0, 1);
        assert_eq!(cache.get_inflight(0), Some("live"));
        cache.finish(0, 2);
        assert!(cache.get_inflight(0).is_none());
    }

    #[test]
    fn test_offsets_are_independent() {
        let mut cache = PageCache::new();
        cache.start(0, 1, 'a');
        cache.start(100, 2, 'b');
        assert_eq!(cache.inflight_len(), 2);

        cache.complete(100, 2, vec![row(100)]);
        assert_eq!(cache.get_inflight(0), Some('a'));
        assert!(cache.get(0).is_none());
        assert!(cache.get(100).is_some());
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut cache = PageCache::new();
        cache.start(0, 1, 1u8);
        cache.complete(100, 2, vec![row(1)]);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.inflight_len(), 0);
    }
}
