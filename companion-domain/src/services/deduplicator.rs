use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use crate::value_objects::DedupKey;

/// Bounded-recency set of recently reported keys.
///
/// Entries expire after `window_ms` and the set never grows past
/// `max_entries` (oldest first out). Nothing survives a restart.
#[derive(Debug)]
pub struct Deduplicator {
    window_ms: i64,
    max_entries: usize,
    inner: Mutex<DedupWindow>,
}

#[derive(Debug, Default)]
struct DedupWindow {
    last_seen: HashMap<DedupKey, i64>,
    order: VecDeque<(DedupKey, i64)>,
}

impl Deduplicator {
    pub fn new(window_ms: i64, max_entries: usize) -> Self {
        Self {
            window_ms: window_ms.max(0),
            max_entries: max_entries.max(1),
            inner: Mutex::new(DedupWindow::default()),
        }
    }

    /// True when `key` has not been recorded within the window.
    pub fn should_report(&self, key: &DedupKey, now_ms: i64) -> bool {
        let mut window = self.lock();
        window.evict_expired(now_ms, self.window_ms);
        !window.is_fresh(key, now_ms, self.window_ms)
    }

    pub fn record(&self, key: DedupKey, now_ms: i64) {
        let mut window = self.lock();
        window.evict_expired(now_ms, self.window_ms);
        window.insert(key, now_ms, self.max_entries);
    }

    /// Check and record under one lock; exactly one concurrent caller wins.
    pub fn check_and_record(&self, key: DedupKey, now_ms: i64) -> bool {
        let mut window = self.lock();
        window.evict_expired(now_ms, self.window_ms);
        if window.is_fresh(&key, now_ms, self.window_ms) {
            return false;
        }
        window.insert(key, now_ms, self.max_entries);
        true
    }

    /// Undoes a `check_and_record` made at `recorded_at` whose report never
    /// went out. A later re-record of the same key is left alone.
    pub fn forget(&self, key: &DedupKey, recorded_at: i64) {
        let mut window = self.lock();
        if window.last_seen.get(key) == Some(&recorded_at) {
            window.last_seen.remove(key);
        }
    }

    /// Drops expired entries, returns how many keys went away.
    pub fn sweep(&self, now_ms: i64) -> usize {
        let mut window = self.lock();
        let before = window.last_seen.len();
        window.evict_expired(now_ms, self.window_ms);
        before - window.last_seen.len()
    }

    pub fn len(&self) -> usize {
        self.lock().last_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, DedupWindow> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DedupWindow {
    fn is_fresh(&self, key: &DedupKey, now_ms: i64, window_ms: i64) -> bool {
        self.last_seen
            .get(key)
            .map(|seen| now_ms - *seen < window_ms)
            .unwrap_or(false)
    }

    fn insert(&mut self, key: DedupKey, now_ms: i64, max_entries: usize) {
        self.last_seen.insert(key.clone(), now_ms);
        self.order.push_back((key, now_ms));
        while self.last_seen.len() > max_entries {
            if !self.pop_oldest() {
                break;
            }
        }
    }

    fn evict_expired(&mut self, now_ms: i64, window_ms: i64) {
        while let Some((_, seen)) = self.order.front() {
            if now_ms - *seen >= window_ms {
                self.pop_oldest();
            } else {
                break;
            }
        }
    }

    // The queue may hold stale positions for keys recorded again later;
    // only the position matching the live timestamp removes the key.
    fn pop_oldest(&mut self) -> bool {
        let Some((key, seen)) = self.order.pop_front() else {
            return false;
        };
        if self.last_seen.get(&key) == Some(&seen) {
            self.last_seen.remove(&key);
        }
        true
    }
}
