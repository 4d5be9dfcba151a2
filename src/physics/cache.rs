use super::state::SimulationState;
use crate::config::DEFAULT_CACHE_CAPACITY;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Simulation states keyed by effect instance, bounded by least-recently-used eviction.
///
/// Not synchronized: callers rendering in parallel keep one cache per worker.
pub struct StateCache {
    entries: LruCache<String, SimulationState>,
}

impl Default for StateCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl StateCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(cap),
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    /// Looks up `key` without touching its recency.
    pub fn peek(&self, key: &str) -> Option<&SimulationState> {
        self.entries.peek(key)
    }

    pub fn get_or_create(&mut self, key: &str, h: usize, w: usize) -> &mut SimulationState {
        if !self.entries.contains(key) && self.entries.len() >= self.capacity() {
            if let Some((evicted, state)) = self.entries.pop_lru() {
                log::debug!(
                    "evicting simulation state '{evicted}' ({} bytes)",
                    state.field_bytes()
                );
            }
        }

        let state = self.entries.get_or_insert_mut(key.to_string(), || {
            log::debug!("creating simulation state '{key}' at {w}x{h}");
            SimulationState::new(w, h)
        });
        if !state.matches(w, h) {
            log::debug!(
                "resetting simulation state '{key}': {}x{} -> {w}x{h}",
                state.width(),
                state.height()
            );
            *state = SimulationState::new(w, h);
        }
        state
    }

    pub fn remove(&mut self, key: &str) {
        if self.entries.pop(key).is_some() {
            log::debug!("removed simulation state '{key}'");
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Keys ordered from most to least recently used.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn field_bytes(&self) -> usize {
        self.entries.iter().map(|(_, s)| s.field_bytes()).sum()
    }
}
