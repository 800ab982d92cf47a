//! Tag-addressed cache for public listings.
//!
//! Writers call [`ListingCache::revalidate`] with the tag they touched so
//! the next read rebuilds the listing. Entries never expire on their own.
//!
//! Each tag carries a generation that every revalidation bumps. A reader
//! notes the generation before loading and only stores its result if no
//! write landed in between.

use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

pub const EVENTS_TAG: &str = "events";

#[derive(Default)]
struct Entries {
    values: HashMap<String, Value>,
    generations: HashMap<String, u64>,
}

#[derive(Default)]
pub struct ListingCache {
    entries: RwLock<Entries>,
}

impl ListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, tag: &str) -> Option<Value> {
        self.entries.read().await.values.get(tag).cloned()
    }

    /// Current generation of `tag`, to be handed back to [`put_if_current`].
    ///
    /// [`put_if_current`]: ListingCache::put_if_current
    pub async fn generation(&self, tag: &str) -> u64 {
        self.entries
            .read()
            .await
            .generations
            .get(tag)
            .copied()
            .unwrap_or(0)
    }

    /// Stores `value` unless `tag` was revalidated after `generation` was read.
    pub async fn put_if_current(&self, tag: &str, generation: u64, value: Value) -> bool {
        let mut entries = self.entries.write().await;
        let current = entries.generations.get(tag).copied().unwrap_or(0);
        if current != generation {
            tracing::debug!(tag, generation, current, "Discarding listing loaded before a write");
            return false;
        }
        entries.values.insert(tag.to_string(), value);
        true
    }

    pub async fn revalidate(&self, tag: &str) {
        let mut entries = self.entries.write().await;
        *entries.generations.entry(tag.to_string()).or_insert(0) += 1;
        if entries.values.remove(tag).is_some() {
            tracing::debug!(tag, "Cache tag revalidated");
        }
    }
}
