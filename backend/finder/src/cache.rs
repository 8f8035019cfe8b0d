//! # Result Cache
//!
//! Plain key/value memo for one filter axis. No TTL, no size bound: the key
//! space is limited by how many categories and areas the upstream knows.
//!
//! Two instances exist, one per axis. A single cache keyed by both axes
//! would grow with every combination of selections instead.
use std::sync::Arc;

use dashmap::DashMap;
use meals::{FilterKind, MealRecord};

pub type CachedMeals = Arc<[MealRecord]>;

#[derive(Debug, Default)]
pub struct ResultCache {
    entries: DashMap<String, CachedMeals>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<CachedMeals> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Last write wins for a key.
    pub fn put(&self, key: String, meals: CachedMeals) {
        self.entries.insert(key, meals);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct AxisCaches {
    pub category: ResultCache,
    pub area: ResultCache,
}

impl AxisCaches {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn for_axis(&self, kind: FilterKind) -> &ResultCache {
        match kind {
            FilterKind::Category => &self.category,
            FilterKind::Area => &self.area,
        }
    }
}
