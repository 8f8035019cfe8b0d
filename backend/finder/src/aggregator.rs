//! # Filter Aggregator
//!
//! The upstream only filters by one category or one area per request, so a
//! multi-select is resolved by fanning out one request per selected value.
//!
//! ## Resolution
//!
//! 1. Nothing selected on either axis: empty result, no cache or upstream access.
//! 2. Each axis is resolved on its own against its own cache, keyed by the
//!    sorted, joined selection.
//! 3. On a miss every value of the axis is fetched concurrently, bounded by a
//!    shared semaphore. The partial lists are concatenated in issue order and
//!    cached under the axis key.
//! 4. Category results come first, area results second. Duplicates by id keep
//!    the position of the first occurrence and the record of the last one.
//!
//! One failing value fails its whole axis. Partial lists are never merged or
//! cached, otherwise the cache would serve incomplete data forever.
use std::{
    collections::{HashMap, hash_map::Entry},
    sync::Arc,
};

use meals::{FetchError, FilterKind, FilterValue, Gateway, MealRecord};
use thiserror::Error;
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, warn};

use crate::{
    cache::{AxisCaches, CachedMeals},
    selection::SelectionSet,
};

pub const DEFAULT_FANOUT_LIMIT: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedResult {
    meals: Vec<MealRecord>,
}

impl MergedResult {
    /// Concatenates `parts` and collapses duplicate ids, last record wins.
    pub fn merge<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'a [MealRecord]>,
    {
        let mut meals: Vec<MealRecord> = Vec::new();
        let mut positions: HashMap<&'a str, usize> = HashMap::new();

        for meal in parts.into_iter().flatten() {
            match positions.entry(meal.id.as_str()) {
                Entry::Occupied(entry) => meals[*entry.get()] = meal.clone(),
                Entry::Vacant(entry) => {
                    entry.insert(meals.len());
                    meals.push(meal.clone());
                }
            }
        }

        Self { meals }
    }

    pub fn meals(&self) -> &[MealRecord] {
        &self.meals
    }

    pub fn len(&self) -> usize {
        self.meals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meals.is_empty()
    }

    pub fn into_vec(self) -> Vec<MealRecord> {
        self.meals
    }
}

#[derive(Debug)]
pub struct ValueFailure {
    pub value: FilterValue,
    pub cause: FetchError,
}

#[derive(Error, Debug)]
#[error("Failed to resolve {axis} filter: {} of {requested} values failed", .failures.len())]
pub struct AggregationError {
    pub axis: FilterKind,
    pub requested: usize,
    pub failures: Vec<ValueFailure>,
}

pub struct FilterAggregator {
    gateway: Arc<dyn Gateway>,
    caches: Arc<AxisCaches>,
    permits: Arc<Semaphore>,
}

impl FilterAggregator {
    pub fn new(gateway: Arc<dyn Gateway>, caches: Arc<AxisCaches>, fanout_limit: usize) -> Self {
        Self {
            gateway,
            caches,
            permits: Arc::new(Semaphore::new(fanout_limit.max(1))),
        }
    }

    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    pub fn caches(&self) -> &AxisCaches {
        &self.caches
    }

    pub async fn resolve(
        &self,
        categories: &SelectionSet,
        areas: &SelectionSet,
    ) -> Result<MergedResult, AggregationError> {
        if categories.is_empty() && areas.is_empty() {
            return Ok(MergedResult::default());
        }

        let (by_category, by_area) = tokio::join!(
            self.resolve_axis(FilterKind::Category, categories),
            self.resolve_axis(FilterKind::Area, areas),
        );

        let by_category = by_category?;
        let by_area = by_area?;

        let merged = MergedResult::merge([&*by_category, &*by_area]);
        debug!(
            "Merged {} category and {} area meals into {}",
            by_category.len(),
            by_area.len(),
            merged.len()
        );

        Ok(merged)
    }

    async fn resolve_axis(
        &self,
        kind: FilterKind,
        selection: &SelectionSet,
    ) -> Result<CachedMeals, AggregationError> {
        if selection.is_empty() {
            return Ok(Arc::from(Vec::new()));
        }

        let cache = self.caches.for_axis(kind);
        let key = selection.cache_key();

        if let Some(cached) = cache.get(&key) {
            debug!("{kind} cache hit for {key:?}");
            return Ok(cached);
        }

        debug!("{kind} cache miss for {key:?}, fetching {} values", selection.len());

        let values: Vec<FilterValue> = selection.iter().cloned().collect();
        let mut tasks = JoinSet::new();

        for (index, value) in values.iter().cloned().enumerate() {
            let gateway = self.gateway.clone();
            let permits = self.permits.clone();

            tasks.spawn(async move {
                let outcome = match permits.acquire_owned().await {
                    Ok(_permit) => gateway.fetch_by_value(kind, &value).await,
                    Err(_) => Err(FetchError::Cancelled),
                };

                (index, outcome)
            });
        }

        let mut slots: Vec<Option<Result<Vec<MealRecord>, FetchError>>> =
            values.iter().map(|_| None).collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => warn!("{kind} filter task ended early: {e}"),
            }
        }

        let requested = values.len();
        let mut meals = Vec::new();
        let mut failures = Vec::new();

        for (value, slot) in values.into_iter().zip(slots) {
            match slot.unwrap_or(Err(FetchError::Cancelled)) {
                Ok(partial) => meals.extend(partial),
                Err(cause) => {
                    warn!("{kind} {value} failed: {cause}");
                    failures.push(ValueFailure { value, cause });
                }
            }
        }

        if !failures.is_empty() {
            return Err(AggregationError {
                axis: kind,
                requested,
                failures,
            });
        }

        let meals: CachedMeals = meals.into();
        cache.put(key, meals.clone());

        Ok(meals)
    }
}
