//! # Session
//!
//! Caller side of a resolution: the selection being edited, the meals on
//! display, and the last user-visible error.
//!
//! Every change advances a generation counter. An outcome is only applied if
//! its ticket still matches the current generation, so a slow response for an
//! old selection can never overwrite the results of a newer one.
//!
//! A failed resolution keeps the meals already on display and records the
//! error. Clearing every filter always succeeds with an empty list.
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use meals::MealRecord;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    aggregator::{FilterAggregator, MergedResult},
    selection::{FilterAction, FilterState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct Generation(AtomicU64);

impl Generation {
    pub fn advance(&self) -> Ticket {
        Ticket(self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn current(&self) -> Ticket {
        Ticket(self.0.load(Ordering::SeqCst))
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.current() == ticket
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Failed,
    Stale,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    pub filters: FilterState,
    pub meals: Vec<MealRecord>,
    pub error: Option<String>,
}

pub struct Session {
    aggregator: Arc<FilterAggregator>,
    generation: Generation,
    view: Mutex<View>,
}

impl Session {
    pub fn new(aggregator: Arc<FilterAggregator>) -> Self {
        Self {
            aggregator,
            generation: Generation::default(),
            view: Mutex::new(View::default()),
        }
    }

    pub async fn view(&self) -> View {
        self.view.lock().await.clone()
    }

    pub async fn dispatch(&self, action: FilterAction) -> Outcome {
        let (ticket, filters) = {
            let mut view = self.view.lock().await;
            view.filters.apply(action);

            (self.generation.advance(), view.filters.clone())
        };

        self.resolve(ticket, filters).await
    }

    /// Applies several actions as one change, resolving only the final selection.
    pub async fn dispatch_all<I>(&self, actions: I) -> Outcome
    where
        I: IntoIterator<Item = FilterAction>,
    {
        let (ticket, filters) = {
            let mut view = self.view.lock().await;
            for action in actions {
                view.filters.apply(action);
            }

            (self.generation.advance(), view.filters.clone())
        };

        self.resolve(ticket, filters).await
    }

    /// Re-resolves the current selection.
    pub async fn refresh(&self) -> Outcome {
        let (ticket, filters) = {
            let view = self.view.lock().await;

            (self.generation.advance(), view.filters.clone())
        };

        self.resolve(ticket, filters).await
    }

    /// Free-text search. Goes straight to the gateway, no merge and no cache.
    pub async fn search(&self, query: &str) -> Outcome {
        let ticket = self.generation.advance();

        let result = self
            .aggregator
            .gateway()
            .search(query)
            .await
            .map_err(|e| e.to_string());

        self.commit(ticket, result).await
    }

    async fn resolve(&self, ticket: Ticket, filters: FilterState) -> Outcome {
        if filters.is_empty() {
            return self.commit(ticket, Ok(Vec::new())).await;
        }

        let result = self
            .aggregator
            .resolve(&filters.categories, &filters.areas)
            .await
            .map(MergedResult::into_vec)
            .map_err(|e| e.to_string());

        self.commit(ticket, result).await
    }

    async fn commit(&self, ticket: Ticket, result: Result<Vec<MealRecord>, String>) -> Outcome {
        let mut view = self.view.lock().await;

        if !self.generation.is_current(ticket) {
            debug!("Discarding stale outcome {ticket:?}");
            return Outcome::Stale;
        }

        match result {
            Ok(meals) => {
                view.meals = meals;
                view.error = None;
                Outcome::Applied
            }
            Err(message) => {
                warn!("Keeping previous meals: {message}");
                view.error = Some(message);
                Outcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use meals::FilterKind;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        aggregator::DEFAULT_FANOUT_LIMIT,
        cache::AxisCaches,
        testing::{FakeGateway, meal, value},
    };

    fn session(gateway: Arc<FakeGateway>) -> Arc<Session> {
        let aggregator = FilterAggregator::new(gateway, AxisCaches::new(), DEFAULT_FANOUT_LIMIT);

        Arc::new(Session::new(Arc::new(aggregator)))
    }

    fn names(view: &View) -> Vec<&str> {
        view.meals.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_generation_tickets() {
        let generation = Generation::default();

        let first = generation.advance();
        assert!(generation.is_current(first));

        let second = generation.advance();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
    }

    #[tokio::test]
    async fn test_dispatch_resolves_selection() {
        let gateway = Arc::new(
            FakeGateway::default()
                .with(FilterKind::Category, "Dessert", vec![meal("1", "Pie")])
                .with(FilterKind::Area, "American", vec![meal("2", "Burger")]),
        );
        let session = session(gateway.clone());

        assert_eq!(
            session.dispatch(FilterAction::ToggleCategory(value("Dessert"))).await,
            Outcome::Applied
        );
        assert_eq!(
            session.dispatch(FilterAction::ToggleArea(value("American"))).await,
            Outcome::Applied
        );

        let view = session.view().await;
        assert_eq!(names(&view), vec!["Pie", "Burger"]);
        assert_eq!(view.error, None);
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_all_resolves_once() {
        let gateway = Arc::new(
            FakeGateway::default()
                .with(FilterKind::Category, "Beef", vec![meal("1", "Stew")])
                .with(FilterKind::Category, "Lamb", vec![meal("2", "Tagine")]),
        );
        let session = session(gateway.clone());

        let outcome = session
            .dispatch_all([
                FilterAction::ToggleCategory(value("Lamb")),
                FilterAction::ToggleCategory(value("Beef")),
            ])
            .await;

        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(names(&session.view().await), vec!["Stew", "Tagine"]);
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn test_refresh_reuses_cached_selection() {
        let gateway = Arc::new(
            FakeGateway::default().with(FilterKind::Area, "Thai", vec![meal("1", "Pad Thai")]),
        );
        let session = session(gateway.clone());

        session.dispatch(FilterAction::ToggleArea(value("Thai"))).await;

        assert_eq!(session.refresh().await, Outcome::Applied);
        assert_eq!(names(&session.view().await), vec!["Pad Thai"]);
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_meals() {
        let gateway = Arc::new(
            FakeGateway::default()
                .with(FilterKind::Category, "Dessert", vec![meal("1", "Pie")])
                .failing("Broken"),
        );
        let session = session(gateway);

        session
            .dispatch(FilterAction::ToggleCategory(value("Dessert")))
            .await;
        let outcome = session
            .dispatch(FilterAction::ToggleCategory(value("Broken")))
            .await;

        assert_eq!(outcome, Outcome::Failed);
        let view = session.view().await;
        assert_eq!(names(&view), vec!["Pie"]);
        assert!(view.error.unwrap().contains("category"));
    }

    #[tokio::test]
    async fn test_clear_all_always_empties() {
        let gateway = Arc::new(
            FakeGateway::default()
                .with(FilterKind::Area, "Italian", vec![meal("1", "Pasta")])
                .failing("Broken"),
        );
        let session = session(gateway.clone());

        session.dispatch(FilterAction::ToggleArea(value("Italian"))).await;
        session.dispatch(FilterAction::ToggleArea(value("Broken"))).await;
        let calls = gateway.calls();

        assert_eq!(session.dispatch(FilterAction::ClearAll).await, Outcome::Applied);

        let view = session.view().await;
        assert!(view.meals.is_empty());
        assert!(view.filters.is_empty());
        assert_eq!(view.error, None);
        assert_eq!(gateway.calls(), calls);
    }

    #[tokio::test]
    async fn test_stale_search_is_discarded() {
        let gateway = Arc::new(FakeGateway::default());
        let session = session(gateway);

        let slow = tokio::spawn({
            let session = session.clone();
            async move { session.search("slow soup").await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(session.search("fast salad").await, Outcome::Applied);
        assert_eq!(slow.await.unwrap(), Outcome::Stale);

        let view = session.view().await;
        assert_eq!(names(&view), vec!["fast salad"]);
    }

    #[tokio::test]
    async fn test_stale_filter_cannot_overwrite_clear() {
        let gateway = Arc::new(
            FakeGateway::default()
                .with(FilterKind::Category, "Seafood", vec![meal("1", "Paella")])
                .delayed("Seafood", Duration::from_millis(100)),
        );
        let session = session(gateway);

        let pending = tokio::spawn({
            let session = session.clone();
            async move {
                session
                    .dispatch(FilterAction::ToggleCategory(value("Seafood")))
                    .await
            }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(session.dispatch(FilterAction::ClearAll).await, Outcome::Applied);
        assert_eq!(pending.await.unwrap(), Outcome::Stale);
        assert!(session.view().await.meals.is_empty());
    }

    #[tokio::test]
    async fn test_search_failure_records_error() {
        let session = session(Arc::new(FakeGateway::default()));

        session.search("soup").await;
        assert_eq!(session.search("broken").await, Outcome::Failed);

        let view = session.view().await;
        assert_eq!(names(&view), vec!["soup"]);
        assert!(view.error.is_some());
    }
}
