use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use meals::{FetchError, FilterKind, FilterValue, Gateway, MealRecord};

pub fn meal(id: &str, name: &str) -> MealRecord {
    MealRecord {
        id: id.to_string(),
        name: name.to_string(),
        thumbnail: None,
        category: None,
        area: None,
    }
}

pub fn value(s: &str) -> FilterValue {
    FilterValue::new(s).unwrap()
}

/// In-memory upstream. Names listed in `failing` answer with a 500, names
/// in `delays` sleep before answering. Search queries containing "slow"
/// sleep, queries containing "broken" fail.
#[derive(Default)]
pub struct FakeGateway {
    meals: HashMap<(FilterKind, String), Vec<MealRecord>>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
}

impl FakeGateway {
    pub fn with(mut self, kind: FilterKind, name: &str, meals: Vec<MealRecord>) -> Self {
        self.meals.insert((kind, name.to_string()), meals);
        self
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn delayed(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.to_string(), delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn fetch_by_value(
        &self,
        kind: FilterKind,
        value: &FilterValue,
    ) -> Result<Vec<MealRecord>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(value.as_str()) {
            tokio::time::sleep(*delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(value.as_str()) {
            return Err(FetchError::Status { status: 500 });
        }

        Ok(self
            .meals
            .get(&(kind, value.as_str().to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn search(&self, query: &str) -> Result<Vec<MealRecord>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if query.contains("slow") {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        if query.contains("broken") {
            return Err(FetchError::Status { status: 503 });
        }

        Ok(vec![meal(query, query)])
    }
}
