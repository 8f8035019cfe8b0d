//! # Meals
//!
//! Gateway to the upstream recipe database.
//!
//! Every call carries exactly **one** filter value. The upstream has no
//! multi-value filter, so anything like `Dessert,Beef` is rejected before a
//! request is made. Combining values is the job of the `finder` crate.
//!
//! ## Upstream
//!
//! - `filter.php?c=<category>` / `filter.php?a=<area>`
//! - `search.php?s=<query>`
//! - `categories.php`
//! - `list.php?a=list`
//!
//! A `null` or missing `meals` field means "no meals", not an error.
//!
//! ## Errors
//!
//! Nothing here panics on a bad response. Transport failures, non-2xx statuses
//! and undecodable bodies all come back as a [`FetchError`].
use async_trait::async_trait;

pub mod client;
pub mod error;
pub mod models;

pub use client::{ClientConfig, MealsClient};
pub use error::FetchError;
pub use models::{Area, Category, FilterKind, FilterValue, MealRecord, MealsEnvelope};

/// Single-value upstream lookups. No caching happens at this layer.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn fetch_by_value(
        &self,
        kind: FilterKind,
        value: &FilterValue,
    ) -> Result<Vec<MealRecord>, FetchError>;

    async fn search(&self, query: &str) -> Result<Vec<MealRecord>, FetchError>;
}
