//! # Finder
//!
//! Multi-select filtering on top of the single-value [`meals::Gateway`].
//!
//! - [`selection`]: per-axis selection sets and their canonical cache keys
//! - [`cache`]: one memo per axis
//! - [`aggregator`]: fan-out, merge and dedupe
//! - [`session`]: stale-response guard for callers editing a selection
pub mod aggregator;
pub mod cache;
pub mod selection;
pub mod session;

#[cfg(test)]
mod testing;

pub use aggregator::{AggregationError, DEFAULT_FANOUT_LIMIT, FilterAggregator, MergedResult, ValueFailure};
pub use cache::{AxisCaches, ResultCache};
pub use selection::{FilterAction, FilterState, SelectionSet};
pub use session::{Outcome, Session, View};
