//! # Recipes CLI
//!
//! Search and multi-select filtering from the terminal.
//!
//! ```sh
//! recipes search "chicken"
//! recipes filter --category Dessert --category Beef --area Italian
//! recipes categories
//! recipes areas
//! ```
//!
//! Filters are applied as one batch of toggles on a finder session, so the
//! upstream sees one request per selected value.
use std::{sync::Arc, time::Duration};

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use finder::{AxisCaches, DEFAULT_FANOUT_LIMIT, FilterAction, FilterAggregator, Outcome, Session};
use meals::{ClientConfig, FilterValue, MealRecord, MealsClient, client::DEFAULT_BASE_URL};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Upstream API root, including the key segment.
    #[arg(long, env = "MEAL_API_BASE", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    #[arg(long, default_value_t = 5000, global = true)]
    pub timeout_ms: u64,

    /// Maximum concurrent upstream requests while filtering.
    #[arg(long, default_value_t = DEFAULT_FANOUT_LIMIT, global = true)]
    pub fanout: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Search {
        query: String,
    },

    Filter {
        #[arg(long = "category")]
        categories: Vec<String>,

        #[arg(long = "area")]
        areas: Vec<String>,
    },

    Categories,

    Areas,
}

pub async fn run(args: Args) -> Result<()> {
    let client = Arc::new(MealsClient::new(ClientConfig {
        base_url: args.base_url,
        timeout: Duration::from_millis(args.timeout_ms),
    })?);

    match args.command {
        Command::Search { query } => {
            let session = session(client, args.fanout);
            let outcome = session.search(&query).await;

            report(&session, outcome).await
        }
        Command::Filter { categories, areas } => {
            let actions = filter_actions(categories, areas)?;
            info!("Applying {} filter values", actions.len());

            let session = session(client, args.fanout);
            let outcome = session.dispatch_all(actions).await;

            report(&session, outcome).await
        }
        Command::Categories => {
            for category in client.categories().await? {
                println!("{}", category.name);
            }
            Ok(())
        }
        Command::Areas => {
            for area in client.areas().await? {
                println!("{}", area.name);
            }
            Ok(())
        }
    }
}

fn session(client: Arc<MealsClient>, fanout: usize) -> Session {
    let aggregator = FilterAggregator::new(client, AxisCaches::new(), fanout);

    Session::new(Arc::new(aggregator))
}

pub fn filter_actions(categories: Vec<String>, areas: Vec<String>) -> Result<Vec<FilterAction>> {
    let mut actions = Vec::with_capacity(categories.len() + areas.len());

    for category in categories {
        actions.push(FilterAction::ToggleCategory(FilterValue::new(category)?));
    }

    for area in areas {
        actions.push(FilterAction::ToggleArea(FilterValue::new(area)?));
    }

    Ok(actions)
}

async fn report(session: &Session, outcome: Outcome) -> Result<()> {
    let view = session.view().await;

    if outcome == Outcome::Failed {
        bail!(view.error.unwrap_or_default());
    }

    if view.meals.is_empty() {
        println!("No meals found");
    }

    for meal in &view.meals {
        println!("{}", format_meal(meal));
    }

    Ok(())
}

pub fn format_meal(meal: &MealRecord) -> String {
    let mut line = format!("{:<8}{}", meal.id, meal.name);

    let details: Vec<&str> = [meal.category.as_deref(), meal.area.as_deref()]
        .into_iter()
        .flatten()
        .collect();

    if !details.is_empty() {
        line.push_str(&format!(" ({})", details.join(", ")));
    }

    line
}
