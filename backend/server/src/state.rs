use std::sync::Arc;

use finder::{AxisCaches, FilterAggregator};
use meals::{ClientConfig, FetchError, MealsClient};

use super::config::Config;

pub struct AppState {
    pub config: Config,
    pub client: Arc<MealsClient>,
    pub aggregator: FilterAggregator,
}

impl AppState {
    pub fn new(config: Config) -> Result<Arc<Self>, FetchError> {
        let client = Arc::new(MealsClient::new(ClientConfig {
            base_url: config.meal_api_base.clone(),
            timeout: config.upstream_timeout,
        })?);

        let aggregator = FilterAggregator::new(client.clone(), AxisCaches::new(), config.fanout_limit);

        Ok(Arc::new(Self {
            config,
            client,
            aggregator,
        }))
    }
}
