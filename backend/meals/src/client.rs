use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{
    Gateway,
    error::FetchError,
    models::{Area, CategoriesEnvelope, Category, FilterKind, FilterValue, MealRecord, MealsEnvelope},
};

pub const DEFAULT_BASE_URL: &str = "https://www.themealdb.com/api/json/v1/1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const FILTER_PATH: &str = "filter.php";
const SEARCH_PATH: &str = "search.php";
const CATEGORIES_PATH: &str = "categories.php";
const LIST_PATH: &str = "list.php";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MealsClient {
    http: Client,
    base_url: String,
}

impl MealsClient {
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn categories(&self) -> Result<Vec<Category>, FetchError> {
        let envelope: CategoriesEnvelope = self.get_json(CATEGORIES_PATH, &[]).await?;

        Ok(envelope.into_vec())
    }

    pub async fn areas(&self) -> Result<Vec<Area>, FetchError> {
        let envelope: MealsEnvelope<Area> = self.get_json(LIST_PATH, &[("a", "list")]).await?;

        Ok(envelope.into_vec())
    }

    async fn get_json<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{path}", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .inspect_err(|e| warn!("Request to {url} failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            warn!("{url} responded with {status}");
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let json_string = response.text().await?;

        serde_json::from_str(&json_string)
            .inspect_err(|e| warn!("Could not decode payload from {url}: {e}"))
            .map_err(FetchError::from)
    }
}

#[async_trait]
impl Gateway for MealsClient {
    async fn fetch_by_value(
        &self,
        kind: FilterKind,
        value: &FilterValue,
    ) -> Result<Vec<MealRecord>, FetchError> {
        debug!("Filtering upstream by {kind} {value}");

        let envelope: MealsEnvelope<MealRecord> = self
            .get_json(FILTER_PATH, &[(kind.param(), value.as_str())])
            .await?;

        Ok(envelope.into_vec())
    }

    async fn search(&self, query: &str) -> Result<Vec<MealRecord>, FetchError> {
        debug!("Searching upstream for {query:?}");

        let envelope: MealsEnvelope<MealRecord> =
            self.get_json(SEARCH_PATH, &[("s", query)]).await?;

        Ok(envelope.into_vec())
    }
}
