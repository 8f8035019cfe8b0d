use std::{env, fmt::Display, fs::read_to_string, str::FromStr, time::Duration};

use tracing::{info, warn};

use crate::error::ConfigError;

const API_ROOT: &str = "https://www.themealdb.com/api/json/v1";
const TEST_API_KEY: &str = "1";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub meal_api_base: String,
    pub upstream_timeout: Duration,
    pub fanout_limit: usize,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load("RECIPES_PORT", "1111")?,
            meal_api_base: var("MEAL_API_BASE").unwrap_or_else(|_| default_api_base()),
            upstream_timeout: Duration::from_millis(try_load("UPSTREAM_TIMEOUT_MS", "5000")?),
            fanout_limit: try_load("FANOUT_LIMIT", "8")?,
        })
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    parse(key, &raw)
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    raw.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");

        ConfigError {
            key: key.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        }
    })
}

fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            info!("Failed to read {secret_name} from file: {e}");
        })
        .ok()
}

fn default_api_base() -> String {
    let key = read_secret("MEAL_API_KEY").unwrap_or_else(|| {
        info!("Using the public test key for the meal API");
        TEST_API_KEY.to_string()
    });

    format!("{API_ROOT}/{key}")
}
