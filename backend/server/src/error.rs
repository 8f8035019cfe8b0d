use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use finder::AggregationError;
use meals::FetchError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("Invalid {key} value {value:?}: {reason}")]
pub struct ConfigError {
    pub key: String,
    pub value: String,
    pub reason: String,
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build upstream client: {0}")]
    Client(#[from] FetchError),

    #[error("Server io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing query parameter {0:?}")]
    MissingParameter(&'static str),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            AppError::Fetch(e) => fetch_status(e),
            AppError::Aggregation(e) if e.failures.iter().all(|f| f.cause.is_timeout()) => {
                StatusCode::GATEWAY_TIMEOUT
            }
            AppError::Aggregation(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

fn fetch_status(error: &FetchError) -> StatusCode {
    match error {
        FetchError::InvalidValue(_) => StatusCode::BAD_REQUEST,
        e if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            AppError::Aggregation(e) => json!({
                "error": self.to_string(),
                "axis": e.axis,
                "failures": e
                    .failures
                    .iter()
                    .map(|f| json!({ "value": f.value, "error": f.cause.to_string() }))
                    .collect::<Vec<_>>(),
            }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
