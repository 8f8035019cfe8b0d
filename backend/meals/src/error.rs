use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to reach upstream: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Upstream responded with status {status}")]
    Status { status: u16 },

    #[error("Malformed upstream payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid filter value {0:?}")]
    InvalidValue(String),

    #[error("Upstream request was cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Transport(e) if e.is_timeout())
    }
}
