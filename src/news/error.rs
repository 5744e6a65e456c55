use thiserror::Error;

#[derive(Debug, Error)]
pub enum NewsError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("malformed provider response: {0}")]
    Malformed(String),
    #[error("refresher task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
