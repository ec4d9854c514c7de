use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Provider API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Provider API key is not configured")]
    MissingApiKey,
}

pub type LlmResult<T> = Result<T, LlmError>;
