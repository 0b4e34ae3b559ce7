use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("Request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    BadStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("API key not set (expected in ${0})")]
    MissingApiKey(String),

    #[error("Model returned no code")]
    EmptyResponse,
}
