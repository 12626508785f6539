use thiserror::Error;

/// Failure talking to the document store. Callers surface it as a generic
/// server error; nothing here is retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Store request failed: {0}")]
    Request(String),

    #[error("Failed to decode store record: {0}")]
    Decode(String),
}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        StoreError::Request(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}
