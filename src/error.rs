use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrismError {
    /// A mutator or listener callback refused to produce a value.
    #[error("callback failed: {0}")]
    Callback(String),

    #[error("a view named `{0}` is already registered")]
    DuplicateView(String),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(serde_json::Value),

    #[error("invalid view options: {0}")]
    Options(#[from] serde_json::Error),
}

impl PrismError {
    pub fn callback(msg: impl Into<String>) -> Self {
        PrismError::Callback(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, PrismError>;
