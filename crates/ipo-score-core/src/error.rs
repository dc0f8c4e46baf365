use thiserror::Error;

#[derive(Debug, Error)]
pub enum IpoScoreError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid scoring policy: {}", .0.join("; "))]
    InvalidPolicy(Vec<String>),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for IpoScoreError {
    fn from(e: serde_json::Error) -> Self {
        IpoScoreError::SerializationError(e.to_string())
    }
}
