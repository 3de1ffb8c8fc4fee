use thiserror::Error;

/// Top-level error type for the PlantDoc pipeline.
#[derive(Debug, Error)]
pub enum PlantDocError {
    #[error("vision provider error ({provider}): {message}")]
    VisionError { provider: String, message: String },

    #[error("authentication failed: {0}")]
    AuthError(String),

    #[error("not signed in")]
    NotSignedIn,

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("This plant is already in your collection")]
    AlreadySaved,

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
