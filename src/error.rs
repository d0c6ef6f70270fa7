use thiserror::Error;

/// Every failure the library reports to its caller.
///
/// Configuration and shape errors are detected before any state is mutated;
/// persistence errors carry the underlying I/O or decode failure.
#[derive(Debug, Error)]
pub enum Error {
    /// Unknown activation/loss selection or an unusable hyperparameter.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A vector whose length (or a label whose value) does not fit the network.
    #[error("data shape error: {0}")]
    DataShape(String),

    #[error("persistence I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("persistence decode error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A decoded snapshot whose layer shapes do not line up.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

pub type Result<T> = std::result::Result<T, Error>;
