pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The layered-graph primitive failed to place every node.
    #[error("layout engine failed: {message}")]
    Engine { message: String },

    /// The key-value backend behind the position store reported a failure.
    #[error("position store failed: {message}")]
    Store { message: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn engine(message: impl Into<String>) -> Self {
        Error::Engine {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Error::Store {
            message: message.into(),
        }
    }
}
