use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Transport-level failure talking to the remote service.
    #[error("Remote store error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote service answered with a non-success status.
    #[error("Remote store responded {status}")]
    RemoteStatus { status: u16 },

    /// A document failed to (de)serialize.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
