use thiserror::Error;

/// Errors produced by root stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupt root payload: {reason}")]
    CorruptRoot { reason: String },
}

pub type StoreResult<T> = Result<T, StoreError>;
