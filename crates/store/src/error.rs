use std::path::PathBuf;

use friends_core::error::CoreError;
use friends_core::types::RecordId;

/// Errors produced by the record store.
///
/// `NotFound` is the only domain outcome and `Invalid` carries a rejected
/// input value. Every other variant means the backing file could not be
/// read, parsed or written.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Record with id {id} not found")]
    NotFound { id: RecordId },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed backing file: {0}")]
    Schema(String),

    #[error(transparent)]
    Invalid(#[from] CoreError),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => CoreError::NotFound {
                entity: "Character",
                id,
            },
            StoreError::Invalid(err) => err,
            other => CoreError::Internal(other.to_string()),
        }
    }
}
