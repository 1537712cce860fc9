//! Error taxonomy for the certification read path.

use crate::domain::model::RecordDecodeError;
use crate::storage::documents::StoreError;
use thiserror::Error;

/// Rejections of untrusted request input. All of these are client errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Input key '{0}' is not valid (expected one of: id, category, company)")]
    InvalidField(String),

    #[error("Input exceeds maximum length ({len} > {max})")]
    InputTooLong { len: usize, max: usize },

    #[error("Invalid 'top' value '{0}' (expected a positive integer)")]
    InvalidLimit(String),
}

#[derive(Debug, Error)]
pub enum CertError {
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Credential discovery or client construction failed.
    #[error("Database authentication failed: {0}")]
    ClientAuth(String),

    #[error("Failed to fetch results: {0}")]
    Fetch(#[source] StoreError),

    #[error("Failed to decode certification record: {0}")]
    Decode(#[from] RecordDecodeError),
}

impl CertError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, CertError::Query(_))
    }

    /// Maps a store failure that happened while talking to the database.
    /// Credential failures stay distinguishable from transport failures.
    pub fn from_store(err: StoreError) -> Self {
        match err {
            StoreError::Credential(msg) => CertError::ClientAuth(msg),
            other => CertError::Fetch(other),
        }
    }
}

pub type CertResult<T> = Result<T, CertError>;
