use thiserror::Error;

/// Error taxonomy for the domain layer.
///
/// The REST layer maps each variant onto a status code: `Validation`
/// and `Conflict` become 400 (conflicts are not a distinct status on
/// this API), `NotFound` 404, `Unauthorized` 401, `Forbidden` 403, and
/// `Internal` 500 with the detail logged rather than surfaced.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}
