use thiserror::Error;

use crate::history::StoreError;

pub type Result<T> = std::result::Result<T, TranslateError>;

/// Failure of a translate request, one variant per kind a caller can act on.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// Input rejected before any provider call.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Completion provider failed or answered with something unusable.
    #[error("completion provider error: {0}")]
    Provider(anyhow::Error),

    /// History store could not be read or written.
    #[error("history store error: {0}")]
    Persistence(#[from] StoreError),
}

impl TranslateError {
    /// Stable machine-readable name of the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Provider(_) => "provider",
            Self::Persistence(_) => "persistence",
        }
    }
}
