//! Common error types shared across crates.

use thiserror::Error;

/// Message returned to callers in place of any internal failure detail.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal error, please contact support";

/// Top-level vault error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`VaultError::Precondition`] → the status carried by the violation (400 or 404)
/// - [`VaultError::Validation`] → 400
/// - [`VaultError::Unauthorized`] → 401
/// - [`VaultError::NotFound`] → 404
/// - [`VaultError::Crypto`] / [`VaultError::Persistence`] → 500
#[derive(Debug, Error)]
pub enum VaultError {
    /// The account is in the wrong disclosure state for the requested operation.
    #[error("{message}")]
    Precondition { status: u16, message: String },

    /// A field failed a format or range rule.
    #[error("{0}")]
    Validation(String),

    /// Credentials were presented but did not match.
    #[error("{0}")]
    Unauthorized(String),

    /// The referenced account or username does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A ciphertext blob could not be decrypted, or encryption failed.
    #[error("crypto failure: {0}")]
    Crypto(String),

    /// The persistence collaborator reported an I/O or consistency error.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl VaultError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            VaultError::Precondition { status, .. } => *status,
            VaultError::Validation(_) => 400,
            VaultError::Unauthorized(_) => 401,
            VaultError::NotFound(_) => 404,
            VaultError::Crypto(_) | VaultError::Persistence(_) => 500,
        }
    }

    /// `true` for failures whose detail must never cross the boundary.
    pub fn is_internal(&self) -> bool {
        matches!(self, VaultError::Crypto(_) | VaultError::Persistence(_))
    }

    /// The message safe to show to a caller.
    pub fn public_message(&self) -> String {
        if self.is_internal() {
            INTERNAL_ERROR_MESSAGE.to_owned()
        } else {
            self.to_string()
        }
    }
}
