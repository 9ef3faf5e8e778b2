//! Tier managers: the orchestration layer behind every vault operation.
//!
//! Each operation follows the same sequence:
//!
//! 1. Load the account graph, only as deep as the operation needs.
//! 2. Evaluate the [`crate::precondition`] guard; stop on violation.
//! 3. Validate the proposed field values; stop on failure.
//! 4. Encrypt the sensitive fields.
//! 5. Persist the targeted field or tier.
//! 6. Return a uniform [`ActionResponse`].
//!
//! Store and crypto failures are logged here and masked before they leave
//! the manager.

pub mod account;
pub mod address;
pub mod personal;

pub use account::AccountManager;
pub use address::AddressDetailsManager;
pub use personal::PersonalDetailsManager;

use std::sync::Arc;

use common::{protocol::ActionResponse, VaultError};
use tracing::{debug, error};
use uuid::Uuid;

use crate::crypto::{CipherError, FieldCipher};
use crate::model::Account;
use crate::picture::ImageError;
use crate::store::{AccountStore, FetchDepth, StoreError};

pub const USER_NOT_FOUND: &str = "User not found";
pub const INVALID_FIELDS: &str = "Some fields are not valid, please check input data";

/// Collaborators shared by every tier manager.
#[derive(Clone)]
pub struct VaultContext {
    pub store: Arc<dyn AccountStore>,
    pub cipher: Arc<FieldCipher>,
}

impl VaultContext {
    pub fn new(store: Arc<dyn AccountStore>, cipher: Arc<FieldCipher>) -> Self {
        Self { store, cipher }
    }

    /// Fetch an account, mapping absence to [`VaultError::NotFound`].
    async fn load(&self, account_id: Uuid, depth: FetchDepth) -> Result<Account, VaultError> {
        self.store
            .fetch_account(account_id, depth)
            .await?
            .ok_or_else(|| VaultError::NotFound(USER_NOT_FOUND.into()))
    }
}

impl From<StoreError> for VaultError {
    fn from(e: StoreError) -> Self {
        VaultError::Persistence(e.to_string())
    }
}

impl From<CipherError> for VaultError {
    fn from(e: CipherError) -> Self {
        VaultError::Crypto(e.to_string())
    }
}

impl From<ImageError> for VaultError {
    fn from(e: ImageError) -> Self {
        VaultError::Validation(format!("Picture is not valid: {e}"))
    }
}

/// Record the failure for operators when it is internal, then render it.
fn log_failure(operation: &'static str, err: &VaultError) {
    if err.is_internal() {
        error!(operation, error = %err, "operation failed");
    } else {
        debug!(operation, status = err.http_status(), "operation rejected");
    }
}

/// Collapse an operation outcome into the uniform write result.
fn respond(operation: &'static str, result: Result<ActionResponse, VaultError>) -> ActionResponse {
    result.unwrap_or_else(|err| {
        log_failure(operation, &err);
        ActionResponse::from_error(&err)
    })
}
