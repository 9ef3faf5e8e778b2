//! Persistence collaborator contract and its in-memory implementation.
//!
//! # Module invariants
//!
//! - **No crypto dependencies.** Stores only ever see ciphertext blobs; they
//!   must not import anything from `crate::crypto`.
//! - Writes are last-write-wins; there is no concurrency token.

pub mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{Account, AddressDetails, NewAccount, PersonalDetails};

/// Errors produced by a persistence backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No account has the given id.
    #[error("account {0} not found")]
    AccountNotFound(Uuid),

    /// The username is already taken.
    #[error("username already exists: {0}")]
    UsernameTaken(String),

    /// A write targeted a tier that does not exist, or one that already does.
    #[error("inconsistent tier state: {0}")]
    TierState(&'static str),

    /// The backend itself failed.
    #[error("backend failure: {0}")]
    Backend(String),
}

/// How much of the owned-relation graph a fetch materialises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDepth {
    AccountOnly,
    WithPersonal,
    Full,
}

/// A single-field write. Encrypted fields carry ciphertext blobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Name(String),
    LastName(String),
    PersonalCode(Vec<u8>),
    PhoneNumber(Vec<u8>),
    EmailAddress(Vec<u8>),
    Country(Vec<u8>),
    City(Vec<u8>),
    Street(Vec<u8>),
    HouseNumber(Vec<u8>),
    ApartmentNumber(Vec<u8>),
}

impl FieldUpdate {
    /// `true` if this update targets the address tier.
    pub fn is_address_field(&self) -> bool {
        matches!(
            self,
            FieldUpdate::Country(_)
                | FieldUpdate::City(_)
                | FieldUpdate::Street(_)
                | FieldUpdate::HouseNumber(_)
                | FieldUpdate::ApartmentNumber(_)
        )
    }
}

/// Storage for accounts and their disclosure tiers.
///
/// Fetches return `Ok(None)` for an unknown account; `Err` is reserved for
/// backend failures and consistency violations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn fetch_account(&self, id: Uuid, depth: FetchDepth)
        -> Result<Option<Account>, StoreError>;

    async fn fetch_account_by_username(&self, username: &str, depth: FetchDepth)
        -> Result<Option<Account>, StoreError>;

    async fn account_exists(&self, username: &str) -> Result<bool, StoreError>;

    /// Create an account with role `User` and no tiers. Returns the new id.
    async fn create_account(&self, record: NewAccount) -> Result<Uuid, StoreError>;

    async fn attach_personal_details(
        &self,
        account_id: Uuid,
        record: PersonalDetails,
    ) -> Result<(), StoreError>;

    async fn attach_address_details(
        &self,
        account_id: Uuid,
        record: AddressDetails,
    ) -> Result<(), StoreError>;

    async fn update_field(&self, account_id: Uuid, update: FieldUpdate)
        -> Result<(), StoreError>;

    /// Remove the account and every tier it owns.
    async fn delete_account(&self, account_id: Uuid) -> Result<(), StoreError>;

    /// Succeeds while the backend can serve requests.
    async fn ping(&self) -> Result<(), StoreError>;
}
