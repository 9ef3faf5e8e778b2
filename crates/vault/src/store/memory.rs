//! [`InMemoryStore`]: process-local [`AccountStore`] backed by a map.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::protocol::Role;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AccountStore, FetchDepth, FieldUpdate, StoreError};
use crate::model::{Account, AddressDetails, Disclosure, NewAccount, PersonalDetails};

/// Thread-safe in-memory account store.
///
/// Wraps an `Arc<RwLock<HashMap<..>>>` so clones share the same data. Each
/// call takes the lock once; there is no transaction spanning a fetch and a
/// later write.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<HashMap<Uuid, Account>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Trim the materialised graph to the requested depth.
fn project(account: &Account, depth: FetchDepth) -> Account {
    let disclosure = match (depth, &account.disclosure) {
        (FetchDepth::AccountOnly, _) => Disclosure::NoPersonal,
        (FetchDepth::WithPersonal, Disclosure::PersonalAndAddress(p, _)) => {
            Disclosure::PersonalOnly(p.clone())
        }
        (_, d) => d.clone(),
    };
    Account {
        disclosure,
        ..account.clone()
    }
}

fn apply(disclosure: &mut Disclosure, update: FieldUpdate) -> Result<(), StoreError> {
    match disclosure {
        Disclosure::NoPersonal => Err(StoreError::TierState("personal details missing")),
        Disclosure::PersonalOnly(_) if update.is_address_field() => {
            Err(StoreError::TierState("address details missing"))
        }
        Disclosure::PersonalOnly(p) => {
            apply_personal(p, update);
            Ok(())
        }
        Disclosure::PersonalAndAddress(p, a) => {
            if update.is_address_field() {
                apply_address(a, update);
            } else {
                apply_personal(p, update);
            }
            Ok(())
        }
    }
}

fn apply_personal(p: &mut PersonalDetails, update: FieldUpdate) {
    match update {
        FieldUpdate::Name(v) => p.name = v,
        FieldUpdate::LastName(v) => p.last_name = v,
        FieldUpdate::PersonalCode(v) => p.personal_code = v,
        FieldUpdate::PhoneNumber(v) => p.phone_number = v,
        FieldUpdate::EmailAddress(v) => p.email_address = v,
        _ => {}
    }
}

fn apply_address(a: &mut AddressDetails, update: FieldUpdate) {
    match update {
        FieldUpdate::Country(v) => a.country = v,
        FieldUpdate::City(v) => a.city = v,
        FieldUpdate::Street(v) => a.street = v,
        FieldUpdate::HouseNumber(v) => a.house_number = v,
        FieldUpdate::ApartmentNumber(v) => a.apartment_number = v,
        _ => {}
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn fetch_account(
        &self,
        id: Uuid,
        depth: FetchDepth,
    ) -> Result<Option<Account>, StoreError> {
        let map = self.inner.read().await;
        Ok(map.get(&id).map(|a| project(a, depth)))
    }

    async fn fetch_account_by_username(
        &self,
        username: &str,
        depth: FetchDepth,
    ) -> Result<Option<Account>, StoreError> {
        let map = self.inner.read().await;
        Ok(map
            .values()
            .find(|a| a.username == username)
            .map(|a| project(a, depth)))
    }

    async fn account_exists(&self, username: &str) -> Result<bool, StoreError> {
        let map = self.inner.read().await;
        Ok(map.values().any(|a| a.username == username))
    }

    async fn create_account(&self, record: NewAccount) -> Result<Uuid, StoreError> {
        let mut map = self.inner.write().await;
        if map.values().any(|a| a.username == record.username) {
            return Err(StoreError::UsernameTaken(record.username));
        }
        let id = Uuid::new_v4();
        map.insert(
            id,
            Account {
                id,
                username: record.username,
                password_hash: record.password_hash,
                password_salt: record.password_salt,
                role: Role::User,
                disclosure: Disclosure::NoPersonal,
            },
        );
        Ok(id)
    }

    async fn attach_personal_details(
        &self,
        account_id: Uuid,
        record: PersonalDetails,
    ) -> Result<(), StoreError> {
        let mut map = self.inner.write().await;
        let account = map
            .get_mut(&account_id)
            .ok_or(StoreError::AccountNotFound(account_id))?;
        if account.disclosure != Disclosure::NoPersonal {
            return Err(StoreError::TierState("personal details already exist"));
        }
        account.disclosure = Disclosure::PersonalOnly(record);
        Ok(())
    }

    async fn attach_address_details(
        &self,
        account_id: Uuid,
        record: AddressDetails,
    ) -> Result<(), StoreError> {
        let mut map = self.inner.write().await;
        let account = map
            .get_mut(&account_id)
            .ok_or(StoreError::AccountNotFound(account_id))?;
        let personal = match std::mem::take(&mut account.disclosure) {
            Disclosure::PersonalOnly(p) => p,
            other => {
                account.disclosure = other;
                return Err(StoreError::TierState(
                    "address requires personal details and no existing address",
                ));
            }
        };
        account.disclosure = Disclosure::PersonalAndAddress(personal, record);
        Ok(())
    }

    async fn update_field(&self, account_id: Uuid, update: FieldUpdate) -> Result<(), StoreError> {
        let mut map = self.inner.write().await;
        let account = map
            .get_mut(&account_id)
            .ok_or(StoreError::AccountNotFound(account_id))?;
        apply(&mut account.disclosure, update)
    }

    async fn delete_account(&self, account_id: Uuid) -> Result<(), StoreError> {
        let mut map = self.inner.write().await;
        map.remove(&account_id)
            .map(|_| ())
            .ok_or(StoreError::AccountNotFound(account_id))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        drop(self.inner.read().await);
        Ok(())
    }
}
