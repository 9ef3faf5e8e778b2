//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::crypto::FieldCipher;
use crate::managers::{AccountManager, AddressDetailsManager, PersonalDetailsManager, VaultContext};
use crate::picture::ImageProcessor;
use crate::store::AccountStore;

/// Application state shared across all request handlers.
///
/// Every field is `Arc`-backed, so Axum clones the state per request without
/// copying the store or the cipher.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountManager,
    pub personal: PersonalDetailsManager,
    pub address: AddressDetailsManager,
    /// Used by the health check.
    pub store: Arc<dyn AccountStore>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn AccountStore>,
        cipher: Arc<FieldCipher>,
        images: Arc<dyn ImageProcessor>,
    ) -> Self {
        let ctx = VaultContext::new(store.clone(), cipher);
        Self {
            accounts: AccountManager::new(ctx.clone()),
            personal: PersonalDetailsManager::new(ctx.clone(), images),
            address: AddressDetailsManager::new(ctx),
            store,
        }
    }
}

#[cfg(test)]
impl Default for AppState {
    /// Empty in-memory store and a fixed test key, suitable for tests.
    fn default() -> Self {
        Self::new(
            Arc::new(crate::store::InMemoryStore::new()),
            crate::managers::testing::cipher(),
            Arc::new(crate::picture::PortraitProcessor),
        )
    }
}
