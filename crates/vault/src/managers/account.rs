//! Account tier: registration, login, views, and deletion.

use common::{
    protocol::{ActionResponse, LoginRequest, LoginResponse, RegisterUserRequest, UserView},
    VaultError,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{log_failure, respond, VaultContext, USER_NOT_FOUND};
use crate::crypto::{password, records};
use crate::model::NewAccount;
use crate::precondition::{self, TierOperation};
use crate::store::{FetchDepth, StoreError};
use crate::validation;

pub const REGISTRATION_INVALID: &str =
    "Validation failed, some fields are not meeting the requirements, please check input data";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Clone)]
pub struct AccountManager {
    ctx: VaultContext,
}

impl AccountManager {
    pub fn new(ctx: VaultContext) -> Self {
        Self { ctx }
    }

    /// Create an account with role `User` if the credentials meet the rules.
    #[instrument(skip_all, fields(username = %request.username))]
    pub async fn register(&self, request: &RegisterUserRequest) -> ActionResponse {
        respond("register", self.try_register(request).await)
    }

    async fn try_register(&self, request: &RegisterUserRequest) -> Result<ActionResponse, VaultError> {
        let username_ok =
            validation::username_meets_requirements(&request.username, self.ctx.store.as_ref())
                .await?;
        if !username_ok || !validation::password_meets_requirements(&request.password) {
            return Err(VaultError::Validation(REGISTRATION_INVALID.into()));
        }

        let hashed = password::hash_password(&request.password)
            .map_err(|e| VaultError::Crypto(e.to_string()))?;
        let record = NewAccount {
            username: request.username.clone(),
            password_hash: hashed.hash,
            password_salt: hashed.salt,
        };

        match self.ctx.store.create_account(record).await {
            Ok(id) => {
                info!(user_id = %id, "user created");
                Ok(ActionResponse::success(201, "New user successfully created"))
            }
            // Lost a race with a concurrent registration of the same name.
            Err(StoreError::UsernameTaken(_)) => {
                Err(VaultError::Validation(REGISTRATION_INVALID.into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check credentials and return the account id and role.
    #[instrument(skip_all, fields(username = %request.username))]
    pub async fn login(&self, request: &LoginRequest) -> LoginResponse {
        match self.try_login(request).await {
            Ok(resp) => resp,
            Err(err) => {
                log_failure("login", &err);
                LoginResponse::from_error(&err)
            }
        }
    }

    async fn try_login(&self, request: &LoginRequest) -> Result<LoginResponse, VaultError> {
        let account = self
            .ctx
            .store
            .fetch_account_by_username(&request.username, FetchDepth::AccountOnly)
            .await?
            .ok_or_else(|| VaultError::NotFound(USER_NOT_FOUND.into()))?;

        if !password::verify_password(
            &request.password,
            &account.password_hash,
            &account.password_salt,
        ) {
            return Err(VaultError::Unauthorized(INVALID_CREDENTIALS.into()));
        }
        Ok(LoginResponse::success(account.id, account.role))
    }

    /// Decrypted view of every tier the account has disclosed.
    ///
    /// # Errors
    ///
    /// [`VaultError::NotFound`] for an unknown account. Store and crypto
    /// failures are logged and returned as internal errors.
    #[instrument(skip_all, fields(user_id = %account_id))]
    pub async fn view(&self, account_id: Uuid) -> Result<UserView, VaultError> {
        let result = self.try_view(account_id).await;
        if let Err(err) = &result {
            log_failure("view", err);
        }
        result
    }

    async fn try_view(&self, account_id: Uuid) -> Result<UserView, VaultError> {
        let account = self.ctx.load(account_id, FetchDepth::Full).await?;
        precondition::check(account.state(), TierOperation::ReadView)?;
        Ok(records::compose_view(&self.ctx.cipher, &account)?)
    }

    /// Remove an account and everything it owns.
    #[instrument(skip_all, fields(username = %username))]
    pub async fn delete(&self, username: &str) -> ActionResponse {
        respond("delete_account", self.try_delete(username).await)
    }

    async fn try_delete(&self, username: &str) -> Result<ActionResponse, VaultError> {
        let account = self
            .ctx
            .store
            .fetch_account_by_username(username, FetchDepth::AccountOnly)
            .await?
            .ok_or_else(|| VaultError::NotFound(USER_NOT_FOUND.into()))?;
        self.ctx.store.delete_account(account.id).await?;
        info!(user_id = %account.id, "user deleted");
        Ok(ActionResponse::success(
            200,
            format!("User {} deleted", account.username),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managers::testing::{account_with, context};
    use crate::managers::{AddressDetailsManager, PersonalDetailsManager};
    use crate::model::Disclosure;
    use crate::picture::PortraitProcessor;
    use crate::store::{AccountStore, InMemoryStore, MockAccountStore};
    use common::protocol::Role;
    use std::sync::Arc;

    fn register_request(username: &str, password: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            username: username.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let manager = AccountManager::new(context(InMemoryStore::new()));
        let resp = manager.register(&register_request("jonas1", "Abcdef1!")).await;
        assert!(resp.is_success);
        assert_eq!(resp.status_code, 201);

        let login = manager
            .login(&LoginRequest {
                username: "jonas1".into(),
                password: "Abcdef1!".into(),
            })
            .await;
        assert!(login.is_success);
        assert_eq!(login.role, Some(Role::User));
    }

    #[tokio::test]
    async fn short_username_rejected_regardless_of_password() {
        let mut store = MockAccountStore::new();
        store.expect_account_exists().times(0);
        store.expect_create_account().times(0);
        let manager = AccountManager::new(context(store));

        let resp = manager.register(&register_request("ab12", "Abcdef1!")).await;
        assert!(!resp.is_success);
        assert_eq!(resp.status_code, 400);
        assert_eq!(resp.message, REGISTRATION_INVALID);
    }

    #[tokio::test]
    async fn duplicate_username_rejected() {
        let manager = AccountManager::new(context(InMemoryStore::new()));
        assert!(manager.register(&register_request("jonas1", "Abcdef1!")).await.is_success);
        let resp = manager.register(&register_request("jonas1", "Xyzxyz9?")).await;
        assert_eq!(resp.status_code, 400);
    }

    #[tokio::test]
    async fn weak_password_rejected_without_persisting() {
        let mut store = MockAccountStore::new();
        store.expect_account_exists().returning(|_| Ok(false));
        store.expect_create_account().times(0);
        let manager = AccountManager::new(context(store));
        let resp = manager.register(&register_request("jonas1", "abcdefg1")).await;
        assert_eq!(resp.status_code, 400);
    }

    #[tokio::test]
    async fn store_failure_is_masked() {
        let mut store = MockAccountStore::new();
        store
            .expect_account_exists()
            .returning(|_| Err(StoreError::Backend("connection refused on 10.0.0.5".into())));
        let manager = AccountManager::new(context(store));
        let resp = manager.register(&register_request("jonas1", "Abcdef1!")).await;
        assert_eq!(resp.status_code, 500);
        assert!(!resp.message.contains("10.0.0.5"));
    }

    #[tokio::test]
    async fn login_failures() {
        let manager = AccountManager::new(context(InMemoryStore::new()));
        manager.register(&register_request("jonas1", "Abcdef1!")).await;

        let unknown = manager
            .login(&LoginRequest {
                username: "petras".into(),
                password: "Abcdef1!".into(),
            })
            .await;
        assert_eq!(unknown.status_code, 404);

        let wrong = manager
            .login(&LoginRequest {
                username: "jonas1".into(),
                password: "Abcdef1?".into(),
            })
            .await;
        assert_eq!(wrong.status_code, 401);
        assert_eq!(wrong.error_message.as_deref(), Some(INVALID_CREDENTIALS));
    }

    #[tokio::test]
    async fn login_and_delete_fetch_only_the_account_row() {
        let mut store = MockAccountStore::new();
        store
            .expect_fetch_account_by_username()
            .withf(|name: &str, depth: &FetchDepth| {
                name == "jonas1" && *depth == FetchDepth::AccountOnly
            })
            .times(2)
            .returning(|_, _| Ok(None));
        let manager = AccountManager::new(context(store));

        let login = manager
            .login(&LoginRequest {
                username: "jonas1".into(),
                password: "Abcdef1!".into(),
            })
            .await;
        assert_eq!(login.status_code, 404);
        assert_eq!(manager.delete("jonas1").await.status_code, 404);
    }

    #[tokio::test]
    async fn view_grows_with_disclosure() {
        let ctx = context(InMemoryStore::new());
        let accounts = AccountManager::new(ctx.clone());
        let personal = PersonalDetailsManager::new(ctx.clone(), Arc::new(PortraitProcessor));
        let address = AddressDetailsManager::new(ctx.clone());

        accounts.register(&register_request("jonas1", "Abcdef1!")).await;
        let id = accounts
            .login(&LoginRequest {
                username: "jonas1".into(),
                password: "Abcdef1!".into(),
            })
            .await
            .id
            .unwrap();

        let minimal = accounts.view(id).await.unwrap();
        assert!(minimal.personal.is_none());

        personal
            .create(id, &crate::managers::testing::personal_request())
            .await;
        let partial = accounts.view(id).await.unwrap();
        assert_eq!(partial.personal.unwrap().personal_code, "39001010000");
        assert!(partial.address.is_none());

        address
            .create(id, &crate::managers::testing::address_request())
            .await;
        let full = accounts.view(id).await.unwrap();
        assert_eq!(full.address.unwrap().city, "Vilnius");
    }

    #[tokio::test]
    async fn view_of_unknown_account_is_not_found() {
        let manager = AccountManager::new(context(InMemoryStore::new()));
        let err = manager.view(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.http_status(), 404);
    }

    #[tokio::test]
    async fn undecryptable_field_is_internal_error() {
        let id = Uuid::new_v4();
        let mut store = MockAccountStore::new();
        store.expect_fetch_account().returning(move |_, _| {
            Ok(Some(account_with(
                id,
                Disclosure::PersonalOnly(crate::managers::testing::personal_record()),
            )))
        });
        let manager = AccountManager::new(context(store));
        let err = manager.view(id).await.unwrap_err();
        assert_eq!(err.http_status(), 500);
        assert!(err.is_internal());
    }

    #[tokio::test]
    async fn delete_cascades_and_reports() {
        let store = InMemoryStore::new();
        let manager = AccountManager::new(context(store.clone()));
        manager.register(&register_request("jonas1", "Abcdef1!")).await;

        let resp = manager.delete("jonas1").await;
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.message, "User jonas1 deleted");
        assert!(!store.account_exists("jonas1").await.unwrap());

        let resp = manager.delete("jonas1").await;
        assert_eq!(resp.status_code, 404);
    }
}
