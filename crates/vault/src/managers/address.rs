//! Address details tier.

use common::{
    protocol::{ActionResponse, CreateAddressDetailsRequest},
    VaultError,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{respond, VaultContext, INVALID_FIELDS};
use crate::crypto::{records, FieldCipher};
use crate::precondition::{self, TierOperation};
use crate::store::{FetchDepth, FieldUpdate};
use crate::validation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    Country,
    City,
    Street,
    HouseNumber,
    ApartmentNumber,
}

impl AddressField {
    pub fn label(self) -> &'static str {
        match self {
            AddressField::Country => "Country",
            AddressField::City => "City",
            AddressField::Street => "Street",
            AddressField::HouseNumber => "House Number",
            AddressField::ApartmentNumber => "Apartment Number",
        }
    }

    fn prepare(self, value: &str, cipher: &FieldCipher) -> Result<FieldUpdate, VaultError> {
        if value.trim().is_empty() {
            return Err(VaultError::Validation(format!("{} cannot be empty", self.label())));
        }
        let sealed = cipher.encrypt(value)?;
        Ok(match self {
            AddressField::Country => FieldUpdate::Country(sealed),
            AddressField::City => FieldUpdate::City(sealed),
            AddressField::Street => FieldUpdate::Street(sealed),
            AddressField::HouseNumber => FieldUpdate::HouseNumber(sealed),
            AddressField::ApartmentNumber => FieldUpdate::ApartmentNumber(sealed),
        })
    }
}

#[derive(Clone)]
pub struct AddressDetailsManager {
    ctx: VaultContext,
}

impl AddressDetailsManager {
    pub fn new(ctx: VaultContext) -> Self {
        Self { ctx }
    }

    /// Attach address details. Requires personal details and no address yet.
    #[instrument(skip_all, fields(user_id = %account_id))]
    pub async fn create(
        &self,
        account_id: Uuid,
        request: &CreateAddressDetailsRequest,
    ) -> ActionResponse {
        respond("create_address_details", self.try_create(account_id, request).await)
    }

    async fn try_create(
        &self,
        account_id: Uuid,
        request: &CreateAddressDetailsRequest,
    ) -> Result<ActionResponse, VaultError> {
        let account = self.ctx.load(account_id, FetchDepth::Full).await?;
        precondition::check(account.state(), TierOperation::CreateAddress)?;

        if !validation::request_fields_non_empty(request) {
            return Err(VaultError::Validation(INVALID_FIELDS.into()));
        }

        let record = records::encrypt_address_details(&self.ctx.cipher, request)?;
        self.ctx
            .store
            .attach_address_details(account.id, record)
            .await?;

        info!("address details created");
        Ok(ActionResponse::success(
            201,
            format!("Address Details added to {}", account.username),
        ))
    }

    #[instrument(skip(self, value), fields(user_id = %account_id))]
    async fn update(&self, account_id: Uuid, field: AddressField, value: &str) -> ActionResponse {
        respond("update_address_field", self.try_update(account_id, field, value).await)
    }

    async fn try_update(
        &self,
        account_id: Uuid,
        field: AddressField,
        value: &str,
    ) -> Result<ActionResponse, VaultError> {
        let account = self.ctx.load(account_id, FetchDepth::Full).await?;
        precondition::check(account.state(), TierOperation::UpdateAddressField)?;

        let update = field.prepare(value, &self.ctx.cipher)?;
        self.ctx.store.update_field(account.id, update).await?;

        info!(field = field.label(), "address field updated");
        Ok(ActionResponse::success(
            200,
            format!("{} successfully updated", field.label()),
        ))
    }

    pub async fn update_country(&self, account_id: Uuid, value: &str) -> ActionResponse {
        self.update(account_id, AddressField::Country, value).await
    }

    pub async fn update_city(&self, account_id: Uuid, value: &str) -> ActionResponse {
        self.update(account_id, AddressField::City, value).await
    }

    pub async fn update_street(&self, account_id: Uuid, value: &str) -> ActionResponse {
        self.update(account_id, AddressField::Street, value).await
    }

    pub async fn update_house_number(&self, account_id: Uuid, value: &str) -> ActionResponse {
        self.update(account_id, AddressField::HouseNumber, value).await
    }

    pub async fn update_apartment_number(&self, account_id: Uuid, value: &str) -> ActionResponse {
        self.update(account_id, AddressField::ApartmentNumber, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managers::testing::{
        account_with, address_record, address_request, context, personal_record, personal_request,
    };
    use crate::managers::PersonalDetailsManager;
    use crate::model::{Disclosure, NewAccount};
    use crate::picture::PortraitProcessor;
    use crate::store::{AccountStore, InMemoryStore, MockAccountStore};
    use std::sync::Arc;

    fn mocked_fetch(disclosure: Disclosure) -> MockAccountStore {
        let mut store = MockAccountStore::new();
        store
            .expect_fetch_account()
            .returning(move |id, _| Ok(Some(account_with(id, disclosure.clone()))));
        store
    }

    #[tokio::test]
    async fn create_requires_personal_tier() {
        let mut store = mocked_fetch(Disclosure::NoPersonal);
        store.expect_attach_address_details().times(0);
        let resp = AddressDetailsManager::new(context(store))
            .create(Uuid::new_v4(), &address_request())
            .await;
        assert_eq!(resp.status_code, 404);
        assert_eq!(
            resp.message,
            "You have to add personal details first, in order to add address details"
        );
    }

    #[tokio::test]
    async fn create_rejected_when_address_exists() {
        let mut store = mocked_fetch(Disclosure::PersonalAndAddress(
            personal_record(),
            address_record(),
        ));
        store.expect_attach_address_details().times(0);
        let resp = AddressDetailsManager::new(context(store))
            .create(Uuid::new_v4(), &address_request())
            .await;
        assert_eq!(resp.status_code, 400);
        assert_eq!(resp.message, "Address details already exist");
    }

    #[tokio::test]
    async fn blank_field_rejects_whole_request() {
        let mut store = mocked_fetch(Disclosure::PersonalOnly(personal_record()));
        store.expect_attach_address_details().times(0);
        let request = CreateAddressDetailsRequest {
            apartment_number: " ".into(),
            ..address_request()
        };
        let resp = AddressDetailsManager::new(context(store))
            .create(Uuid::new_v4(), &request)
            .await;
        assert_eq!(resp.status_code, 400);
        assert_eq!(resp.message, INVALID_FIELDS);
    }

    #[tokio::test]
    async fn country_update_follows_disclosure_state() {
        let store = InMemoryStore::new();
        let id = store
            .create_account(NewAccount {
                username: "jonas1".into(),
                password_hash: vec![],
                password_salt: vec![],
            })
            .await
            .unwrap();
        let ctx = context(store);
        let personal = PersonalDetailsManager::new(ctx.clone(), Arc::new(PortraitProcessor));
        let address = AddressDetailsManager::new(ctx);

        let resp = address.update_country(id, "France").await;
        assert_eq!(resp.status_code, 404);
        assert_eq!(
            resp.message,
            "You have to add personal details first and then address details, in order to update specific fields"
        );

        personal.create(id, &personal_request()).await;
        let resp = address.update_country(id, "France").await;
        assert_eq!(resp.status_code, 400);
        assert_eq!(
            resp.message,
            "You have to add address details first, in order to update specific fields"
        );

        let resp = address.create(id, &address_request()).await;
        assert_eq!(resp.message, "Address Details added to jonas1");
        let resp = address.update_country(id, "France").await;
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.message, "Country successfully updated");
    }

    #[tokio::test]
    async fn every_field_update_lands() {
        let store = InMemoryStore::new();
        let id = store
            .create_account(NewAccount {
                username: "jonas1".into(),
                password_hash: vec![],
                password_salt: vec![],
            })
            .await
            .unwrap();
        let ctx = context(store.clone());
        PersonalDetailsManager::new(ctx.clone(), Arc::new(PortraitProcessor))
            .create(id, &personal_request())
            .await;
        let address = AddressDetailsManager::new(ctx.clone());
        address.create(id, &address_request()).await;

        assert!(address.update_city(id, "Kaunas").await.is_success);
        assert!(address.update_street(id, "Laisvės al.").await.is_success);
        assert!(address.update_house_number(id, "53").await.is_success);
        assert!(address.update_apartment_number(id, "2").await.is_success);

        let account = store.fetch_account(id, FetchDepth::Full).await.unwrap().unwrap();
        let view = records::compose_view(&ctx.cipher, &account).unwrap();
        let a = view.address.unwrap();
        assert_eq!(a.country, "Lithuania");
        assert_eq!(a.city, "Kaunas");
        assert_eq!(a.street, "Laisvės al.");
        assert_eq!(a.house_number, "53");
        assert_eq!(a.apartment_number, "2");
    }

    #[tokio::test]
    async fn empty_update_value_rejected() {
        let mut store = mocked_fetch(Disclosure::PersonalAndAddress(
            personal_record(),
            address_record(),
        ));
        store.expect_update_field().times(0);
        let resp = AddressDetailsManager::new(context(store))
            .update_house_number(Uuid::new_v4(), "")
            .await;
        assert_eq!(resp.status_code, 400);
        assert_eq!(resp.message, "House Number cannot be empty");
    }
}
