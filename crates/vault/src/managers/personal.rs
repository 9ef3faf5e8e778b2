//! Personal details tier: creation and single-field updates.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::{
    protocol::{ActionResponse, CreatePersonalDetailsRequest},
    VaultError,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{respond, VaultContext, INVALID_FIELDS};
use crate::crypto::{records, FieldCipher};
use crate::picture::{self, ImageProcessor};
use crate::precondition::{self, TierOperation};
use crate::store::{FetchDepth, FieldUpdate};
use crate::validation::{self, PersonalDetailsInput};

/// Updatable fields of the personal tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalField {
    Name,
    LastName,
    PersonalCode,
    PhoneNumber,
    EmailAddress,
}

impl PersonalField {
    pub fn label(self) -> &'static str {
        match self {
            PersonalField::Name => "Name",
            PersonalField::LastName => "Last Name",
            PersonalField::PersonalCode => "Personal Code",
            PersonalField::PhoneNumber => "Phone Number",
            PersonalField::EmailAddress => "Email Address",
        }
    }

    /// Validate `value` for this field and turn it into a store write,
    /// encrypting where the field is stored sealed.
    fn prepare(self, value: &str, cipher: &FieldCipher) -> Result<FieldUpdate, VaultError> {
        let rejected = || VaultError::Validation(format!("{} does not meet requirements", self.label()));
        match self {
            PersonalField::Name | PersonalField::LastName => {
                if value.trim().is_empty() {
                    return Err(VaultError::Validation(format!("{} cannot be empty", self.label())));
                }
                Ok(match self {
                    PersonalField::Name => FieldUpdate::Name(value.to_owned()),
                    _ => FieldUpdate::LastName(value.to_owned()),
                })
            }
            PersonalField::PersonalCode => {
                let code = validation::parse_numeric(value)
                    .filter(|c| validation::personal_code_meets_requirements(*c))
                    .ok_or_else(rejected)?;
                Ok(FieldUpdate::PersonalCode(cipher.encrypt(&code.to_string())?))
            }
            PersonalField::PhoneNumber => {
                let number = validation::parse_numeric(value)
                    .filter(|n| validation::phone_number_meets_requirements(*n))
                    .ok_or_else(rejected)?;
                Ok(FieldUpdate::PhoneNumber(cipher.encrypt(&number.to_string())?))
            }
            PersonalField::EmailAddress => {
                if !validation::email_meets_requirements(value) {
                    return Err(rejected());
                }
                Ok(FieldUpdate::EmailAddress(cipher.encrypt(value)?))
            }
        }
    }
}

#[derive(Clone)]
pub struct PersonalDetailsManager {
    ctx: VaultContext,
    images: Arc<dyn ImageProcessor>,
}

impl PersonalDetailsManager {
    pub fn new(ctx: VaultContext, images: Arc<dyn ImageProcessor>) -> Self {
        Self { ctx, images }
    }

    /// Attach personal details to an account that has none yet.
    #[instrument(skip_all, fields(user_id = %account_id))]
    pub async fn create(
        &self,
        account_id: Uuid,
        request: &CreatePersonalDetailsRequest,
    ) -> ActionResponse {
        respond("create_personal_details", self.try_create(account_id, request).await)
    }

    async fn try_create(
        &self,
        account_id: Uuid,
        request: &CreatePersonalDetailsRequest,
    ) -> Result<ActionResponse, VaultError> {
        let account = self.ctx.load(account_id, FetchDepth::WithPersonal).await?;
        precondition::check(account.state(), TierOperation::CreatePersonal)?;

        let input = PersonalDetailsInput::parse(request)
            .filter(PersonalDetailsInput::meets_requirements)
            .ok_or_else(|| VaultError::Validation(INVALID_FIELDS.into()))?;

        let upload = STANDARD
            .decode(request.picture.trim())
            .map_err(|_| VaultError::Validation(INVALID_FIELDS.into()))?;
        let picture = picture::process_picture(self.images.as_ref(), &upload)?;

        let record = records::encrypt_personal_details(&self.ctx.cipher, input, picture)?;
        self.ctx
            .store
            .attach_personal_details(account.id, record)
            .await?;

        info!("personal details created");
        Ok(ActionResponse::success(
            201,
            format!("Personal Details added to {}", account.username),
        ))
    }

    /// Replace one field of the personal tier.
    #[instrument(skip(self, value), fields(user_id = %account_id))]
    async fn update(&self, account_id: Uuid, field: PersonalField, value: &str) -> ActionResponse {
        respond("update_personal_field", self.try_update(account_id, field, value).await)
    }

    async fn try_update(
        &self,
        account_id: Uuid,
        field: PersonalField,
        value: &str,
    ) -> Result<ActionResponse, VaultError> {
        let account = self.ctx.load(account_id, FetchDepth::WithPersonal).await?;
        precondition::check(account.state(), TierOperation::UpdatePersonalField)?;

        let update = field.prepare(value, &self.ctx.cipher)?;
        self.ctx.store.update_field(account.id, update).await?;

        info!(field = field.label(), "personal field updated");
        Ok(ActionResponse::success(
            200,
            format!("{} successfully updated", field.label()),
        ))
    }

    pub async fn update_name(&self, account_id: Uuid, value: &str) -> ActionResponse {
        self.update(account_id, PersonalField::Name, value).await
    }

    pub async fn update_last_name(&self, account_id: Uuid, value: &str) -> ActionResponse {
        self.update(account_id, PersonalField::LastName, value).await
    }

    pub async fn update_personal_code(&self, account_id: Uuid, value: &str) -> ActionResponse {
        self.update(account_id, PersonalField::PersonalCode, value).await
    }

    pub async fn update_phone_number(&self, account_id: Uuid, value: &str) -> ActionResponse {
        self.update(account_id, PersonalField::PhoneNumber, value).await
    }

    pub async fn update_email(&self, account_id: Uuid, value: &str) -> ActionResponse {
        self.update(account_id, PersonalField::EmailAddress, value).await
    }
}
