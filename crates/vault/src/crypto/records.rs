//! Tier-level sealing on write and selective opening on read.

use common::protocol::{AddressView, CreateAddressDetailsRequest, PersonalView, UserView};

use super::cipher::{CipherError, FieldCipher};
use crate::model::{Account, AddressDetails, PersonalDetails};
use crate::validation::PersonalDetailsInput;

/// Seal the sensitive personal fields. Name, last name and picture pass through.
pub fn encrypt_personal_details(
    cipher: &FieldCipher,
    input: PersonalDetailsInput,
    picture: Vec<u8>,
) -> Result<PersonalDetails, CipherError> {
    Ok(PersonalDetails {
        personal_code: cipher.encrypt(&input.personal_code.to_string())?,
        phone_number: cipher.encrypt(&input.phone_number.to_string())?,
        email_address: cipher.encrypt(&input.email_address)?,
        name: input.name,
        last_name: input.last_name,
        picture,
    })
}

pub fn encrypt_address_details(
    cipher: &FieldCipher,
    request: &CreateAddressDetailsRequest,
) -> Result<AddressDetails, CipherError> {
    Ok(AddressDetails {
        country: cipher.encrypt(&request.country)?,
        city: cipher.encrypt(&request.city)?,
        street: cipher.encrypt(&request.street)?,
        house_number: cipher.encrypt(&request.house_number)?,
        apartment_number: cipher.encrypt(&request.apartment_number)?,
    })
}

fn open_personal(cipher: &FieldCipher, p: &PersonalDetails) -> Result<PersonalView, CipherError> {
    Ok(PersonalView {
        name: p.name.clone(),
        last_name: p.last_name.clone(),
        personal_code: cipher.decrypt(&p.personal_code)?,
        phone_number: cipher.decrypt(&p.phone_number)?,
        email_address: cipher.decrypt(&p.email_address)?,
    })
}

fn open_address(cipher: &FieldCipher, a: &AddressDetails) -> Result<AddressView, CipherError> {
    Ok(AddressView {
        country: cipher.decrypt(&a.country)?,
        city: cipher.decrypt(&a.city)?,
        street: cipher.decrypt(&a.street)?,
        house_number: cipher.decrypt(&a.house_number)?,
        apartment_number: cipher.decrypt(&a.apartment_number)?,
    })
}

/// Build the full, partial or minimal view depending on which tiers exist.
///
/// # Errors
///
/// Returns the first [`CipherError`] hit while opening a field.
pub fn compose_view(cipher: &FieldCipher, account: &Account) -> Result<UserView, CipherError> {
    Ok(UserView {
        username: account.username.clone(),
        role: account.role,
        personal: account
            .disclosure
            .personal()
            .map(|p| open_personal(cipher, p))
            .transpose()?,
        address: account
            .disclosure
            .address()
            .map(|a| open_address(cipher, a))
            .transpose()?,
    })
}
