//! Stored entity graph: an account and its optional, chained disclosure tiers.
//!
//! Every PII field except given name and family name is held as an opaque
//! ciphertext blob produced by [`crate::crypto::FieldCipher`].

use common::protocol::Role;
use uuid::Uuid;

/// A stored account together with whatever tiers have been disclosed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub password_hash: Vec<u8>,
    pub password_salt: Vec<u8>,
    pub role: Role,
    pub disclosure: Disclosure,
}

/// Which tiers exist for an account.
///
/// Address details can only exist together with personal details, so the
/// three legal shapes are the only representable ones.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Disclosure {
    #[default]
    NoPersonal,
    PersonalOnly(PersonalDetails),
    PersonalAndAddress(PersonalDetails, AddressDetails),
}

impl Disclosure {
    pub fn personal(&self) -> Option<&PersonalDetails> {
        match self {
            Disclosure::NoPersonal => None,
            Disclosure::PersonalOnly(p) | Disclosure::PersonalAndAddress(p, _) => Some(p),
        }
    }

    pub fn address(&self) -> Option<&AddressDetails> {
        match self {
            Disclosure::PersonalAndAddress(_, a) => Some(a),
            _ => None,
        }
    }
}

/// Second tier. `name` and `last_name` are stored in plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalDetails {
    pub name: String,
    pub last_name: String,
    pub personal_code: Vec<u8>,
    pub phone_number: Vec<u8>,
    pub email_address: Vec<u8>,
    /// Processed picture bytes, stored as produced by the image collaborator.
    pub picture: Vec<u8>,
}

/// Third tier. All five fields are ciphertext blobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressDetails {
    pub country: Vec<u8>,
    pub city: Vec<u8>,
    pub street: Vec<u8>,
    pub house_number: Vec<u8>,
    pub apartment_number: Vec<u8>,
}

/// Data needed to create an account; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: Vec<u8>,
    pub password_salt: Vec<u8>,
}
