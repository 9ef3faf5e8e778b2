//! Format and range rules for credentials and PII fields.
//!
//! Everything here is a pure predicate except [`username_meets_requirements`],
//! which needs the store to check uniqueness.

use std::sync::LazyLock;

use common::protocol::{CreatePersonalDetailsRequest, RequestFields};
use regex::Regex;

use crate::store::{AccountStore, StoreError};

pub const MIN_USERNAME_LEN: usize = 6;
pub const MIN_PASSWORD_LEN: usize = 8;

/// Exclusive bounds for a personal code.
pub const PERSONAL_CODE_RANGE: (i64, i64) = (30_000_000_000, 50_000_000_000);

/// Exclusive bounds for a mobile phone number (370 country prefix, 5/6 operator block).
pub const PHONE_NUMBER_RANGE: (i64, i64) = (37_050_000_000, 37_070_000_000);

static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").unwrap());
static LOWER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z]").unwrap());
static UPPER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z]").unwrap());
static SYMBOL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)+$").unwrap()
});

/// At least eight characters with a digit, a lowercase letter, an uppercase
/// letter, and a character that is neither alphanumeric nor whitespace.
pub fn password_meets_requirements(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
        && DIGIT.is_match(password)
        && LOWER.is_match(password)
        && UPPER.is_match(password)
        && SYMBOL.is_match(password)
}

/// At least six characters and not already taken.
///
/// The length rule is checked first so short names never reach the store.
///
/// # Errors
///
/// Propagates the store's error if the uniqueness lookup fails.
pub async fn username_meets_requirements(
    username: &str,
    store: &dyn AccountStore,
) -> Result<bool, StoreError> {
    if username.chars().count() < MIN_USERNAME_LEN {
        return Ok(false);
    }
    Ok(!store.account_exists(username).await?)
}

/// `local@domain.tld`, with one or more dot-separated labels after the domain.
pub fn email_meets_requirements(email: &str) -> bool {
    EMAIL.is_match(email)
}

pub fn personal_code_meets_requirements(code: i64) -> bool {
    PERSONAL_CODE_RANGE.0 < code && code < PERSONAL_CODE_RANGE.1
}

pub fn phone_number_meets_requirements(number: i64) -> bool {
    PHONE_NUMBER_RANGE.0 < number && number < PHONE_NUMBER_RANGE.1
}

/// Parse a numeric field. Surrounding whitespace is ignored.
pub fn parse_numeric(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

/// True iff no string field of the request is blank.
pub fn request_fields_non_empty<R: RequestFields>(request: &R) -> bool {
    request
        .string_fields()
        .iter()
        .all(|field| !field.trim().is_empty())
}

/// Personal details after numeric parsing, ready for the composite check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalDetailsInput {
    pub name: String,
    pub last_name: String,
    pub personal_code: i64,
    pub phone_number: i64,
    pub email_address: String,
}

impl PersonalDetailsInput {
    /// Parse the numeric fields of a creation request.
    ///
    /// Returns `None` if the personal code or phone number is not an integer.
    pub fn parse(request: &CreatePersonalDetailsRequest) -> Option<Self> {
        Some(Self {
            name: request.name.clone(),
            last_name: request.last_name.clone(),
            personal_code: parse_numeric(&request.personal_code)?,
            phone_number: parse_numeric(&request.phone_number)?,
            email_address: request.email_address.clone(),
        })
    }

    /// Email format, personal code range, and phone range all hold.
    pub fn meets_requirements(&self) -> bool {
        email_meets_requirements(&self.email_address)
            && personal_code_meets_requirements(self.personal_code)
            && phone_number_meets_requirements(self.phone_number)
    }
}
