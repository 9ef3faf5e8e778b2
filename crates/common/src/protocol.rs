//! Request, response, and view types exchanged with the boundary layer.
//!
//! These types are serialised as JSON over the HTTP API. Plaintext PII only
//! ever appears in request bodies and in [`UserView`]; it is never persisted
//! in this form.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::VaultError;

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// Role tag carried by every account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    User,
    Administrator,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => f.write_str("User"),
            Role::Administrator => f.write_str("Administrator"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" => Ok(Role::User),
            "Administrator" => Ok(Role::Administrator),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Write results
// ---------------------------------------------------------------------------

/// Uniform result of every write operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub is_success: bool,
    pub status_code: u16,
    pub message: String,
}

impl ActionResponse {
    /// A successful outcome with the given status and message.
    pub fn success(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            is_success: true,
            status_code,
            message: message.into(),
        }
    }

    /// A failed outcome with the given status and message.
    pub fn failure(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            is_success: false,
            status_code,
            message: message.into(),
        }
    }

    /// Render an error for the caller. Internal failures are masked.
    pub fn from_error(err: &VaultError) -> Self {
        Self::failure(err.http_status(), err.public_message())
    }
}

/// Result of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub is_success: bool,
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl LoginResponse {
    pub fn success(id: Uuid, role: Role) -> Self {
        Self {
            is_success: true,
            status_code: 200,
            error_message: None,
            id: Some(id),
            role: Some(role),
        }
    }

    pub fn from_error(err: &VaultError) -> Self {
        Self {
            is_success: false,
            status_code: err.http_status(),
            error_message: Some(err.public_message()),
            id: None,
            role: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Read views
// ---------------------------------------------------------------------------

/// Decrypted read-side composite of an account.
///
/// `personal` is absent for the minimal view; `address` is absent for the
/// minimal and partial views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub username: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal: Option<PersonalView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<AddressView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalView {
    pub name: String,
    pub last_name: String,
    pub personal_code: String,
    pub phone_number: String,
    pub email_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressView {
    pub country: String,
    pub city: String,
    pub street: String,
    pub house_number: String,
    pub apartment_number: String,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Explicit list of the string-typed fields of a request shape.
///
/// Used by the boundary layer to reject requests with blank fields before
/// they reach a tier manager.
pub trait RequestFields {
    fn string_fields(&self) -> Vec<&str>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub password: String,
}

impl RequestFields for RegisterUserRequest {
    fn string_fields(&self) -> Vec<&str> {
        vec![&self.username, &self.password]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl RequestFields for LoginRequest {
    fn string_fields(&self) -> Vec<&str> {
        vec![&self.username, &self.password]
    }
}

/// Request body for personal details creation.
///
/// `picture` carries the raw image file, base64-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePersonalDetailsRequest {
    pub name: String,
    pub last_name: String,
    pub personal_code: String,
    pub phone_number: String,
    pub email_address: String,
    pub picture: String,
}

impl RequestFields for CreatePersonalDetailsRequest {
    fn string_fields(&self) -> Vec<&str> {
        vec![
            &self.name,
            &self.last_name,
            &self.personal_code,
            &self.phone_number,
            &self.email_address,
            &self.picture,
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAddressDetailsRequest {
    pub country: String,
    pub city: String,
    pub street: String,
    pub house_number: String,
    pub apartment_number: String,
}

impl RequestFields for CreateAddressDetailsRequest {
    fn string_fields(&self) -> Vec<&str> {
        vec![
            &self.country,
            &self.city,
            &self.street,
            &self.house_number,
            &self.apartment_number,
        ]
    }
}

/// Request body for every single-field update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldUpdateRequest {
    pub value: String,
}

impl RequestFields for FieldUpdateRequest {
    fn string_fields(&self) -> Vec<&str> {
        vec![&self.value]
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` while the store answers, `degraded` otherwise.
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_view_omits_tiers() {
        let view = UserView {
            username: "alice01".into(),
            role: Role::User,
            personal: None,
            address: None,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["username"], "alice01");
        assert_eq!(json["role"], "User");
        assert!(json.get("personal").is_none());
        assert!(json.get("address").is_none());
    }

    #[test]
    fn action_response_from_error_masks_internal() {
        let resp = ActionResponse::from_error(&VaultError::Persistence("disk full".into()));
        assert!(!resp.is_success);
        assert_eq!(resp.status_code, 500);
        assert!(!resp.message.contains("disk full"));
    }

    #[test]
    fn login_response_carries_role() {
        let id = Uuid::new_v4();
        let resp = LoginResponse::success(id, Role::Administrator);
        assert_eq!(resp.id, Some(id));
        assert_eq!(resp.role, Some(Role::Administrator));
    }

    #[test]
    fn role_parses_from_header_value() {
        assert_eq!("Administrator".parse::<Role>(), Ok(Role::Administrator));
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn address_request_lists_every_field() {
        let req = CreateAddressDetailsRequest {
            country: "Lithuania".into(),
            city: "Vilnius".into(),
            street: "Gedimino pr.".into(),
            house_number: "1".into(),
            apartment_number: "".into(),
        };
        assert_eq!(req.string_fields().len(), 5);
        assert!(req.string_fields().contains(&""));
    }
}
