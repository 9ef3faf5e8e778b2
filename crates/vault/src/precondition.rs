//! Progressive-disclosure guard: which tier operations are legal in which state.
//!
//! [`check`] is the single place tier managers consult before doing any work.

use common::VaultError;

use crate::model::{Account, Disclosure};

/// Disclosure state of an account, derived from which tiers exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisclosureState {
    /// No personal details.
    AccountOnly,
    /// Personal details, no address.
    Personal,
    /// Personal details and address.
    PersonalAndAddress,
}

impl From<&Disclosure> for DisclosureState {
    fn from(disclosure: &Disclosure) -> Self {
        match disclosure {
            Disclosure::NoPersonal => DisclosureState::AccountOnly,
            Disclosure::PersonalOnly(_) => DisclosureState::Personal,
            Disclosure::PersonalAndAddress(..) => DisclosureState::PersonalAndAddress,
        }
    }
}

impl Account {
    pub fn state(&self) -> DisclosureState {
        DisclosureState::from(&self.disclosure)
    }
}

/// Tier operations subject to a state guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierOperation {
    CreatePersonal,
    CreateAddress,
    UpdatePersonalField,
    UpdateAddressField,
    ReadView,
}

/// A rejected operation: the caller-facing status and message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreconditionViolation {
    pub status: u16,
    pub message: &'static str,
}

impl From<PreconditionViolation> for VaultError {
    fn from(v: PreconditionViolation) -> Self {
        VaultError::Precondition {
            status: v.status,
            message: v.message.to_owned(),
        }
    }
}

pub const PERSONAL_ALREADY_EXISTS: PreconditionViolation = PreconditionViolation {
    status: 400,
    message: "Personal details already exist",
};

pub const PERSONAL_REQUIRED_FOR_ADDRESS: PreconditionViolation = PreconditionViolation {
    status: 404,
    message: "You have to add personal details first, in order to add address details",
};

pub const ADDRESS_ALREADY_EXISTS: PreconditionViolation = PreconditionViolation {
    status: 400,
    message: "Address details already exist",
};

pub const PERSONAL_REQUIRED_FOR_UPDATE: PreconditionViolation = PreconditionViolation {
    status: 404,
    message: "You have to add personal details first, in order to update specific fields",
};

pub const PERSONAL_AND_ADDRESS_REQUIRED_FOR_UPDATE: PreconditionViolation = PreconditionViolation {
    status: 404,
    message: "You have to add personal details first and then address details, in order to update specific fields",
};

pub const ADDRESS_REQUIRED_FOR_UPDATE: PreconditionViolation = PreconditionViolation {
    status: 400,
    message: "You have to add address details first, in order to update specific fields",
};

/// Decide whether `operation` is legal in `state`.
///
/// # Errors
///
/// Returns the [`PreconditionViolation`] to hand back to the caller.
pub fn check(state: DisclosureState, operation: TierOperation) -> Result<(), PreconditionViolation> {
    use DisclosureState::*;
    use TierOperation::*;

    match (operation, state) {
        (CreatePersonal, AccountOnly) => Ok(()),
        (CreatePersonal, Personal | PersonalAndAddress) => Err(PERSONAL_ALREADY_EXISTS),

        (CreateAddress, AccountOnly) => Err(PERSONAL_REQUIRED_FOR_ADDRESS),
        (CreateAddress, Personal) => Ok(()),
        (CreateAddress, PersonalAndAddress) => Err(ADDRESS_ALREADY_EXISTS),

        (UpdatePersonalField, AccountOnly) => Err(PERSONAL_REQUIRED_FOR_UPDATE),
        (UpdatePersonalField, Personal | PersonalAndAddress) => Ok(()),

        (UpdateAddressField, AccountOnly) => Err(PERSONAL_AND_ADDRESS_REQUIRED_FOR_UPDATE),
        (UpdateAddressField, Personal) => Err(ADDRESS_REQUIRED_FOR_UPDATE),
        (UpdateAddressField, PersonalAndAddress) => Ok(()),

        (ReadView, _) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use DisclosureState::*;
    use TierOperation::*;

    #[test]
    fn create_personal_only_from_account_only() {
        assert!(check(AccountOnly, CreatePersonal).is_ok());
        assert_eq!(check(Personal, CreatePersonal), Err(PERSONAL_ALREADY_EXISTS));
        assert_eq!(
            check(PersonalAndAddress, CreatePersonal),
            Err(PERSONAL_ALREADY_EXISTS)
        );
    }

    #[test]
    fn create_address_requires_personal_without_address() {
        let err = check(AccountOnly, CreateAddress).unwrap_err();
        assert_eq!(err.status, 404);
        assert!(check(Personal, CreateAddress).is_ok());
        let err = check(PersonalAndAddress, CreateAddress).unwrap_err();
        assert_eq!(err.status, 400);
        assert_eq!(err.message, "Address details already exist");
    }

    #[test]
    fn personal_updates_need_personal_tier() {
        assert_eq!(
            check(AccountOnly, UpdatePersonalField).unwrap_err().status,
            404
        );
        assert!(check(Personal, UpdatePersonalField).is_ok());
        assert!(check(PersonalAndAddress, UpdatePersonalField).is_ok());
    }

    #[test]
    fn address_updates_need_both_tiers() {
        let err = check(AccountOnly, UpdateAddressField).unwrap_err();
        assert_eq!(err.status, 404);
        assert!(err.message.starts_with("You have to add personal details first"));

        let err = check(Personal, UpdateAddressField).unwrap_err();
        assert_eq!(err.status, 400);
        assert!(err.message.contains("add address details first"));

        assert!(check(PersonalAndAddress, UpdateAddressField).is_ok());
    }

    #[test]
    fn views_always_allowed() {
        for state in [AccountOnly, Personal, PersonalAndAddress] {
            assert!(check(state, ReadView).is_ok());
        }
    }

    #[test]
    fn violation_converts_to_vault_error() {
        let err: VaultError = ADDRESS_REQUIRED_FOR_UPDATE.into();
        assert_eq!(err.http_status(), 400);
        assert_eq!(err.public_message(), ADDRESS_REQUIRED_FOR_UPDATE.message);
    }
}
