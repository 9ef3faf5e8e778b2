//! Common types, protocol definitions, and errors shared across `persona-vault` crates.

pub mod error;
pub mod protocol;

pub use error::VaultError;
