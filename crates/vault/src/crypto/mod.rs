//! Field encryption, view composition, and password hashing.
//!
//! This module is intentionally free of storage and HTTP dependencies.
//!
//! # Ciphertext format
//!
//! ```text
//! nonce (12 bytes) || AES-256-GCM-SIV ciphertext || tag (16 bytes)
//! ```
//!
//! Blobs are raw bytes; they are never interpreted except by
//! [`FieldCipher::decrypt`].

pub mod cipher;
pub mod key;
pub mod password;
pub mod records;

pub use cipher::{CipherError, FieldCipher, NonceMode};
pub use key::{decode_iv, KeyMaterial};
