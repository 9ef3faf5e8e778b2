//! AES-256-GCM-SIV encryption and decryption of individual string fields.
//!
//! **Algorithm choice:** AES-256-GCM-SIV (RFC 8452) is nonce-misuse-resistant.
//! In [`NonceMode::Static`] every field is sealed under the configured IV, so
//! identical plaintexts produce identical blobs; this leaks equality and
//! nothing else. [`NonceMode::Random`] draws a fresh nonce per field.
//!
//! **Do NOT substitute plain AES-256-GCM with a fixed nonce.** GCM nonce reuse
//! breaks both confidentiality and authentication.

use aes_gcm_siv::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng},
    Aes256GcmSiv, Nonce,
};
use thiserror::Error;

use super::key::KeyMaterial;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM-SIV nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key is the wrong length (must be [`KEY_LEN`] bytes).
    #[error("invalid key length: expected {KEY_LEN} bytes")]
    InvalidKeyLength,

    /// The blob cannot hold a nonce and a tag.
    #[error("ciphertext blob too short: {0} bytes")]
    Truncated(usize),

    /// AES-GCM-SIV encryption or decryption failed.
    #[error("aead operation failed")]
    AeadFailure,

    /// Authentication passed but the plaintext is not UTF-8.
    #[error("decrypted field is not valid UTF-8")]
    InvalidUtf8,
}

/// How the nonce for each sealed field is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceMode {
    /// Fresh OS-random nonce per field.
    Random,
    /// The configured IV for every field; encryption is deterministic.
    Static([u8; NONCE_LEN]),
}

/// Field-level encryption engine.
///
/// Built once at startup and shared read-only (behind an `Arc`) by every
/// tier manager; no interior mutability.
///
/// Blob layout: `nonce (12) || ciphertext || tag (16)`.
pub struct FieldCipher {
    cipher: Aes256GcmSiv,
    mode: NonceMode,
}

impl FieldCipher {
    /// Build the engine from decoded key material.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyLength`] if the key is not [`KEY_LEN`] bytes.
    pub fn new(key: &KeyMaterial, mode: NonceMode) -> Result<Self, CipherError> {
        let cipher = Aes256GcmSiv::new_from_slice(key.expose())
            .map_err(|_| CipherError::InvalidKeyLength)?;
        Ok(Self { cipher, mode })
    }

    /// Seal a UTF-8 string into an opaque blob.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::AeadFailure`] on an internal AEAD error (only
    /// reachable for plaintexts beyond the AEAD length limit).
    pub fn encrypt(&self, plaintext: &str) -> Result<Vec<u8>, CipherError> {
        let nonce_bytes = match self.mode {
            NonceMode::Random => {
                let mut nonce = [0u8; NONCE_LEN];
                OsRng.fill_bytes(&mut nonce);
                nonce
            }
            NonceMode::Static(iv) => iv,
        };

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|_| CipherError::AeadFailure)?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);
        Ok(blob)
    }

    /// Open a blob produced by [`FieldCipher::encrypt`].
    ///
    /// The nonce is read from the blob, so blobs sealed in either nonce mode
    /// can be opened regardless of the current mode.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Truncated`] for blobs shorter than nonce + tag,
    /// [`CipherError::AeadFailure`] if authentication fails (wrong key or
    /// tampered data), and [`CipherError::InvalidUtf8`] otherwise.
    pub fn decrypt(&self, blob: &[u8]) -> Result<String, CipherError> {
        if blob.len() < NONCE_LEN + TAG_LEN {
            return Err(CipherError::Truncated(blob.len()));
        }
        let (nonce, ciphertext) = blob.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CipherError::AeadFailure)?;
        String::from_utf8(plaintext).map_err(|_| CipherError::InvalidUtf8)
    }
}

impl std::fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self.mode {
            NonceMode::Random => "Random",
            NonceMode::Static(_) => "Static",
        };
        f.debug_struct("FieldCipher")
            .field("cipher", &"[REDACTED]")
            .field("mode", &mode)
            .finish()
    }
}
