//! [`KeyMaterial`]: the process-wide field encryption key, decoded once at startup.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use super::cipher::{KEY_LEN, NONCE_LEN};

/// Errors produced while decoding configured key material.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The configured value is not valid base64.
    #[error("{0} is not valid base64")]
    InvalidBase64(&'static str),

    /// The decoded value has an unexpected length.
    #[error("{what} has invalid length: expected {expected} bytes, got {got}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        got: usize,
    },
}

/// Fixed-size key buffer that holds exactly [`KEY_LEN`] bytes.
///
/// When this type is dropped, the memory is overwritten with zeroes to
/// minimise the window during which plaintext key material lives in RAM.
pub struct KeyMaterial(Box<[u8; KEY_LEN]>);

impl KeyMaterial {
    /// Decode a base64-encoded AES-256 key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidBase64`] or [`KeyError::InvalidLength`].
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| KeyError::InvalidBase64("ENCRYPTION_KEY"))?;
        Self::from_bytes(&bytes)
    }

    /// Copy raw key bytes into a new buffer.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != KEY_LEN {
            return Err(KeyError::InvalidLength {
                what: "ENCRYPTION_KEY",
                expected: KEY_LEN,
                got: bytes.len(),
            });
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    pub fn expose(&self) -> &[u8] {
        &self.0[..]
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        // Zero the key material on drop.
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material, not even in debug builds.
        f.write_str("KeyMaterial([REDACTED])")
    }
}

/// Decode a base64-encoded 96-bit IV for static nonce mode.
///
/// # Errors
///
/// Returns [`KeyError::InvalidBase64`] or [`KeyError::InvalidLength`].
pub fn decode_iv(encoded: &str) -> Result<[u8; NONCE_LEN], KeyError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|_| KeyError::InvalidBase64("ENCRYPTION_IV"))?;
    if bytes.len() != NONCE_LEN {
        return Err(KeyError::InvalidLength {
            what: "ENCRYPTION_IV",
            expected: NONCE_LEN,
            got: bytes.len(),
        });
    }
    let mut iv = [0u8; NONCE_LEN];
    iv.copy_from_slice(&bytes);
    Ok(iv)
}
