//! Salted HMAC-SHA256 password hashing.

use aes_gcm_siv::aead::{rand_core::RngCore, OsRng};
use hmac::{digest::InvalidLength, Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Byte length of a freshly generated salt (the HMAC-SHA256 block size).
pub const SALT_LEN: usize = 64;

/// Password hash and the salt it was keyed with.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub hash: Vec<u8>,
    pub salt: Vec<u8>,
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordHash([REDACTED])")
    }
}

/// Hash `password` under a new random salt.
pub fn hash_password(password: &str) -> Result<PasswordHash, InvalidLength> {
    let mut salt = vec![0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let mut mac = HmacSha256::new_from_slice(&salt)?;
    mac.update(password.as_bytes());
    Ok(PasswordHash {
        hash: mac.finalize().into_bytes().to_vec(),
        salt,
    })
}

/// Constant-time check of `password` against a stored hash and salt.
pub fn verify_password(password: &str, hash: &[u8], salt: &[u8]) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(salt) else {
        return false;
    };
    mac.update(password.as_bytes());
    mac.verify_slice(hash).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_original_password() {
        let stored = hash_password("Abcdef1!").unwrap();
        assert_eq!(stored.salt.len(), SALT_LEN);
        assert!(verify_password("Abcdef1!", &stored.hash, &stored.salt));
        assert!(!verify_password("abcdef1!", &stored.hash, &stored.salt));
    }

    #[test]
    fn salts_differ_per_hash() {
        let a = hash_password("Abcdef1!").unwrap();
        let b = hash_password("Abcdef1!").unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn debug_hides_hash() {
        let stored = hash_password("Abcdef1!").unwrap();
        assert_eq!(format!("{stored:?}"), "PasswordHash([REDACTED])");
    }
}
