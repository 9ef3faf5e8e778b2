//! Configuration loading and validation for the vault service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::crypto::{decode_iv, FieldCipher, KeyMaterial, NonceMode};

/// Validated vault service configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Base64 of the 32-byte field encryption key. **Required.**
    pub encryption_key: String,

    /// Base64 of the 12-byte nonce used when `nonce_mode` is `static`.
    #[serde(default)]
    pub encryption_iv: Option<String>,

    /// `random` (fresh nonce per blob) or `static` (deterministic blobs).
    #[serde(default = "default_nonce_mode")]
    pub nonce_mode: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// OTLP collector endpoint. Spans are only exported when set.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("encryption_key", &"[REDACTED]")
            .field("encryption_iv", &self.encryption_iv.as_ref().map(|_| "[REDACTED]"))
            .field("nonce_mode", &self.nonce_mode)
            .field("listen_port", &self.listen_port)
            .field("otel_exporter_otlp_endpoint", &self.otel_exporter_otlp_endpoint)
            .field("log_level", &self.log_level)
            .finish()
    }
}

fn default_nonce_mode() -> String {
    "random".into()
}
fn default_listen_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.encryption_key, "ENCRYPTION_KEY")?;
        KeyMaterial::from_base64(&self.encryption_key).context("ENCRYPTION_KEY is invalid")?;
        self.nonce_mode()?;
        if self.listen_port == 0 {
            anyhow::bail!("LISTEN_PORT must be > 0");
        }
        Ok(())
    }

    /// Nonce strategy selected by `NONCE_MODE`, with the IV resolved.
    pub fn nonce_mode(&self) -> Result<NonceMode> {
        match self.nonce_mode.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(NonceMode::Random),
            "static" => {
                let iv = self
                    .encryption_iv
                    .as_deref()
                    .filter(|v| !v.trim().is_empty())
                    .context("ENCRYPTION_IV is required when NONCE_MODE is static")?;
                Ok(NonceMode::Static(
                    decode_iv(iv).context("ENCRYPTION_IV is invalid")?,
                ))
            }
            other => anyhow::bail!("NONCE_MODE must be `random` or `static`, got `{other}`"),
        }
    }

    /// Build the field cipher from the configured key and nonce mode.
    pub fn build_cipher(&self) -> Result<FieldCipher> {
        let key = KeyMaterial::from_base64(&self.encryption_key)
            .context("ENCRYPTION_KEY is invalid")?;
        FieldCipher::new(&key, self.nonce_mode()?).context("failed to initialise field cipher")
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
