//! Structured logging and optional OTLP span export.
//!
//! # Telemetry invariants
//!
//! - **No PII, passwords or key material** may appear in any span attribute
//!   or log field. Spans carry the account id and operation name only.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`).

pub mod init;

pub use init::init_telemetry;
