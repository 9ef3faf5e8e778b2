//! Axum middleware layers applied to the router.
//!
//! Includes request tracing, timeout enforcement, and response compression.

use std::time::Duration;

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest accepted request body. Leaves room for a base64 picture at the
/// upload limit plus the other personal fields.
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;
