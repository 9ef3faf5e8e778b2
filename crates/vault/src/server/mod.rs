//! Axum HTTP server, routing, and middleware.
//!
//! # Responsibilities
//! - Define the Axum router with all routes and shared middleware.
//! - Resolve the caller identity forwarded by the upstream authenticator.
//! - Inject shared application state (`AppState`) into handlers.

pub mod caller;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
