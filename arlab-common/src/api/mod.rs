//! API module for shared HTTP API functionality
//!
//! Contains ONLY pure functions and shared types; the service wraps these
//! with axum middleware and handlers.

pub mod auth;
pub mod types;

pub use auth::{
    parse_bearer, password_digest, verify_password, AdminSession, ApiAuthError,
    DEFAULT_SESSION_TTL_SECS,
};
pub use types::{ErrorResponse, LoginRequest, LoginResponse};
