//! Admin authentication primitives
//!
//! The admin password is never stored or compared in clear: configuration
//! holds its SHA-256 digest and login attempts are digested before
//! comparison. A successful login yields an [`AdminSession`], a capability
//! with a sliding expiry that handlers receive explicitly.
//!
//! # Pure Functions
//!
//! This module has no HTTP framework dependencies. The service wraps these
//! with its own middleware and session registry.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::ids;

/// Default idle lifetime of an admin session
pub const DEFAULT_SESSION_TTL_SECS: u64 = 8 * 60 * 60;

/// Longest accepted idle lifetime (30 days); longer values are clamped
pub const MAX_SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Authentication error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiAuthError {
    /// No admin password configured, console is locked
    NotConfigured,

    /// Password digest mismatch
    InvalidPassword,

    /// Authorization header missing or malformed
    MissingToken,

    /// Token unknown or revoked
    UnknownToken,

    /// Token known but past its expiry
    Expired { expired_at: DateTime<Utc> },
}

impl std::fmt::Display for ApiAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiAuthError::NotConfigured => write!(f, "Admin password not configured"),
            ApiAuthError::InvalidPassword => write!(f, "Invalid password"),
            ApiAuthError::MissingToken => write!(f, "Missing bearer token"),
            ApiAuthError::UnknownToken => write!(f, "Unknown session token"),
            ApiAuthError::Expired { expired_at } => {
                write!(f, "Session expired at {}", expired_at.to_rfc3339())
            }
        }
    }
}

impl std::error::Error for ApiAuthError {}

// ========================================
// Password digests
// ========================================

/// Hex SHA-256 of a password
///
/// # Examples
///
/// ```
/// use arlab_common::api::auth::password_digest;
///
/// let digest = password_digest("secret");
/// assert_eq!(digest.len(), 64);
/// ```
pub fn password_digest(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check a login attempt against the configured digest
///
/// Comparison runs over the full digest length regardless of where the
/// first mismatch occurs.
pub fn verify_password(attempt: &str, expected_digest: &str) -> Result<(), ApiAuthError> {
    let attempt_digest = password_digest(attempt);
    let expected = expected_digest.trim().to_ascii_lowercase();

    if attempt_digest.len() != expected.len() {
        return Err(ApiAuthError::InvalidPassword);
    }

    let diff = attempt_digest
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b));

    if diff == 0 {
        Ok(())
    } else {
        Err(ApiAuthError::InvalidPassword)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` value
pub fn parse_bearer(header_value: &str) -> Result<&str, ApiAuthError> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ApiAuthError::MissingToken)
}

// ========================================
// Sessions
// ========================================

/// Authenticated admin capability
#[derive(Debug, Clone, Serialize)]
pub struct AdminSession {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(skip)]
    ttl: Duration,
}

impl AdminSession {
    /// Issue a new session starting at `now`
    ///
    /// `ttl_secs` is clamped to [`MAX_SESSION_TTL_SECS`].
    pub fn issue(now: DateTime<Utc>, ttl_secs: u64) -> Self {
        let ttl = Duration::seconds(ttl_secs.min(MAX_SESSION_TTL_SECS) as i64);
        Self {
            token: ids::session_token(),
            issued_at: now,
            expires_at: slide(now, ttl),
            ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Validate at `now` and slide the expiry forward
    pub fn renew(&mut self, now: DateTime<Utc>) -> Result<(), ApiAuthError> {
        if self.is_expired(now) {
            return Err(ApiAuthError::Expired {
                expired_at: self.expires_at,
            });
        }
        self.expires_at = slide(now, self.ttl);
        Ok(())
    }
}

fn slide(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

// ========================================
// Tests
// ========================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_digest_is_stable_hex() {
        let a = password_digest("admin123");
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, password_digest("admin123"));
        assert_ne!(a, password_digest("admin124"));
    }

    #[test]
    fn test_verify_password() {
        let digest = password_digest("admin123");
        assert!(verify_password("admin123", &digest).is_ok());
        assert!(verify_password("admin123", &digest.to_uppercase()).is_ok());
        assert_eq!(
            verify_password("wrong", &digest),
            Err(ApiAuthError::InvalidPassword)
        );
        assert_eq!(
            verify_password("admin123", "short"),
            Err(ApiAuthError::InvalidPassword)
        );
    }

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer("Bearer abc"), Ok("abc"));
        assert_eq!(parse_bearer("Bearer "), Err(ApiAuthError::MissingToken));
        assert_eq!(parse_bearer("Basic abc"), Err(ApiAuthError::MissingToken));
    }

    #[test]
    fn test_session_renewal_slides_expiry() {
        let start = Utc::now();
        let mut session = AdminSession::issue(start, 60);
        assert_eq!(session.expires_at, start + Duration::seconds(60));

        let later = start + Duration::seconds(45);
        session.renew(later).unwrap();
        assert_eq!(session.expires_at, later + Duration::seconds(60));
        assert_eq!(session.issued_at, start);
    }

    #[test]
    fn test_expired_session_cannot_renew() {
        let start = Utc::now();
        let mut session = AdminSession::issue(start, 60);

        let err = session.renew(start + Duration::seconds(60)).unwrap_err();
        assert!(matches!(err, ApiAuthError::Expired { .. }));
    }

    #[test]
    fn test_oversized_ttl_is_clamped() {
        let start = Utc::now();
        let max = Duration::seconds(MAX_SESSION_TTL_SECS as i64);

        for ttl_secs in [100_000_000_000_000_000, u64::MAX] {
            let mut session = AdminSession::issue(start, ttl_secs);
            assert_eq!(session.expires_at, start + max);
            assert!(!session.is_expired(start));

            let later = start + Duration::seconds(10);
            session.renew(later).unwrap();
            assert_eq!(session.expires_at, later + max);
        }
    }
}
