//! Admin session registry and authentication middleware
//!
//! Login trades the admin password for a bearer token. Protected routes
//! run behind [`auth_middleware`], which validates the token, slides its
//! expiry, and hands the [`AdminSession`] to handlers as a request
//! extension.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use arlab_common::api::auth::{parse_bearer, verify_password, AdminSession, ApiAuthError};
use arlab_common::api::types::ErrorResponse;

use crate::AppState;

/// In-memory admin sessions keyed by token
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, AdminSession>>>,
    /// Hex SHA-256 of the admin password; `None` locks the console
    password_digest: Option<String>,
    ttl_secs: u64,
}

impl SessionRegistry {
    pub fn new(password_digest: Option<String>, ttl_secs: u64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            password_digest,
            ttl_secs,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.password_digest.is_some()
    }

    pub async fn login(&self, password: &str) -> Result<AdminSession, ApiAuthError> {
        self.login_at(password, Utc::now()).await
    }

    pub async fn login_at(
        &self,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<AdminSession, ApiAuthError> {
        let digest = self
            .password_digest
            .as_deref()
            .ok_or(ApiAuthError::NotConfigured)?;
        verify_password(password, digest)?;

        let session = AdminSession::issue(now, self.ttl_secs);
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| !s.is_expired(now));
        sessions.insert(session.token.clone(), session.clone());
        info!(expires_at = %session.expires_at, active = sessions.len(), "Admin session issued");
        Ok(session)
    }

    /// Validate `token` and renew its expiry
    pub async fn authenticate(&self, token: &str) -> Result<AdminSession, ApiAuthError> {
        self.authenticate_at(token, Utc::now()).await
    }

    pub async fn authenticate_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AdminSession, ApiAuthError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(token).ok_or(ApiAuthError::UnknownToken)?;

        if let Err(e) = session.renew(now) {
            sessions.remove(token);
            return Err(e);
        }
        Ok(session.clone())
    }

    /// Revoke `token`; returns whether it was active
    pub async fn logout(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Authentication middleware for admin routes
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError(ApiAuthError::MissingToken))?;
    let token = parse_bearer(header)?;

    let session = state.sessions.authenticate(token).await.map_err(|e| {
        warn!(error = %e, path = %request.uri().path(), "Rejected admin request");
        AuthError(e)
    })?;
    debug!(expires_at = %session.expires_at, "Admin session renewed");

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Authentication failure as an HTTP response
#[derive(Debug)]
pub struct AuthError(pub ApiAuthError);

impl From<ApiAuthError> for AuthError {
    fn from(e: ApiAuthError) -> Self {
        AuthError(e)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match self.0 {
            ApiAuthError::NotConfigured => (StatusCode::SERVICE_UNAVAILABLE, "ADMIN_DISABLED"),
            ApiAuthError::InvalidPassword => (StatusCode::UNAUTHORIZED, "INVALID_PASSWORD"),
            ApiAuthError::MissingToken | ApiAuthError::UnknownToken => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
            }
            ApiAuthError::Expired { .. } => (StatusCode::UNAUTHORIZED, "SESSION_EXPIRED"),
        };

        let body = Json(json!({
            "error": ErrorResponse::new(code, self.0.to_string()),
        }));

        (status, body).into_response()
    }
}
