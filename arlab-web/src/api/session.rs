//! Admin login and logout

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use tracing::{info, warn};

use arlab_common::api::auth::AdminSession;
use arlab_common::api::types::{LoginRequest, LoginResponse};

use super::auth::AuthError;
use crate::AppState;

/// POST /api/session
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let session = state.sessions.login(&request.password).await.map_err(|e| {
        warn!(error = %e, "Admin login failed");
        AuthError(e)
    })?;

    Ok(Json(LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
    }))
}

/// DELETE /api/session
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
) -> StatusCode {
    state.sessions.logout(&session.token).await;
    info!("Admin session revoked");
    StatusCode::NO_CONTENT
}
