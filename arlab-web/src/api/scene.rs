//! Scene descriptions for the scan page

use axum::{
    extract::{Path, State},
    Json,
};

use arlab_common::{LabKey, Laboratory};

use crate::error::{ApiError, ApiResult};
use crate::session::SceneSpec;
use crate::AppState;

/// Scene for a laboratory, or the universal scene for `None`
///
/// The universal scene tracks against the Global marker and binds every
/// asset; a laboratory scene uses that lab's marker and its own assets.
/// Either falls back to the demo marker when no descriptor was uploaded.
pub async fn scene_for(state: &AppState, lab: Option<Laboratory>) -> SceneSpec {
    let key = LabKey::from(lab);
    let marker_url = state.lab_configs.marker_url(key).await;
    let assets = state.assets.list_for(lab).await;
    state.scanner.scene(marker_url, &assets)
}

/// Parse a laboratory path segment; unknown names are 404
pub fn parse_lab(name: &str) -> ApiResult<Laboratory> {
    name.parse()
        .map_err(|_| ApiError::NotFound(format!("Unknown laboratory: {}", name)))
}

/// GET /api/scene
pub async fn get_scene(State(state): State<AppState>) -> Json<SceneSpec> {
    Json(scene_for(&state, None).await)
}

/// GET /api/scene/:lab
pub async fn get_lab_scene(
    State(state): State<AppState>,
    Path(lab): Path<String>,
) -> ApiResult<Json<SceneSpec>> {
    let lab = parse_lab(&lab)?;
    Ok(Json(scene_for(&state, Some(lab)).await))
}
