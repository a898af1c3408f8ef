//! Marker descriptor configuration endpoints

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use tracing::{error, info};

use arlab_common::{LabConfig, LabKey};

use super::assets::read_file;
use crate::error::{ApiError, ApiResult};
use crate::storage::{marker_object_path, Bucket};
use crate::AppState;

/// GET /api/lab-configs
///
/// Only keys with an uploaded marker are listed; the rest use the demo
/// marker.
pub async fn list_lab_configs(State(state): State<AppState>) -> ApiResult<Json<Vec<LabConfig>>> {
    Ok(Json(state.lab_configs.list_all().await?))
}

/// POST /api/lab-configs/:key/marker
///
/// Multipart body with a single `marker` file. The key is `Global` or a
/// laboratory display name.
pub async fn upload_marker(
    State(state): State<AppState>,
    Path(key): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<Json<LabConfig>> {
    let key: LabKey = key.parse()?;

    let mut marker = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some("marker") {
            marker = read_file(field).await?;
        }
    }
    let marker = marker.ok_or_else(|| ApiError::BadRequest("Marker file required".into()))?;

    let path = marker_object_path(key, &marker.file_name);
    let marker_url = state
        .objects
        .upload(Bucket::Configs, &path, marker.bytes, marker.content_type.as_deref())
        .await
        .map_err(|e| {
            error!(key = %key, error = %e, "Marker upload failed");
            ApiError::Upload(e.to_string())
        })?;

    state.lab_configs.upsert(key, &marker_url).await?;
    info!(key = %key, path = %path, "Marker descriptor uploaded");

    Ok(Json(LabConfig {
        lab_name: key,
        marker_url: Some(marker_url),
    }))
}
