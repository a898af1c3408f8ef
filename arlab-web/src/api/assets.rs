//! Asset administration endpoints

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::{error, info};

use arlab_common::{Asset, Laboratory};

use crate::error::{ApiError, ApiResult};
use crate::storage::{asset_object_path, Bucket};
use crate::AppState;

/// One file part of a multipart form
#[derive(Debug)]
pub(crate) struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Photo or video given either as a file to upload or an existing URL
#[derive(Debug)]
enum MediaSource {
    File(UploadedFile),
    Url(String),
}

/// Raw fields of the create-asset form
#[derive(Debug, Default)]
struct AssetForm {
    lab: Option<String>,
    title: Option<String>,
    image: Option<UploadedFile>,
    image_url: Option<String>,
    video: Option<UploadedFile>,
    video_url: Option<String>,
}

/// Validated create-asset request
#[derive(Debug)]
struct NewAsset {
    lab: Laboratory,
    title: String,
    image: MediaSource,
    video: MediaSource,
}

const MISSING_FIELDS: &str = "Por favor completa todos los campos o selecciona archivos.";

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AssetForm {
    fn validate(self) -> ApiResult<NewAsset> {
        let lab = non_blank(self.lab)
            .ok_or_else(|| ApiError::BadRequest(MISSING_FIELDS.into()))?
            .parse::<Laboratory>()?;
        let title = non_blank(self.title).ok_or_else(|| ApiError::BadRequest(MISSING_FIELDS.into()))?;

        // A selected file takes precedence over a pasted URL
        let image = self
            .image
            .map(MediaSource::File)
            .or_else(|| non_blank(self.image_url).map(MediaSource::Url))
            .ok_or_else(|| ApiError::BadRequest(MISSING_FIELDS.into()))?;
        let video = self
            .video
            .map(MediaSource::File)
            .or_else(|| non_blank(self.video_url).map(MediaSource::Url))
            .ok_or_else(|| ApiError::BadRequest(MISSING_FIELDS.into()))?;

        Ok(NewAsset {
            lab,
            title,
            image,
            video,
        })
    }
}

/// Read a file part; browsers send an empty part when no file was picked
pub(crate) async fn read_file(
    field: axum::extract::multipart::Field<'_>,
) -> ApiResult<Option<UploadedFile>> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().map(str::to_string);
    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid upload: {}", e)))?;

    if bytes.is_empty() && file_name.is_empty() {
        return Ok(None);
    }
    Ok(Some(UploadedFile {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    }))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> ApiResult<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid form field: {}", e)))
}

async fn read_form(mut multipart: Multipart) -> ApiResult<AssetForm> {
    let mut form = AssetForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "lab" => form.lab = Some(read_text(field).await?),
            "title" => form.title = Some(read_text(field).await?),
            "imageUrl" => form.image_url = Some(read_text(field).await?),
            "videoUrl" => form.video_url = Some(read_text(field).await?),
            "image" => form.image = read_file(field).await?,
            "video" => form.video = read_file(field).await?,
            _ => {}
        }
    }
    Ok(form)
}

async fn resolve_media(state: &AppState, source: MediaSource, bucket: Bucket) -> ApiResult<String> {
    match source {
        MediaSource::Url(url) => Ok(url),
        MediaSource::File(file) => {
            let path = asset_object_path(&file.file_name);
            state
                .objects
                .upload(bucket, &path, file.bytes, file.content_type.as_deref())
                .await
                .map_err(|e| {
                    error!(bucket = %bucket, file = %file.file_name, error = %e, "Upload failed");
                    ApiError::Upload(e.to_string())
                })
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AssetListQuery {
    pub lab: Option<String>,
}

/// GET /api/assets
pub async fn list_assets(
    State(state): State<AppState>,
    Query(query): Query<AssetListQuery>,
) -> ApiResult<Json<Vec<Asset>>> {
    let lab = non_blank(query.lab)
        .map(|name| name.parse::<Laboratory>())
        .transpose()?;
    Ok(Json(state.assets.list_for(lab).await))
}

/// POST /api/assets
///
/// Files are uploaded before the record is written, so a failed upload
/// leaves no asset behind.
pub async fn create_asset(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Asset>)> {
    let new_asset = read_form(multipart).await?.validate()?;

    let image_url = resolve_media(&state, new_asset.image, Bucket::Images).await?;
    let video_url = resolve_media(&state, new_asset.video, Bucket::Videos).await?;

    let asset = Asset::new(new_asset.lab, new_asset.title, image_url, video_url);
    state.assets.create(&asset).await?;

    info!(id = %asset.id, lab = %asset.lab, "Asset created from admin console");
    Ok((StatusCode::CREATED, Json(asset)))
}

/// DELETE /api/assets/:id
pub async fn delete_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.assets.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
