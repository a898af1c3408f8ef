//! Content stores
//!
//! Two logical tables back the service: `assets` and `lab_configs`. Each is
//! reached through a backend trait so the same stores run against local
//! SQLite or a hosted PostgREST-style backend.
//!
//! - [`AssetStore`] adds the degraded-mode local mirror on top of a backend.
//! - [`LabConfigStore`] is a thin keyed upsert/get layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use arlab_common::{Asset, LabConfig, LabKey, Result};

mod assets;
mod lab_configs;
pub mod mirror;
pub mod rest;
pub mod sqlite;

pub use assets::AssetStore;
pub use lab_configs::LabConfigStore;
pub use mirror::LocalMirror;
pub use rest::RestBackend;
pub use sqlite::SqliteBackend;

/// Storage for asset records
#[async_trait]
pub trait AssetBackend: Send + Sync {
    /// All assets, newest first
    async fn list_assets(&self) -> Result<Vec<Asset>>;

    async fn insert_asset(&self, asset: &Asset) -> Result<()>;

    /// Remove by id; removing an unknown id is not an error
    async fn delete_asset(&self, id: &str) -> Result<()>;
}

/// Storage for marker config rows keyed by [`LabKey`]
#[async_trait]
pub trait LabConfigBackend: Send + Sync {
    async fn get_lab_config(&self, key: LabKey) -> Result<Option<LabConfig>>;

    /// Create or replace the row for `key`
    async fn upsert_lab_config(&self, key: LabKey, marker_url: &str) -> Result<()>;

    async fn list_lab_configs(&self) -> Result<Vec<LabConfig>>;
}

/// Asset as stored (snake_case columns, free-form lab text)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AssetRow {
    pub id: String,
    pub lab: String,
    pub title: String,
    pub image_name: String,
    pub image_url: String,
    pub video_url: String,
}

impl From<&Asset> for AssetRow {
    fn from(asset: &Asset) -> Self {
        Self {
            id: asset.id.clone(),
            lab: asset.lab.name().to_string(),
            title: asset.title.clone(),
            image_name: asset.image_name.clone(),
            image_url: asset.image_url.clone(),
            video_url: asset.video_url.clone(),
        }
    }
}

impl TryFrom<AssetRow> for Asset {
    type Error = arlab_common::Error;

    fn try_from(row: AssetRow) -> Result<Self> {
        Ok(Asset {
            lab: row.lab.parse()?,
            id: row.id,
            title: row.title,
            image_name: row.image_name,
            image_url: row.image_url,
            video_url: row.video_url,
        })
    }
}

/// Marker config as stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LabConfigRow {
    pub lab_name: String,
    pub marker_url: Option<String>,
}

impl TryFrom<LabConfigRow> for LabConfig {
    type Error = arlab_common::Error;

    fn try_from(row: LabConfigRow) -> Result<Self> {
        Ok(LabConfig {
            lab_name: row.lab_name.parse()?,
            marker_url: row.marker_url,
        })
    }
}

/// Convert stored rows, dropping any whose lab is outside the catalogue
pub(crate) fn rows_to_models<R, M>(rows: Vec<R>, table: &str) -> Vec<M>
where
    M: TryFrom<R, Error = arlab_common::Error>,
{
    rows.into_iter()
        .filter_map(|row| match M::try_from(row) {
            Ok(model) => Some(model),
            Err(e) => {
                warn!(table, error = %e, "Skipping row with unknown laboratory");
                None
            }
        })
        .collect()
}
