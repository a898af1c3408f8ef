//! Database models

use serde::{Deserialize, Serialize};

use crate::ids;
use crate::labs::{slugify, LabKey, Laboratory};

/// Photo/video pair shown when a laboratory marker is scanned
///
/// Assets are created or deleted, never edited. The JSON form keeps the
/// camelCase field names browsers already send; SQL columns are snake_case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub lab: Laboratory,
    pub title: String,
    pub image_name: String,
    pub image_url: String,
    pub video_url: String,
}

impl Asset {
    /// Build a new asset with a fresh id and derived image name
    pub fn new(
        lab: Laboratory,
        title: impl Into<String>,
        image_url: impl Into<String>,
        video_url: impl Into<String>,
    ) -> Self {
        let title = title.into();
        Self {
            id: ids::asset_id(),
            lab,
            image_name: slugify(&title),
            title,
            image_url: image_url.into(),
            video_url: video_url.into(),
        }
    }
}

/// Marker descriptor chosen for a laboratory or for the universal scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabConfig {
    pub lab_name: LabKey,
    pub marker_url: Option<String>,
}
