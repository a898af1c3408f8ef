//! Binding of assets to tracking target slots

use serde::Serialize;

use arlab_common::Asset;

/// Video element id of the fixed demo target
pub const DEMO_VIDEO_ID: &str = "vid-demo";

/// Slot occupied by the demo target
pub const DEMO_SLOT: usize = 0;

/// One trackable marker and the video it reveals
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneTarget {
    /// Index into the marker descriptor's target list
    pub slot: usize,
    pub video_id: String,
    pub video_url: String,
    pub title: String,
}

impl SceneTarget {
    pub fn is_demo(&self) -> bool {
        self.slot == DEMO_SLOT
    }
}

/// Everything a renderer needs to mount a scan scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSpec {
    pub marker_url: String,
    /// Ordered by slot, demo target first
    pub targets: Vec<SceneTarget>,
}

impl SceneSpec {
    pub fn target(&self, slot: usize) -> Option<&SceneTarget> {
        self.targets.get(slot)
    }

    pub fn target_by_video(&self, video_id: &str) -> Option<&SceneTarget> {
        self.targets.iter().find(|t| t.video_id == video_id)
    }
}

/// Video element id for the asset at `index` in list order
pub fn asset_video_id(index: usize) -> String {
    format!("vid-{}", index)
}

/// Build the scene for `assets`, keeping their list order
///
/// Slot 0 is always the demo target; asset `i` takes slot `i + 1`.
pub fn build_scene(marker_url: &str, demo_video_url: &str, assets: &[Asset]) -> SceneSpec {
    let demo = SceneTarget {
        slot: DEMO_SLOT,
        video_id: DEMO_VIDEO_ID.to_string(),
        video_url: demo_video_url.to_string(),
        title: "Demo".to_string(),
    };

    let targets = std::iter::once(demo)
        .chain(assets.iter().enumerate().map(|(i, asset)| SceneTarget {
            slot: i + 1,
            video_id: asset_video_id(i),
            video_url: asset.video_url.clone(),
            title: asset.title.clone(),
        }))
        .collect();

    SceneSpec {
        marker_url: marker_url.to_string(),
        targets,
    }
}
