//! Video playback driven by tracking events and taps

use serde::Serialize;
use tracing::debug;

use super::scene::SceneSpec;

/// Tracking signal for one target slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetEvent {
    Found(usize),
    Lost(usize),
}

/// Observable state of one scene video element
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoElement {
    pub id: String,
    pub src: String,
    pub slot: usize,
    pub muted: bool,
    pub playing: bool,
    /// Seconds; only ever reset to zero here
    pub current_time: f64,
    /// Played once under a user gesture
    pub unlocked: bool,
}

/// Applies tracking events and taps to the scene's videos
///
/// Videos start muted and paused. Events for slots or ids that have no
/// video are ignored.
#[derive(Debug, Clone)]
pub struct PlaybackController {
    videos: Vec<VideoElement>,
}

impl PlaybackController {
    pub fn new(scene: &SceneSpec) -> Self {
        let videos = scene
            .targets
            .iter()
            .map(|t| VideoElement {
                id: t.video_id.clone(),
                src: t.video_url.clone(),
                slot: t.slot,
                muted: true,
                playing: false,
                current_time: 0.0,
                unlocked: false,
            })
            .collect();
        Self { videos }
    }

    pub fn videos(&self) -> &[VideoElement] {
        &self.videos
    }

    pub fn video(&self, id: &str) -> Option<&VideoElement> {
        self.videos.iter().find(|v| v.id == id)
    }

    pub fn video_for_slot(&self, slot: usize) -> Option<&VideoElement> {
        self.videos.iter().find(|v| v.slot == slot)
    }

    /// Play then immediately pause and rewind every video
    pub fn unlock_all(&mut self) {
        for video in &mut self.videos {
            video.playing = false;
            video.current_time = 0.0;
            video.unlocked = true;
        }
    }

    pub fn handle(&mut self, event: TargetEvent) {
        let slot = match event {
            TargetEvent::Found(slot) | TargetEvent::Lost(slot) => slot,
        };
        let Some(video) = self.videos.iter_mut().find(|v| v.slot == slot) else {
            debug!(slot, "Tracking event for slot without video");
            return;
        };

        match event {
            TargetEvent::Found(_) => {
                video.muted = false;
                video.playing = true;
            }
            TargetEvent::Lost(_) => video.playing = false,
        }
    }

    /// Toggle play/pause; returns the new playing state
    pub fn tap(&mut self, video_id: &str) -> Option<bool> {
        let video = self.videos.iter_mut().find(|v| v.id == video_id)?;
        video.playing = !video.playing;
        Some(video.playing)
    }

    pub fn clear(&mut self) {
        self.videos.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::scene::build_scene;
    use arlab_common::{Asset, Laboratory};

    fn controller() -> PlaybackController {
        let assets = vec![Asset::new(Laboratory::Mass, "Balanza", "img.png", "v1.mp4")];
        PlaybackController::new(&build_scene("m.mind", "demo.mp4", &assets))
    }

    #[test]
    fn test_videos_start_muted_and_paused() {
        let playback = controller();
        assert_eq!(playback.videos().len(), 2);
        assert!(playback.videos().iter().all(|v| v.muted && !v.playing));
    }

    #[test]
    fn test_found_unmutes_and_plays_lost_pauses() {
        let mut playback = controller();

        playback.handle(TargetEvent::Found(1));
        let video = playback.video_for_slot(1).unwrap();
        assert_eq!(video.src, "v1.mp4");
        assert!(video.playing);
        assert!(!video.muted);
        assert!(!playback.video("vid-demo").unwrap().playing);

        playback.handle(TargetEvent::Lost(1));
        let video = playback.video_for_slot(1).unwrap();
        assert!(!video.playing);
        assert!(!video.muted);
    }

    #[test]
    fn test_unknown_slot_is_noop() {
        let mut playback = controller();
        let before = playback.videos().to_vec();
        playback.handle(TargetEvent::Found(7));
        assert_eq!(playback.videos(), before.as_slice());
        assert_eq!(playback.tap("vid-7"), None);
    }

    #[test]
    fn test_tap_toggles_independent_of_tracking() {
        let mut playback = controller();
        assert_eq!(playback.tap("vid-demo"), Some(true));
        assert_eq!(playback.tap("vid-demo"), Some(false));

        playback.handle(TargetEvent::Found(1));
        assert_eq!(playback.tap("vid-0"), Some(false));
    }

    #[test]
    fn test_unlock_all_leaves_videos_paused_and_rewound() {
        let mut playback = controller();
        playback.videos[0].current_time = 3.5;
        playback.unlock_all();
        assert!(playback
            .videos()
            .iter()
            .all(|v| v.unlocked && !v.playing && v.current_time == 0.0));
    }
}
