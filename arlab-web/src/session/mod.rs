//! AR scan session
//!
//! Engine-independent core of the scan page: library bootstrap, binding of
//! assets to tracking slots, and playback in response to tracking events.
//! The page script mirrors this logic in the browser using the same
//! constants.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use arlab_common::config::ScannerConfig;
use arlab_common::{Error, Result};

pub mod bootstrap;
pub mod playback;
pub mod renderer;
pub mod scene;

pub use bootstrap::{Bootstrap, BootstrapState, LibraryScript, ReadinessProbe, ScriptLoader};
pub use playback::{PlaybackController, TargetEvent, VideoElement};
pub use renderer::{AframeRenderer, SceneHandle, SceneRenderer};
pub use scene::{build_scene, SceneSpec, SceneTarget};

/// Interval between library readiness checks
pub const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);

pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEMO_MARKER_URL: &str =
    "https://cdn.jsdelivr.net/gh/hiukim/mind-ar-js@1.2.5/examples/image-tracking/assets/card-example/card.mind";

pub const DEMO_VIDEO_URL: &str =
    "https://cdn.jsdelivr.net/gh/hiukim/mind-ar-js@1.2.5/examples/image-tracking/assets/card-example/card.mp4";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerSettings {
    pub poll_interval: Duration,
    pub ready_timeout: Duration,
    /// Marker used when the lab (or Global) has no uploaded descriptor
    pub demo_marker_url: String,
    /// Video in slot 0
    pub demo_video_url: String,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            poll_interval: READY_POLL_INTERVAL,
            ready_timeout: DEFAULT_READY_TIMEOUT,
            demo_marker_url: DEMO_MARKER_URL.to_string(),
            demo_video_url: DEMO_VIDEO_URL.to_string(),
        }
    }
}

impl ScannerSettings {
    pub fn from_config(config: &ScannerConfig) -> Self {
        let defaults = Self::default();
        Self {
            poll_interval: defaults.poll_interval,
            ready_timeout: config
                .ready_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.ready_timeout),
            demo_marker_url: config
                .demo_marker_url
                .clone()
                .unwrap_or(defaults.demo_marker_url),
            demo_video_url: config
                .demo_video_url
                .clone()
                .unwrap_or(defaults.demo_video_url),
        }
    }

    /// Scene for `assets` tracked against `marker_url`, or the demo marker
    pub fn scene(&self, marker_url: Option<String>, assets: &[arlab_common::Asset]) -> SceneSpec {
        let marker = marker_url.unwrap_or_else(|| self.demo_marker_url.clone());
        build_scene(&marker, &self.demo_video_url, assets)
    }
}

fn lock_playback(playback: &Mutex<PlaybackController>) -> MutexGuard<'_, PlaybackController> {
    // A panicking callback leaves plain flags behind; keep using them
    playback.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One visit to the scan page
pub struct ArSession<R: SceneRenderer> {
    renderer: R,
    scene: SceneSpec,
    bootstrap: Bootstrap,
    playback: Arc<Mutex<PlaybackController>>,
    handle: Option<SceneHandle>,
    poll_cancel: CancellationToken,
}

impl<R: SceneRenderer> ArSession<R> {
    pub fn new(renderer: R, scene: SceneSpec) -> Self {
        let playback = Arc::new(Mutex::new(PlaybackController::new(&scene)));
        Self {
            renderer,
            scene,
            bootstrap: Bootstrap::new(),
            playback,
            handle: None,
            poll_cancel: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> BootstrapState {
        self.bootstrap.state()
    }

    pub fn scene(&self) -> &SceneSpec {
        &self.scene
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn handle(&self) -> Option<SceneHandle> {
        self.handle
    }

    /// Token that stops the readiness poll; cancelled by [`teardown`](Self::teardown)
    pub fn cancel_token(&self) -> CancellationToken {
        self.poll_cancel.clone()
    }

    pub async fn wait_ready<P: ReadinessProbe + ?Sized>(
        &mut self,
        probe: &P,
        settings: &ScannerSettings,
    ) -> BootstrapState {
        self.bootstrap
            .wait_ready(probe, settings, &self.poll_cancel)
            .await
    }

    /// User start: mount the scene, unlock videos, and wire tracking events
    pub fn start(&mut self) -> Result<SceneHandle> {
        self.bootstrap
            .start()
            .map_err(|e| Error::InvalidInput(e.to_string()))?;

        let handle = self.renderer.mount_scene(&self.scene)?;
        lock_playback(&self.playback).unlock_all();

        let playback = Arc::clone(&self.playback);
        self.renderer.on_target_event(
            handle,
            Box::new(move |event| lock_playback(&playback).handle(event)),
        )?;

        self.handle = Some(handle);
        info!(
            handle = %handle,
            targets = self.scene.targets.len(),
            "AR scene mounted"
        );
        Ok(handle)
    }

    /// Toggle a video by element id; `None` when no such video exists
    pub fn tap(&self, video_id: &str) -> Option<bool> {
        lock_playback(&self.playback).tap(video_id)
    }

    pub fn video(&self, video_id: &str) -> Option<VideoElement> {
        lock_playback(&self.playback).video(video_id).cloned()
    }

    pub fn video_for_slot(&self, slot: usize) -> Option<VideoElement> {
        lock_playback(&self.playback).video_for_slot(slot).cloned()
    }

    pub fn video_count(&self) -> usize {
        lock_playback(&self.playback).videos().len()
    }

    /// Leave the page: stop polling and remove scene and video elements
    ///
    /// Safe to call more than once.
    pub fn teardown(&mut self) -> Result<()> {
        self.poll_cancel.cancel();
        if let Some(handle) = self.handle.take() {
            self.renderer.unmount(handle)?;
            debug!(handle = %handle, "AR scene unmounted");
        }
        lock_playback(&self.playback).clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::renderer::headless::HeadlessRenderer;
    use super::*;
    use arlab_common::{Asset, Laboratory};

    struct Ready;

    impl ReadinessProbe for Ready {
        fn is_present(&self, _script: LibraryScript) -> bool {
            true
        }
    }

    fn balanza_session() -> (ArSession<HeadlessRenderer>, HeadlessRenderer) {
        let assets = vec![Asset {
            id: "a1".to_string(),
            lab: Laboratory::Mass,
            title: "Balanza".to_string(),
            image_name: "balanza".to_string(),
            image_url: "img.png".to_string(),
            video_url: "v1.mp4".to_string(),
        }];
        let scene = ScannerSettings::default().scene(None, &assets);
        let renderer = HeadlessRenderer::default();
        (ArSession::new(renderer.clone(), scene), renderer)
    }

    #[test]
    fn test_settings_from_config() {
        let settings = ScannerSettings::from_config(&ScannerConfig {
            ready_timeout_secs: Some(5),
            demo_marker_url: Some("local.mind".to_string()),
            demo_video_url: None,
        });
        assert_eq!(settings.ready_timeout, Duration::from_secs(5));
        assert_eq!(settings.demo_marker_url, "local.mind");
        assert_eq!(settings.demo_video_url, DEMO_VIDEO_URL);

        let zero = ScannerSettings::from_config(&ScannerConfig {
            ready_timeout_secs: Some(0),
            ..Default::default()
        });
        assert_eq!(zero.ready_timeout, DEFAULT_READY_TIMEOUT);
    }

    #[test]
    fn test_scene_falls_back_to_demo_marker() {
        let settings = ScannerSettings::default();
        assert_eq!(settings.scene(None, &[]).marker_url, DEMO_MARKER_URL);
        assert_eq!(
            settings.scene(Some("lab.mind".to_string()), &[]).marker_url,
            "lab.mind"
        );
    }

    #[test]
    fn test_start_before_ready_is_rejected() {
        let (mut session, renderer) = balanza_session();
        assert!(session.start().is_err());
        assert_eq!(renderer.mounted_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_target_found_plays_bound_video_and_lost_pauses() {
        let (mut session, renderer) = balanza_session();

        let state = session.wait_ready(&Ready, &ScannerSettings::default()).await;
        assert_eq!(state, BootstrapState::AwaitingUserStart);

        let handle = session.start().unwrap();
        assert_eq!(session.state(), BootstrapState::Active);
        assert!(session.video("vid-0").unwrap().unlocked);

        renderer.fire(handle, TargetEvent::Found(1));
        let video = session.video_for_slot(1).unwrap();
        assert_eq!(video.src, "v1.mp4");
        assert!(video.playing);
        assert!(!video.muted);

        renderer.fire(handle, TargetEvent::Lost(1));
        assert!(!session.video_for_slot(1).unwrap().playing);

        // Slot without an asset has no payload
        renderer.fire(handle, TargetEvent::Found(2));
        assert!(session.video_for_slot(2).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tap_toggles_playback() {
        let (mut session, _renderer) = balanza_session();
        session.wait_ready(&Ready, &ScannerSettings::default()).await;
        session.start().unwrap();

        assert_eq!(session.tap("vid-demo"), Some(true));
        assert_eq!(session.tap("vid-demo"), Some(false));
        assert_eq!(session.tap("missing"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_unmounts_and_cancels_poll() {
        let (mut session, renderer) = balanza_session();
        session.wait_ready(&Ready, &ScannerSettings::default()).await;
        session.start().unwrap();
        assert_eq!(renderer.mounted_count(), 1);

        let cancel = session.cancel_token();
        session.teardown().unwrap();
        assert!(cancel.is_cancelled());
        assert_eq!(renderer.mounted_count(), 0);
        assert_eq!(session.video_count(), 0);
        assert!(session.handle().is_none());

        session.teardown().unwrap();
    }
}
