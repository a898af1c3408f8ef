//! Rendering engine seam
//!
//! Session logic only ever talks to a [`SceneRenderer`]. The production
//! renderer emits A-Frame/MindAR markup for the scan page; the engine
//! itself runs in the browser and reports tracking through the page
//! script.

use std::collections::HashMap;
use std::fmt;

use arlab_common::{Error, Result};

use super::playback::TargetEvent;
use super::scene::{SceneSpec, SceneTarget};

/// Identifies one mounted scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneHandle(u64);

impl fmt::Display for SceneHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scene-{}", self.0)
    }
}

pub type TargetCallback = Box<dyn Fn(TargetEvent) + Send + Sync>;

pub trait SceneRenderer {
    fn mount_scene(&mut self, scene: &SceneSpec) -> Result<SceneHandle>;

    fn on_target_event(&mut self, handle: SceneHandle, callback: TargetCallback) -> Result<()>;

    /// Remove the scene and every video element it created
    fn unmount(&mut self, handle: SceneHandle) -> Result<()>;
}

fn unknown_handle(handle: SceneHandle) -> Error {
    Error::NotFound(format!("No mounted scene {}", handle))
}

struct MountedScene {
    markup: String,
    callbacks: Vec<TargetCallback>,
}

/// Renders scenes as A-Frame markup driven by MindAR image tracking
#[derive(Default)]
pub struct AframeRenderer {
    scenes: HashMap<SceneHandle, MountedScene>,
    next_id: u64,
}

impl AframeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markup(&self, handle: SceneHandle) -> Option<&str> {
        self.scenes.get(&handle).map(|s| s.markup.as_str())
    }

    pub fn mounted_count(&self) -> usize {
        self.scenes.len()
    }

    /// Deliver a tracking event reported by the page; returns the number
    /// of callbacks invoked
    pub fn dispatch(&self, handle: SceneHandle, event: TargetEvent) -> usize {
        match self.scenes.get(&handle) {
            Some(scene) => {
                for callback in &scene.callbacks {
                    callback(event);
                }
                scene.callbacks.len()
            }
            None => 0,
        }
    }
}

impl SceneRenderer for AframeRenderer {
    fn mount_scene(&mut self, scene: &SceneSpec) -> Result<SceneHandle> {
        let handle = SceneHandle(self.next_id);
        self.next_id += 1;
        self.scenes.insert(
            handle,
            MountedScene {
                markup: render_markup(scene),
                callbacks: Vec::new(),
            },
        );
        Ok(handle)
    }

    fn on_target_event(&mut self, handle: SceneHandle, callback: TargetCallback) -> Result<()> {
        let scene = self
            .scenes
            .get_mut(&handle)
            .ok_or_else(|| unknown_handle(handle))?;
        scene.callbacks.push(callback);
        Ok(())
    }

    fn unmount(&mut self, handle: SceneHandle) -> Result<()> {
        self.scenes
            .remove(&handle)
            .map(|_| ())
            .ok_or_else(|| unknown_handle(handle))
    }
}

/// Escape text for use in HTML content or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `<a-scene>` markup for `scene`
pub fn render_markup(scene: &SceneSpec) -> String {
    let videos: String = scene.targets.iter().map(video_markup).collect();
    let entities: String = scene.targets.iter().map(target_markup).collect();

    format!(
        r#"<a-scene mindar-image="imageTargetSrc: {marker}; autoStart: true; uiLoading: no; uiError: no; uiScanning: yes;" color-space="sRGB" embedded renderer="colorManagement: true, physicallyCorrectLights" vr-mode-ui="enabled: false" device-orientation-permission-ui="enabled: false">
  <a-assets>
{videos}  </a-assets>
  <a-camera position="0 0 0" look-controls="enabled: false" cursor="fuse: false; rayOrigin: mouse;" raycaster="far: 10000; objects: .clickable"></a-camera>
{entities}</a-scene>
"#,
        marker = escape_html(&scene.marker_url),
        videos = videos,
        entities = entities,
    )
}

fn video_markup(target: &SceneTarget) -> String {
    format!(
        "    <video id=\"{id}\" src=\"{src}\" preload=\"auto\" loop crossorigin=\"anonymous\" muted playsinline></video>\n",
        id = escape_html(&target.video_id),
        src = escape_html(&target.video_url),
    )
}

fn target_markup(target: &SceneTarget) -> String {
    // Demo card video is 16:9-ish; lab videos are square
    let height = if target.is_demo() { "0.552" } else { "1" };
    format!(
        "  <a-entity mindar-image-target=\"targetIndex: {slot}\">\n    <a-video src=\"#{id}\" position=\"0 0 0\" height=\"{height}\" width=\"1\" rotation=\"0 0 0\" class=\"clickable\" data-video-id=\"{id}\" title=\"{title}\"></a-video>\n  </a-entity>\n",
        slot = target.slot,
        id = escape_html(&target.video_id),
        height = height,
        title = escape_html(&target.title),
    )
}
