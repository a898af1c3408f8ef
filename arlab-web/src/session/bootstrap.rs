//! Library bootstrap for the scan page
//!
//! The page pulls in two third-party scripts, one after the other, and then
//! polls for the globals they install. Once both are present the session
//! waits for an explicit user start before touching camera or audio.
//!
//! ```text
//! Loading ──(both globals present)──> AwaitingUserStart ──(user start)──> Active
//!    │
//!    └──(ready timeout)──> Failed
//! ```

use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::ScannerSettings;

/// Bootstrap phase of a scan session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapState {
    Loading,
    AwaitingUserStart,
    Active,
    Failed,
}

impl fmt::Display for BootstrapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BootstrapState::Loading => "loading",
            BootstrapState::AwaitingUserStart => "awaiting_user_start",
            BootstrapState::Active => "active",
            BootstrapState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Third-party script the scan page depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryScript {
    /// Declarative 3D scene runtime
    SceneRuntime,
    /// Image-tracking extension; requires the scene runtime
    ImageTracking,
}

impl LibraryScript {
    /// Load order
    pub const SEQUENCE: [LibraryScript; 2] =
        [LibraryScript::SceneRuntime, LibraryScript::ImageTracking];

    pub fn url(self) -> &'static str {
        match self {
            LibraryScript::SceneRuntime => "https://aframe.io/releases/1.5.0/aframe.min.js",
            LibraryScript::ImageTracking => {
                "https://cdn.jsdelivr.net/npm/mind-ar@1.2.5/dist/mindar-image-aframe.prod.js"
            }
        }
    }

    /// Window global whose presence means the script has initialized
    pub fn global(self) -> &'static str {
        match self {
            LibraryScript::SceneRuntime => "AFRAME",
            LibraryScript::ImageTracking => "MINDAR",
        }
    }
}

/// Hands out scripts strictly one at a time
///
/// The next script is only released after the previous one reported
/// loaded, so the tracking extension never races the runtime it extends.
#[derive(Debug, Clone)]
pub struct ScriptLoader {
    pending: VecDeque<LibraryScript>,
    in_flight: Option<LibraryScript>,
}

impl Default for ScriptLoader {
    fn default() -> Self {
        Self {
            pending: LibraryScript::SEQUENCE.into_iter().collect(),
            in_flight: None,
        }
    }
}

impl ScriptLoader {
    /// Next script to request, or `None` while one is still loading
    pub fn next_request(&mut self) -> Option<LibraryScript> {
        if self.in_flight.is_some() {
            return None;
        }
        let next = self.pending.pop_front()?;
        self.in_flight = Some(next);
        Some(next)
    }

    /// Record a load callback; callbacks for scripts not in flight are ignored
    pub fn mark_loaded(&mut self, script: LibraryScript) {
        if self.in_flight == Some(script) {
            self.in_flight = None;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.in_flight.is_none() && self.pending.is_empty()
    }
}

/// Source of the two capability flags
pub trait ReadinessProbe: Send + Sync {
    fn is_present(&self, script: LibraryScript) -> bool;

    fn libraries_ready(&self) -> bool {
        LibraryScript::SEQUENCE.iter().all(|s| self.is_present(*s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: BootstrapState,
    pub to: BootstrapState,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cannot move from {} to {}", self.from, self.to)
    }
}

impl std::error::Error for InvalidTransition {}

/// Bootstrap state machine
#[derive(Debug, Clone)]
pub struct Bootstrap {
    state: BootstrapState,
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self::new()
    }
}

impl Bootstrap {
    pub fn new() -> Self {
        Self {
            state: BootstrapState::Loading,
        }
    }

    pub fn state(&self) -> BootstrapState {
        self.state
    }

    /// Feed one poll result; returns true on the single Loading exit
    pub fn observe(&mut self, libraries_ready: bool) -> bool {
        if self.state == BootstrapState::Loading && libraries_ready {
            self.state = BootstrapState::AwaitingUserStart;
            info!("AR libraries ready, awaiting user start");
            return true;
        }
        false
    }

    /// Readiness deadline passed; only affects a session still loading
    pub fn time_out(&mut self) {
        if self.state == BootstrapState::Loading {
            warn!("AR libraries did not load before the deadline");
            self.state = BootstrapState::Failed;
        }
    }

    /// User gesture that engages camera and audio
    pub fn start(&mut self) -> Result<(), InvalidTransition> {
        if self.state != BootstrapState::AwaitingUserStart {
            return Err(InvalidTransition {
                from: self.state,
                to: BootstrapState::Active,
            });
        }
        self.state = BootstrapState::Active;
        Ok(())
    }

    /// Poll `probe` until both libraries are present
    ///
    /// Ends in `AwaitingUserStart` when they appear, `Failed` when
    /// `ready_timeout` elapses first, or unchanged when `cancel` fires.
    /// Polling stops in every case.
    pub async fn wait_ready<P: ReadinessProbe + ?Sized>(
        &mut self,
        probe: &P,
        settings: &ScannerSettings,
        cancel: &CancellationToken,
    ) -> BootstrapState {
        if self.state != BootstrapState::Loading {
            return self.state;
        }

        let outcome = tokio::select! {
            _ = cancel.cancelled() => None,
            polled = tokio::time::timeout(
                settings.ready_timeout,
                poll_until_ready(probe, settings.poll_interval),
            ) => Some(polled.is_ok()),
        };

        match outcome {
            Some(true) => {
                self.observe(true);
            }
            Some(false) => self.time_out(),
            None => debug!("Readiness poll cancelled"),
        }
        self.state
    }
}

async fn poll_until_ready<P: ReadinessProbe + ?Sized>(probe: &P, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        if probe.libraries_ready() {
            return;
        }
    }
}
