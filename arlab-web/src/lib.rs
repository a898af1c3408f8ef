//! arlab-web library - laboratory AR content service
//!
//! Admin console for photo/video assets and marker descriptors, plus the
//! scan pages that overlay those videos on tracked markers.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod error;
pub mod session;
pub mod storage;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

use api::SessionRegistry;
use session::ScannerSettings;
use storage::{ObjectStore, MEDIA_ROUTE};
use store::{AssetStore, LabConfigStore};

/// Largest accepted request body; videos arrive in a single multipart POST
pub const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub assets: AssetStore,
    pub lab_configs: LabConfigStore,
    pub objects: Arc<dyn ObjectStore>,
    pub sessions: SessionRegistry,
    pub scanner: Arc<ScannerSettings>,
    /// Served under `/media` when objects are stored on local disk
    pub media_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(
        assets: AssetStore,
        lab_configs: LabConfigStore,
        objects: Arc<dyn ObjectStore>,
        sessions: SessionRegistry,
        scanner: ScannerSettings,
    ) -> Self {
        Self {
            assets,
            lab_configs,
            objects,
            sessions,
            scanner: Arc::new(scanner),
            media_dir: None,
        }
    }

    pub fn with_media_dir(mut self, dir: PathBuf) -> Self {
        self.media_dir = Some(dir);
        self
    }
}

/// Build application router
///
/// Admin endpoints require a session token; pages, scene reads, login,
/// and health do not.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post};

    // Protected routes (require authentication)
    let protected = Router::new()
        .route("/api/session", delete(api::logout))
        .route("/api/assets", get(api::list_assets).post(api::create_asset))
        .route("/api/assets/:id", delete(api::delete_asset))
        .route("/api/lab-configs", get(api::list_lab_configs))
        .route("/api/lab-configs/:key/marker", post(api::upload_marker))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/api/session", post(api::login))
        .route("/api/scene", get(api::get_scene))
        .route("/api/scene/:lab", get(api::get_lab_scene))
        .merge(api::ui_routes())
        .merge(api::health_routes());

    let mut router = Router::new().merge(protected).merge(public);
    if let Some(dir) = &state.media_dir {
        router = router.nest_service(MEDIA_ROUTE, ServeDir::new(dir));
    }

    router
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
