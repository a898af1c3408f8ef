//! HTTP API handlers for arlab-web

pub mod assets;
pub mod auth;
pub mod health;
pub mod lab_configs;
pub mod scene;
pub mod session;
pub mod ui;

pub use assets::{create_asset, delete_asset, list_assets};
pub use auth::{auth_middleware, SessionRegistry};
pub use health::health_routes;
pub use lab_configs::{list_lab_configs, upload_marker};
pub use scene::{get_lab_scene, get_scene};
pub use session::{login, logout};
pub use ui::ui_routes;
