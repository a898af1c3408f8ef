//! Configuration loading and root folder resolution
//!
//! Bootstrap settings come from, in priority order:
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file (`~/.config/arlab/<module>.toml`)
//! 4. Compiled defaults
//!
//! A missing TOML file is never fatal: a warning is logged and the compiled
//! defaults are used. A file that exists but does not parse is reported as
//! [`Error::Config`](crate::Error::Config).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::{Error, Result};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "ARLAB_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "arlab.db";

/// Local asset mirror file name inside the root folder
pub const MIRROR_FILE: &str = "ra_assets.json";

/// Media directory (local object storage) inside the root folder
pub const MEDIA_DIR: &str = "media";

/// Compiled-in fallbacks used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub port: u16,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .map(|d| d.join("arlab"))
                .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\arlab"))
        } else if cfg!(target_os = "macos") {
            dirs::data_dir()
                .map(|d| d.join("arlab"))
                .unwrap_or_else(|| PathBuf::from("/Library/Application Support/arlab"))
        } else {
            dirs::data_local_dir()
                .map(|d| d.join("arlab"))
                .unwrap_or_else(|| PathBuf::from("./arlab_data"))
        };

        Self {
            root_folder,
            port: 5780,
            log_level: "info".to_string(),
        }
    }
}

/// TOML bootstrap configuration
///
/// Every field is optional so older or partial files keep loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub port: Option<u16>,

    /// Address to bind, e.g. `0.0.0.0` to serve phones on the LAN
    #[serde(default)]
    pub bind_address: Option<String>,

    /// Base URL prefixed to locally stored media, e.g. `https://ra.example.org`
    #[serde(default)]
    pub public_base_url: Option<String>,

    #[serde(default)]
    pub admin: AdminConfig,

    /// Hosted backend for tables and object storage; local SQLite and
    /// filesystem media are used when absent
    #[serde(default)]
    pub remote: Option<RemoteConfig>,

    #[serde(default)]
    pub scanner: ScannerConfig,
}

/// Admin console access
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Hex SHA-256 of the admin password
    #[serde(default)]
    pub password_sha256: Option<String>,

    /// Idle lifetime of an admin session in seconds
    #[serde(default)]
    pub session_ttl_secs: Option<u64>,
}

/// PostgREST-compatible hosted backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Key sent as `apikey` and bearer token
    pub api_key: String,
}

/// AR scanner page settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Seconds to wait for the AR libraries before giving up
    #[serde(default)]
    pub ready_timeout_secs: Option<u64>,

    /// Marker descriptor used when no config row exists
    #[serde(default)]
    pub demo_marker_url: Option<String>,

    /// Video bound to the demo target in slot 0
    #[serde(default)]
    pub demo_video_url: Option<String>,
}

/// Path of the TOML file for a module
pub fn config_file_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("arlab").join(format!("{}.toml", module_name)))
}

/// Load TOML configuration
///
/// A missing file yields the defaults with a warning. A file that exists
/// but does not parse is a configuration error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file {} not found, using compiled defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Resolves the root folder for a module
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            cli_arg: None,
        }
    }

    /// Highest-priority override from the command line
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// Resolve using CLI → ENV → TOML → compiled default
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(config_path) = config_file_path(&self.module_name) {
            if config_path.exists() {
                match load_toml_config(&config_path) {
                    Ok(TomlConfig {
                        root_folder: Some(root),
                        ..
                    }) => return root,
                    Ok(_) => {}
                    Err(e) => warn!("Ignoring config file: {}", e),
                }
            }
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Lays out files inside the resolved root folder
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder and media directory if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(self.media_path())?;
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }

    pub fn mirror_path(&self) -> PathBuf {
        self.root_folder.join(MIRROR_FILE)
    }

    pub fn media_path(&self) -> PathBuf {
        self.root_folder.join(MEDIA_DIR)
    }
}
