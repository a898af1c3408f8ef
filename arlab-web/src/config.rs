//! Service configuration
//!
//! Command-line flags (each with an environment fallback) override the
//! TOML file, which overrides compiled defaults.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use arlab_common::api::auth::{password_digest, DEFAULT_SESSION_TTL_SECS, MAX_SESSION_TTL_SECS};
use arlab_common::config::{
    config_file_path, load_toml_config, CompiledDefaults, RemoteConfig, RootFolderResolver,
    TomlConfig,
};
use arlab_common::{Error, Result};

use crate::session::ScannerSettings;

/// Module name used for the config file and root folder resolution
pub const MODULE_NAME: &str = "arlab-web";

/// Command-line arguments for arlab-web
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "arlab-web")]
#[command(about = "Laboratory AR content service")]
#[command(version)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "ARLAB_PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(short, long, env = "ARLAB_BIND")]
    pub bind: Option<String>,

    /// Folder holding the database, local mirror, and uploaded media
    #[arg(short, long)]
    pub root_folder: Option<PathBuf>,

    /// TOML config file (default: ~/.config/arlab/arlab-web.toml)
    #[arg(short, long, env = "ARLAB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Admin console password; overrides the digest in the config file
    #[arg(long, env = "ARLAB_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "ARLAB_LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl Args {
    /// Effective log filter directive
    pub fn log_filter(&self) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| CompiledDefaults::for_current_platform().log_level)
    }
}

/// Fully resolved service settings
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub root_folder: PathBuf,
    pub bind_address: String,
    pub port: u16,
    /// Prefix for locally stored media URLs; empty for root-relative
    pub public_base_url: String,
    /// `None` locks the admin console
    pub admin_password_digest: Option<String>,
    pub session_ttl_secs: u64,
    /// Hosted backend; local SQLite and filesystem media when `None`
    pub remote: Option<RemoteConfig>,
    pub scanner: ScannerSettings,
}

impl ServiceConfig {
    pub fn resolve(args: &Args) -> Result<Self> {
        let (toml, explicit_file) = match &args.config {
            Some(path) => (load_toml_config(path)?, true),
            None => match config_file_path(MODULE_NAME) {
                Some(path) => (load_toml_config(&path)?, false),
                None => (TomlConfig::default(), false),
            },
        };
        Self::from_parts(args, toml, explicit_file)
    }

    /// Merge arguments over an already loaded TOML file
    ///
    /// The root folder of an explicitly named file counts as a command-line
    /// choice; otherwise the usual CLI → ENV → TOML → default order applies.
    pub fn from_parts(args: &Args, toml: TomlConfig, explicit_file: bool) -> Result<Self> {
        let defaults = CompiledDefaults::for_current_platform();

        let session_ttl_secs = toml
            .admin
            .session_ttl_secs
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);
        if session_ttl_secs == 0 || session_ttl_secs > MAX_SESSION_TTL_SECS {
            return Err(Error::Config(format!(
                "admin.session_ttl_secs must be between 1 and {}, got {}",
                MAX_SESSION_TTL_SECS, session_ttl_secs
            )));
        }

        let cli_root = args.root_folder.clone().or_else(|| {
            if explicit_file {
                toml.root_folder.clone()
            } else {
                None
            }
        });
        let root_folder = RootFolderResolver::new(MODULE_NAME)
            .with_cli_arg(cli_root)
            .resolve();

        let admin_password_digest = match &args.admin_password {
            Some(password) if !password.is_empty() => Some(password_digest(password)),
            _ => toml.admin.password_sha256.clone(),
        };

        Ok(Self {
            root_folder,
            bind_address: args
                .bind
                .clone()
                .or(toml.bind_address)
                .unwrap_or_else(|| "127.0.0.1".to_string()),
            port: args.port.or(toml.port).unwrap_or(defaults.port),
            public_base_url: toml.public_base_url.unwrap_or_default(),
            admin_password_digest,
            session_ttl_secs,
            remote: toml.remote,
            scanner: ScannerSettings::from_config(&toml.scanner),
        })
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn log_summary(&self) {
        info!("Root folder: {}", self.root_folder.display());
        info!(
            backend = if self.remote.is_some() { "remote" } else { "sqlite" },
            admin_enabled = self.admin_password_digest.is_some(),
            session_ttl_secs = self.session_ttl_secs,
            ready_timeout_secs = self.scanner.ready_timeout.as_secs(),
            "Service configuration resolved"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arlab_common::config::AdminConfig;
    use std::time::Duration;

    #[test]
    fn test_cli_overrides_toml() {
        let args = Args {
            port: Some(9000),
            root_folder: Some(PathBuf::from("/tmp/arlab-cli")),
            admin_password: Some("labs2024".to_string()),
            ..Default::default()
        };
        let toml = TomlConfig {
            port: Some(8000),
            bind_address: Some("0.0.0.0".to_string()),
            admin: AdminConfig {
                password_sha256: Some("ff".repeat(32)),
                session_ttl_secs: Some(60),
            },
            ..Default::default()
        };

        let config = ServiceConfig::from_parts(&args, toml, false).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.listen_address(), "0.0.0.0:9000");
        assert_eq!(config.root_folder, PathBuf::from("/tmp/arlab-cli"));
        assert_eq!(
            config.admin_password_digest.as_deref(),
            Some(password_digest("labs2024").as_str())
        );
        assert_eq!(config.session_ttl_secs, 60);
    }

    #[test]
    fn test_defaults_without_config() {
        let args = Args {
            root_folder: Some(PathBuf::from("/tmp/arlab-defaults")),
            ..Default::default()
        };
        let config = ServiceConfig::from_parts(&args, TomlConfig::default(), false).unwrap();

        assert_eq!(config.port, 5780);
        assert_eq!(config.bind_address, "127.0.0.1");
        assert!(config.admin_password_digest.is_none());
        assert!(config.remote.is_none());
        assert_eq!(config.session_ttl_secs, DEFAULT_SESSION_TTL_SECS);
        assert_eq!(config.scanner.ready_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_explicit_file_root_folder_counts_as_cli() {
        let toml = TomlConfig {
            root_folder: Some(PathBuf::from("/srv/arlab")),
            ..Default::default()
        };
        let config = ServiceConfig::from_parts(&Args::default(), toml, true).unwrap();
        assert_eq!(config.root_folder, PathBuf::from("/srv/arlab"));
    }

    #[test]
    fn test_session_ttl_out_of_range_is_config_error() {
        for ttl in [0, MAX_SESSION_TTL_SECS + 1, 100_000_000_000_000_000, u64::MAX] {
            let toml = TomlConfig {
                admin: AdminConfig {
                    password_sha256: None,
                    session_ttl_secs: Some(ttl),
                },
                ..Default::default()
            };
            let args = Args {
                root_folder: Some(PathBuf::from("/tmp/arlab-ttl")),
                ..Default::default()
            };
            let err = ServiceConfig::from_parts(&args, toml, false).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "ttl {} accepted", ttl);
        }
    }
}
