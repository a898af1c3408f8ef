//! Object storage for uploaded media
//!
//! Uploads are write-only: an object goes into a bucket under a generated
//! name and the store hands back its public URL. Objects are never deleted,
//! so removing an asset leaves its files behind.

use async_trait::async_trait;
use std::fmt;

use arlab_common::labs::slugify;
use arlab_common::{ids, LabKey, Result};

mod local;
mod remote;

pub use local::{LocalObjectStore, MEDIA_ROUTE};
pub use remote::RemoteObjectStore;

/// Content bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    /// Marker photos shown in the admin console
    Images,
    /// Overlay videos
    Videos,
    /// Marker descriptor files, under `markers/`
    Configs,
}

impl Bucket {
    pub fn name(self) -> &'static str {
        match self {
            Bucket::Images => "fotos",
            Bucket::Videos => "videos",
            Bucket::Configs => "configs",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Write-only object storage
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` at `path` inside `bucket` and return the public URL
    async fn upload(
        &self,
        bucket: Bucket,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String>;
}

/// Extension of an uploaded file name, `bin` when it has none
fn extension(file_name: &str) -> String {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| "bin".to_string())
}

/// Object path for an asset photo or video: `<9 random chars>.<ext>`
pub fn asset_object_path(file_name: &str) -> String {
    format!("{}.{}", ids::short_id(9), extension(file_name))
}

/// Object path for a marker descriptor: `markers/<key slug>_<5 random chars>.<ext>`
pub fn marker_object_path(key: LabKey, file_name: &str) -> String {
    format!(
        "markers/{}_{}.{}",
        slugify(key.name()),
        ids::short_id(5),
        extension(file_name)
    )
}

/// Percent-encode each segment of an object path, keeping the separators
pub(crate) fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|seg| urlencoding::encode(seg).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Reject paths that could escape the bucket
pub(crate) fn validate_object_path(path: &str) -> Result<()> {
    let bad = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        return Err(arlab_common::Error::InvalidInput(format!(
            "Invalid object path: {}",
            path
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arlab_common::Laboratory;

    #[test]
    fn test_asset_object_path_keeps_extension() {
        let path = asset_object_path("Video Final.MP4");
        assert!(path.ends_with(".mp4"));
        assert_eq!(path.len(), 9 + 4);
    }

    #[test]
    fn test_asset_object_path_without_extension() {
        assert!(asset_object_path("README").ends_with(".bin"));
    }

    #[test]
    fn test_marker_object_path_uses_lab_slug() {
        let path = marker_object_path(LabKey::Lab(Laboratory::Mass), "targets.mind");
        assert!(path.starts_with("markers/laboratorio_de_masa_"));
        assert!(path.ends_with(".mind"));

        let global = marker_object_path(LabKey::Global, "t.mind");
        assert!(global.starts_with("markers/global_"));
    }

    #[test]
    fn test_encode_path_keeps_separators() {
        assert_eq!(encode_path("markers/presión a.mind"), "markers/presi%C3%B3n%20a.mind");
    }

    #[test]
    fn test_validate_object_path() {
        assert!(validate_object_path("markers/a.mind").is_ok());
        assert!(validate_object_path("abc.mp4").is_ok());
        assert!(validate_object_path("../etc/passwd").is_err());
        assert!(validate_object_path("/abs").is_err());
        assert!(validate_object_path("a//b").is_err());
        assert!(validate_object_path("").is_err());
    }
}
