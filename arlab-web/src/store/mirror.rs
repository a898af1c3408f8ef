//! Local asset mirror
//!
//! A single JSON file holding a serialized `Vec<Asset>`. Only read when the
//! backend cannot be reached and only written when a create fails, so its
//! contents may be stale or empty.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use arlab_common::{Asset, Result};

#[derive(Debug, Clone)]
pub struct LocalMirror {
    path: PathBuf,
    /// Serializes read-modify-write cycles on the file
    lock: Arc<Mutex<()>>,
}

impl LocalMirror {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mirrored assets; a missing file is an empty mirror
    pub async fn load(&self) -> Result<Vec<Asset>> {
        let _guard = self.lock.lock().await;
        self.read_unlocked().await
    }

    /// Append one asset
    pub async fn append(&self, asset: &Asset) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut assets = self.read_unlocked().await?;
        assets.push(asset.clone());
        self.write_unlocked(&assets).await
    }

    /// Drop an asset by id; returns whether anything was removed
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut assets = self.read_unlocked().await?;
        let before = assets.len();
        assets.retain(|a| a.id != id);
        if assets.len() == before {
            return Ok(false);
        }
        self.write_unlocked(&assets).await?;
        Ok(true)
    }

    async fn read_unlocked(&self) -> Result<Vec<Asset>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_unlocked(&self, assets: &[Asset]) -> Result<()> {
        let json = serde_json::to_vec(assets)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arlab_common::Laboratory;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = LocalMirror::new(dir.path().join("ra_assets.json"));
        assert!(mirror.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = LocalMirror::new(dir.path().join("ra_assets.json"));

        let a1 = Asset::new(Laboratory::Mass, "Balanza", "i1", "v1");
        let a2 = Asset::new(Laboratory::Humidity, "Higrómetro", "i2", "v2");
        mirror.append(&a1).await.unwrap();
        mirror.append(&a2).await.unwrap();
        assert_eq!(mirror.load().await.unwrap(), vec![a1.clone(), a2.clone()]);

        assert!(mirror.remove(&a1.id).await.unwrap());
        assert!(!mirror.remove("missing").await.unwrap());
        assert_eq!(mirror.load().await.unwrap(), vec![a2]);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ra_assets.json");
        std::fs::write(&path, b"not json").unwrap();

        let mirror = LocalMirror::new(path);
        assert!(mirror.load().await.is_err());
    }
}
