//! Asset store with local-mirror fallback

use std::sync::Arc;
use tracing::{error, info, warn};

use arlab_common::{Asset, Laboratory, Result};

use super::{AssetBackend, LocalMirror};

/// Asset CRUD over a backend, degrading to the local mirror
#[derive(Clone)]
pub struct AssetStore {
    backend: Arc<dyn AssetBackend>,
    mirror: LocalMirror,
}

impl AssetStore {
    pub fn new(backend: Arc<dyn AssetBackend>, mirror: LocalMirror) -> Self {
        Self { backend, mirror }
    }

    /// All assets, newest first
    ///
    /// Never fails: a backend error switches to the mirror, and an
    /// unreadable mirror yields an empty list.
    pub async fn list(&self) -> Vec<Asset> {
        match self.backend.list_assets().await {
            Ok(assets) => assets,
            Err(e) => {
                error!(error = %e, "Listing assets failed, reading local mirror");
                match self.mirror.load().await {
                    Ok(assets) => assets,
                    Err(e) => {
                        error!(error = %e, path = %self.mirror.path().display(), "Local mirror unreadable");
                        Vec::new()
                    }
                }
            }
        }
    }

    /// Assets for one laboratory, or all of them for `None`, in list order
    pub async fn list_for(&self, lab: Option<Laboratory>) -> Vec<Asset> {
        let assets = self.list().await;
        match lab {
            Some(lab) => assets.into_iter().filter(|a| a.lab == lab).collect(),
            None => assets,
        }
    }

    /// Persist a new asset
    ///
    /// On backend failure the asset is appended to the mirror before the
    /// error is returned to the caller.
    pub async fn create(&self, asset: &Asset) -> Result<()> {
        match self.backend.insert_asset(asset).await {
            Ok(()) => {
                info!(id = %asset.id, lab = %asset.lab, title = %asset.title, "Asset created");
                Ok(())
            }
            Err(e) => {
                error!(id = %asset.id, error = %e, "Saving asset failed, appending to local mirror");
                if let Err(mirror_err) = self.mirror.append(asset).await {
                    warn!(error = %mirror_err, "Local mirror append failed");
                }
                Err(e)
            }
        }
    }

    /// Delete an asset record; referenced media objects are left in place
    pub async fn delete(&self, id: &str) -> Result<()> {
        if let Err(e) = self.backend.delete_asset(id).await {
            error!(id, error = %e, "Deleting asset failed");
            return Err(e);
        }
        info!(id, "Asset deleted");

        // Keep degraded-mode reads from resurrecting the asset
        if let Err(e) = self.mirror.remove(id).await {
            warn!(id, error = %e, "Local mirror cleanup failed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteBackend;
    use arlab_common::Error;
    use async_trait::async_trait;
    use sqlx::sqlite::SqlitePoolOptions;

    /// Backend whose every call fails, standing in for an unreachable store
    struct UnreachableBackend;

    #[async_trait]
    impl AssetBackend for UnreachableBackend {
        async fn list_assets(&self) -> Result<Vec<Asset>> {
            Err(Error::Remote("connection refused".to_string()))
        }

        async fn insert_asset(&self, _asset: &Asset) -> Result<()> {
            Err(Error::Remote("connection refused".to_string()))
        }

        async fn delete_asset(&self, _id: &str) -> Result<()> {
            Err(Error::Remote("connection refused".to_string()))
        }
    }

    async fn sqlite_store(dir: &tempfile::TempDir) -> AssetStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        arlab_common::db::create_schema(&pool).await.unwrap();
        AssetStore::new(
            Arc::new(SqliteBackend::new(pool)),
            LocalMirror::new(dir.path().join("ra_assets.json")),
        )
    }

    fn unreachable_store(dir: &tempfile::TempDir) -> AssetStore {
        AssetStore::new(
            Arc::new(UnreachableBackend),
            LocalMirror::new(dir.path().join("ra_assets.json")),
        )
    }

    #[tokio::test]
    async fn test_create_then_list_includes_asset() {
        let dir = tempfile::tempdir().unwrap();
        let store = sqlite_store(&dir).await;

        let asset = Asset::new(Laboratory::Mass, "Balanza", "img.png", "v1.mp4");
        store.create(&asset).await.unwrap();

        let listed = store.list().await;
        let found = listed.iter().find(|a| a.id == asset.id).unwrap();
        assert_eq!(found.lab, asset.lab);
        assert_eq!(found.title, asset.title);
        assert_eq!(found.image_url, asset.image_url);
        assert_eq!(found.video_url, asset.video_url);
    }

    #[tokio::test]
    async fn test_delete_then_list_excludes_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = sqlite_store(&dir).await;

        let asset = Asset::new(Laboratory::Mass, "Balanza", "img.png", "v1.mp4");
        store.create(&asset).await.unwrap();
        store.delete(&asset.id).await.unwrap();

        assert!(store.list().await.iter().all(|a| a.id != asset.id));
    }

    #[tokio::test]
    async fn test_list_for_filters_by_lab() {
        let dir = tempfile::tempdir().unwrap();
        let store = sqlite_store(&dir).await;

        store
            .create(&Asset::new(Laboratory::Mass, "Balanza", "i", "v"))
            .await
            .unwrap();
        store
            .create(&Asset::new(Laboratory::Electricity, "Multímetro", "i", "v"))
            .await
            .unwrap();

        let mass = store.list_for(Some(Laboratory::Mass)).await;
        assert_eq!(mass.len(), 1);
        assert_eq!(mass[0].title, "Balanza");
        assert_eq!(store.list_for(None).await.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_create_appends_to_mirror_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = unreachable_store(&dir);

        let asset = Asset::new(Laboratory::Pressure, "Manómetro", "i", "v");
        assert!(store.create(&asset).await.is_err());

        // Degraded-mode reads now surface the mirrored asset
        assert_eq!(store.list().await, vec![asset]);
    }

    #[tokio::test]
    async fn test_list_with_everything_unavailable_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ra_assets.json"), b"{broken").unwrap();
        let store = unreachable_store(&dir);

        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_delete_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = unreachable_store(&dir);
        assert!(store.delete("a1").await.is_err());
    }
}
