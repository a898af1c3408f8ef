//! Marker config store

use std::sync::Arc;
use tracing::{error, info};

use arlab_common::{LabConfig, LabKey, Result};

use super::LabConfigBackend;

/// Keyed marker configs; absence means the bundled demo marker applies
#[derive(Clone)]
pub struct LabConfigStore {
    backend: Arc<dyn LabConfigBackend>,
}

impl LabConfigStore {
    pub fn new(backend: Arc<dyn LabConfigBackend>) -> Self {
        Self { backend }
    }

    pub async fn get(&self, key: LabKey) -> Result<Option<LabConfig>> {
        self.backend.get_lab_config(key).await.map_err(|e| {
            error!(key = %key, error = %e, "Reading lab config failed");
            e
        })
    }

    /// Create or replace the marker for `key`; last write wins
    pub async fn upsert(&self, key: LabKey, marker_url: &str) -> Result<()> {
        match self.backend.upsert_lab_config(key, marker_url).await {
            Ok(()) => {
                info!(key = %key, marker_url, "Lab marker updated");
                Ok(())
            }
            Err(e) => {
                error!(key = %key, error = %e, "Saving lab config failed");
                Err(e)
            }
        }
    }

    pub async fn list_all(&self) -> Result<Vec<LabConfig>> {
        self.backend.list_lab_configs().await
    }

    /// Marker URL for `key`, if one has been uploaded
    ///
    /// Read errors are logged and treated as "no custom marker" so the
    /// scanner still starts with the demo marker.
    pub async fn marker_url(&self, key: LabKey) -> Option<String> {
        self.get(key).await.ok().flatten().and_then(|c| c.marker_url)
    }
}
