//! Filesystem object storage served under `/media`

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use arlab_common::Result;

use super::{encode_path, validate_object_path, Bucket, ObjectStore};

/// Route prefix the router mounts the media directory at
pub const MEDIA_ROUTE: &str = "/media";

/// Objects stored as `<root>/<bucket>/<path>`
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    /// `public_base_url` is prefixed to returned URLs; empty yields
    /// root-relative URLs such as `/media/videos/abc.mp4`
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn public_url(&self, bucket: Bucket, path: &str) -> String {
        format!(
            "{}{}/{}/{}",
            self.public_base_url,
            MEDIA_ROUTE,
            bucket.name(),
            encode_path(path)
        )
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload(
        &self,
        bucket: Bucket,
        path: &str,
        bytes: Vec<u8>,
        _content_type: Option<&str>,
    ) -> Result<String> {
        validate_object_path(path)?;

        let target = self.root.join(bucket.name()).join(path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // create_new: generated names must not silently replace an object
        let size = bytes.len();
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await?;
        tokio::io::AsyncWriteExt::write_all(&mut file, &bytes).await?;
        tokio::io::AsyncWriteExt::flush(&mut file).await?;

        info!(bucket = %bucket, path, size, "Stored object");
        Ok(self.public_url(bucket, path))
    }
}
