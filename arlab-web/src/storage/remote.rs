//! Hosted object storage (`/storage/v1/object`)

use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use arlab_common::config::RemoteConfig;
use arlab_common::{Error, Result};

use super::{encode_path, validate_object_path, Bucket, ObjectStore};

#[derive(Debug, Clone)]
pub struct RemoteObjectStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RemoteObjectStore {
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn upload_url(&self, bucket: Bucket, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            bucket.name(),
            encode_path(path)
        )
    }

    fn public_url(&self, bucket: Bucket, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            bucket.name(),
            encode_path(path)
        )
    }
}

#[async_trait]
impl ObjectStore for RemoteObjectStore {
    async fn upload(
        &self,
        bucket: Bucket,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String> {
        validate_object_path(path)?;

        let size = bytes.len();
        let response = self
            .client
            .post(self.upload_url(bucket, path))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Content-Type", content_type.unwrap_or("application/octet-stream"))
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .map_err(|e| Error::Remote(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Remote(format!("{}: {}", status, body)));
        }

        info!(bucket = %bucket, path, size, "Uploaded object");
        Ok(self.public_url(bucket, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingServer;
    use axum::http::Method;

    #[test]
    fn test_upload_and_public_urls() {
        let store = RemoteObjectStore::new(&RemoteConfig {
            url: "https://example.supabase.co/".to_string(),
            api_key: "anon".to_string(),
        });

        assert_eq!(
            store.upload_url(Bucket::Videos, "abc.mp4"),
            "https://example.supabase.co/storage/v1/object/videos/abc.mp4"
        );
        assert_eq!(
            store.public_url(Bucket::Configs, "markers/laboratorio_de_presión_ab12c.mind"),
            "https://example.supabase.co/storage/v1/object/public/configs/markers/laboratorio_de_presi%C3%B3n_ab12c.mind"
        );
    }

    #[tokio::test]
    async fn test_upload_posts_object_and_returns_public_url() {
        let server = RecordingServer::start(r#"{"Key":"videos/abc123xyz.mp4"}"#).await;
        let store = RemoteObjectStore::new(&RemoteConfig {
            url: server.base_url.clone(),
            api_key: "service-key".to_string(),
        });

        let url = store
            .upload(Bucket::Videos, "abc123xyz.mp4", b"mp4-bytes".to_vec(), Some("video/mp4"))
            .await
            .unwrap();
        assert_eq!(
            url,
            format!("{}/storage/v1/object/public/videos/abc123xyz.mp4", server.base_url)
        );

        let request = server.single();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/storage/v1/object/videos/abc123xyz.mp4");
        assert_eq!(request.header("apikey"), Some("service-key"));
        assert_eq!(request.header("authorization"), Some("Bearer service-key"));
        assert_eq!(request.header("content-type"), Some("video/mp4"));
        assert_eq!(request.header("x-upsert"), Some("false"));
        assert_eq!(request.body, b"mp4-bytes");
    }

    #[tokio::test]
    async fn test_upload_without_content_type_is_octet_stream() {
        let server = RecordingServer::start("{}").await;
        let store = RemoteObjectStore::new(&RemoteConfig {
            url: server.base_url.clone(),
            api_key: "service-key".to_string(),
        });

        store
            .upload(Bucket::Configs, "markers/global_ab12c.mind", b"mind".to_vec(), None)
            .await
            .unwrap();

        let request = server.single();
        assert_eq!(request.path, "/storage/v1/object/configs/markers/global_ab12c.mind");
        assert_eq!(request.header("content-type"), Some("application/octet-stream"));
    }
}
