//! Hosted backend over the PostgREST query protocol
//!
//! Talks to `<url>/rest/v1/<table>` with the project key sent both as the
//! `apikey` header and as a bearer token, which is what hosted Postgres
//! services such as Supabase expect.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};

use arlab_common::config::RemoteConfig;
use arlab_common::{Asset, Error, LabConfig, LabKey, Result};

use super::{rows_to_models, AssetBackend, AssetRow, LabConfigBackend, LabConfigRow};

const ASSETS_TABLE: &str = "assets";
const CONFIG_TABLE: &str = "lab_configs";

#[derive(Debug, Clone)]
pub struct RestBackend {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestBackend {
    pub fn new(config: &RemoteConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &RemoteConfig) -> Self {
        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| Error::Remote(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Error::Remote(format!("{}: {}", status, body)))
        }
    }

    async fn fetch_rows<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Vec<T>> {
        self.send(request)
            .await?
            .json::<Vec<T>>()
            .await
            .map_err(|e| Error::Remote(format!("Invalid response body: {}", e)))
    }
}

/// `eq.` filter value for a PostgREST query string
pub(crate) fn eq_filter(value: &str) -> String {
    format!("eq.{}", value)
}

#[async_trait]
impl AssetBackend for RestBackend {
    async fn list_assets(&self) -> Result<Vec<Asset>> {
        let request = self
            .client
            .get(self.table_url(ASSETS_TABLE))
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        let rows: Vec<AssetRow> = self.fetch_rows(request).await?;
        Ok(rows_to_models(rows, ASSETS_TABLE))
    }

    async fn insert_asset(&self, asset: &Asset) -> Result<()> {
        let request = self
            .client
            .post(self.table_url(ASSETS_TABLE))
            .header("Prefer", "return=minimal")
            .json(&[AssetRow::from(asset)]);
        self.send(request).await?;
        Ok(())
    }

    async fn delete_asset(&self, id: &str) -> Result<()> {
        let request = self
            .client
            .delete(self.table_url(ASSETS_TABLE))
            .query(&[("id", eq_filter(id))]);
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl LabConfigBackend for RestBackend {
    async fn get_lab_config(&self, key: LabKey) -> Result<Option<LabConfig>> {
        let request = self
            .client
            .get(self.table_url(CONFIG_TABLE))
            .query(&[("select", "*".to_string()), ("lab_name", eq_filter(key.name()))]);
        let rows: Vec<LabConfigRow> = self.fetch_rows(request).await?;
        rows.into_iter().next().map(LabConfig::try_from).transpose()
    }

    async fn upsert_lab_config(&self, key: LabKey, marker_url: &str) -> Result<()> {
        let row = LabConfigRow {
            lab_name: key.name().to_string(),
            marker_url: Some(marker_url.to_string()),
        };
        let request = self
            .client
            .post(self.table_url(CONFIG_TABLE))
            .query(&[("on_conflict", "lab_name")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&row);
        self.send(request).await?;
        Ok(())
    }

    async fn list_lab_configs(&self) -> Result<Vec<LabConfig>> {
        let request = self
            .client
            .get(self.table_url(CONFIG_TABLE))
            .query(&[("select", "*")]);
        let rows: Vec<LabConfigRow> = self.fetch_rows(request).await?;
        Ok(rows_to_models(rows, CONFIG_TABLE))
    }
}
