//! SQLite backend

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use arlab_common::{Asset, LabConfig, LabKey, Result};

use super::{rows_to_models, AssetBackend, AssetRow, LabConfigBackend, LabConfigRow};

/// Tables in the local SQLite database
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl AssetBackend for SqliteBackend {
    async fn list_assets(&self) -> Result<Vec<Asset>> {
        let rows = sqlx::query(
            r#"
            SELECT id, lab, title, image_name, image_url, video_url
            FROM assets
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let rows = rows
            .into_iter()
            .map(|row| AssetRow {
                id: row.get("id"),
                lab: row.get("lab"),
                title: row.get("title"),
                image_name: row.get("image_name"),
                image_url: row.get("image_url"),
                video_url: row.get("video_url"),
            })
            .collect();

        Ok(rows_to_models(rows, "assets"))
    }

    async fn insert_asset(&self, asset: &Asset) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO assets (id, lab, title, image_name, image_url, video_url)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&asset.id)
        .bind(asset.lab.name())
        .bind(&asset.title)
        .bind(&asset.image_name)
        .bind(&asset.image_url)
        .bind(&asset.video_url)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_asset(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM assets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl LabConfigBackend for SqliteBackend {
    async fn get_lab_config(&self, key: LabKey) -> Result<Option<LabConfig>> {
        let row: Option<(String, Option<String>)> =
            sqlx::query_as("SELECT lab_name, marker_url FROM lab_configs WHERE lab_name = ?")
                .bind(key.name())
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(lab_name, marker_url)| LabConfig::try_from(LabConfigRow { lab_name, marker_url }))
            .transpose()
    }

    async fn upsert_lab_config(&self, key: LabKey, marker_url: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO lab_configs (lab_name, marker_url)
            VALUES (?, ?)
            ON CONFLICT(lab_name) DO UPDATE SET
                marker_url = excluded.marker_url,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            "#,
        )
        .bind(key.name())
        .bind(marker_url)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_lab_configs(&self) -> Result<Vec<LabConfig>> {
        let rows: Vec<(String, Option<String>)> =
            sqlx::query_as("SELECT lab_name, marker_url FROM lab_configs ORDER BY lab_name")
                .fetch_all(&self.pool)
                .await?;

        let rows = rows
            .into_iter()
            .map(|(lab_name, marker_url)| LabConfigRow { lab_name, marker_url })
            .collect();

        Ok(rows_to_models(rows, "lab_configs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arlab_common::Laboratory;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_backend() -> SqliteBackend {
        // Single connection: every connection to :memory: is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        arlab_common::db::create_schema(&pool).await.unwrap();
        SqliteBackend::new(pool)
    }

    fn asset(id: &str, title: &str) -> Asset {
        Asset {
            id: id.to_string(),
            lab: Laboratory::Mass,
            title: title.to_string(),
            image_name: arlab_common::labs::slugify(title),
            image_url: format!("{}.png", id),
            video_url: format!("{}.mp4", id),
        }
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let backend = setup_backend().await;
        backend.insert_asset(&asset("a1", "Balanza")).await.unwrap();
        backend.insert_asset(&asset("a2", "Pesas")).await.unwrap();
        backend.insert_asset(&asset("a3", "Comparador")).await.unwrap();

        let ids: Vec<_> = backend
            .list_assets()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["a3", "a2", "a1"]);
    }

    #[tokio::test]
    async fn test_insert_then_list_preserves_fields() {
        let backend = setup_backend().await;
        let a1 = asset("a1", "Balanza");
        backend.insert_asset(&a1).await.unwrap();

        let listed = backend.list_assets().await.unwrap();
        assert_eq!(listed, vec![a1]);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let backend = setup_backend().await;
        backend.insert_asset(&asset("a1", "Balanza")).await.unwrap();

        let result = backend.insert_asset(&asset("a1", "Otra")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_delete_removes_and_tolerates_unknown_id() {
        let backend = setup_backend().await;
        backend.insert_asset(&asset("a1", "Balanza")).await.unwrap();
        backend.insert_asset(&asset("a2", "Pesas")).await.unwrap();

        backend.delete_asset("a1").await.unwrap();
        backend.delete_asset("missing").await.unwrap();

        let listed = backend.list_assets().await.unwrap();
        assert!(listed.iter().all(|a| a.id != "a1"));
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_rows_with_unknown_lab_are_skipped() {
        let backend = setup_backend().await;
        backend.insert_asset(&asset("a1", "Balanza")).await.unwrap();
        sqlx::query(
            "INSERT INTO assets (id, lab, title, image_name, image_url, video_url) \
             VALUES ('x', 'Laboratorio X', 't', 't', 'i', 'v')",
        )
        .execute(backend.pool())
        .await
        .unwrap();

        let listed = backend.list_assets().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "a1");
    }

    #[tokio::test]
    async fn test_lab_config_absent_is_none() {
        let backend = setup_backend().await;
        let config = backend.get_lab_config(LabKey::Global).await.unwrap();
        assert!(config.is_none());
    }

    #[tokio::test]
    async fn test_upsert_last_write_wins() {
        let backend = setup_backend().await;
        let key = LabKey::Lab(Laboratory::Temperature);

        backend.upsert_lab_config(key, "url1.mind").await.unwrap();
        backend.upsert_lab_config(key, "url2.mind").await.unwrap();

        let config = backend.get_lab_config(key).await.unwrap().unwrap();
        assert_eq!(config.lab_name, key);
        assert_eq!(config.marker_url.as_deref(), Some("url2.mind"));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lab_configs")
            .fetch_one(backend.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_list_lab_configs() {
        let backend = setup_backend().await;
        backend.upsert_lab_config(LabKey::Global, "g.mind").await.unwrap();
        backend
            .upsert_lab_config(LabKey::Lab(Laboratory::Mass), "m.mind")
            .await
            .unwrap();

        let configs = backend.list_lab_configs().await.unwrap();
        assert_eq!(configs.len(), 2);
        assert!(configs.iter().any(|c| c.lab_name == LabKey::Global));
    }
}
