//! Database initialization
//!
//! Creates the database file on first run and makes sure the two content
//! tables exist. Every step is idempotent, so this runs on each startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL keeps page reads available while an admin write is in flight
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create every table used by the service
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_assets_table(pool).await?;
    create_lab_configs_table(pool).await?;
    Ok(())
}

/// Create the assets table
///
/// `created_at` carries millisecond precision so listings order reliably
/// when several assets are added within the same second.
pub async fn create_assets_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS assets (
            id TEXT PRIMARY KEY,
            lab TEXT NOT NULL,
            title TEXT NOT NULL,
            image_name TEXT NOT NULL,
            image_url TEXT NOT NULL,
            video_url TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_assets_created_at ON assets(created_at)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the lab_configs table
///
/// One row per key; `lab_name` is either a laboratory name or `Global`.
pub async fn create_lab_configs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS lab_configs (
            lab_name TEXT PRIMARY KEY,
            marker_url TEXT,
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_database_creates_file_and_tables() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("arlab.db");

        let pool = init_database(&db_path).await.unwrap();
        assert!(db_path.exists());

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        let names: Vec<_> = tables.into_iter().map(|(n,)| n).collect();
        assert_eq!(names, vec!["assets".to_string(), "lab_configs".to_string()]);
    }

    #[tokio::test]
    async fn test_create_schema_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database(&dir.path().join("arlab.db")).await.unwrap();

        create_schema(&pool).await.unwrap();
        create_schema(&pool).await.unwrap();
    }
}
