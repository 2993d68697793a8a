//! Database module for SQLite persistence.
//!
//! SQLite holds the configuration singleton; every write is a single
//! conditional statement, so a row is never left half-updated.

mod store;

pub use store::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // The CHECK keeps the table a singleton. nav_config .. pages are the
    // legacy live columns; only publish writes them.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS site_config (
            singleton INTEGER PRIMARY KEY CHECK (singleton = 1),
            id TEXT NOT NULL,
            draft_json TEXT,
            published_json TEXT,
            published_version INTEGER NOT NULL DEFAULT 0,
            published_at TEXT,
            updated_at TEXT NOT NULL,
            created_at TEXT NOT NULL,
            revision INTEGER NOT NULL DEFAULT 1,
            nav_config TEXT,
            home_sections TEXT,
            theme TEXT,
            seo TEXT,
            pages TEXT
        );
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
