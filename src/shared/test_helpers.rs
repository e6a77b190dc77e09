use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tempfile::TempDir;

use crate::core::database;

/// In-memory database with the schema applied.
///
/// Every connection to `sqlite::memory:` opens its own empty database, so the
/// pool is pinned to a single connection that is never recycled.
pub async fn create_test_pool() -> SqlitePool {
    let options = database::connect_options("sqlite::memory:").unwrap();
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();

    database::run_migrations(&pool).await.unwrap();
    pool
}

/// File-backed WAL database shared by several connections, so requests
/// really run side by side. The file lives as long as the returned value.
pub struct FileTestDb {
    pub pool: SqlitePool,
    _dir: TempDir,
}

pub async fn create_file_test_pool(max_connections: u32) -> FileTestDb {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("expenses.db").display());
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(database::connect_options(&url).unwrap())
        .await
        .unwrap();

    database::run_migrations(&pool).await.unwrap();
    FileTestDb { pool, _dir: dir }
}
