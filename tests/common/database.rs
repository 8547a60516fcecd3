//! Throwaway SQLite databases for pipeline runs

use earnings_pipeline::database::{DatabaseManager, Table};
use tempfile::TempDir;

/// A SQLite file in its own temporary directory, removed on drop.
pub struct TestDatabase {
    pub manager: DatabaseManager,
    pub url: String,
    _dir: TempDir,
}

impl TestDatabase {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("earnings.db");
        let url = format!("sqlite://{}?mode=rwc", path.display());

        let manager = DatabaseManager::connect(&url)
            .await
            .expect("Failed to open test database");

        Self {
            manager,
            url,
            _dir: dir,
        }
    }

    pub async fn count(&self, table: Table) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(self.manager.pool())
            .await
            .expect("Failed to count rows")
    }

    /// Ids of `table`, sorted.
    pub async fn ids(&self, table: Table) -> Vec<String> {
        sqlx::query_scalar(&format!("SELECT id FROM {} ORDER BY id", table))
            .fetch_all(self.manager.pool())
            .await
            .expect("Failed to read ids")
    }
}
