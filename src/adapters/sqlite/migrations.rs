//! Embedded schema migrations.
//!
//! Applied versions are recorded in `schema_migrations`; each pending
//! migration runs in its own transaction together with its bookkeeping row.

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Failed to execute migration {version}: {source}")]
    ExecutionError {
        version: i64,
        #[source]
        source: sqlx::Error,
    },
    #[error("Failed to get schema version: {0}")]
    VersionCheckError(#[source] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub sql: &'static str,
}

pub struct Migrator {
    pool: SqlitePool,
}

impl Migrator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Apply every migration newer than the recorded version. Returns how
    /// many were applied.
    pub async fn run(&self, migrations: &[Migration]) -> Result<usize, MigrationError> {
        self.ensure_migrations_table().await?;
        let current = self.current_version().await?;

        let mut applied = 0;
        for migration in migrations.iter().filter(|m| m.version > current) {
            self.apply(migration).await?;
            applied += 1;
        }
        Ok(applied)
    }

    async fn ensure_migrations_table(&self) -> Result<(), MigrationError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now')),
                description TEXT
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|source| MigrationError::ExecutionError { version: 0, source })?;
        Ok(())
    }

    pub async fn current_version(&self) -> Result<i64, MigrationError> {
        let (version,): (i64,) =
            sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
                .fetch_one(&self.pool)
                .await
                .map_err(MigrationError::VersionCheckError)?;
        Ok(version)
    }

    async fn apply(&self, migration: &Migration) -> Result<(), MigrationError> {
        let version = migration.version;
        let wrap = |source: sqlx::Error| MigrationError::ExecutionError { version, source };

        let mut tx = self.pool.begin().await.map_err(wrap)?;
        sqlx::raw_sql(migration.sql)
            .execute(&mut *tx)
            .await
            .map_err(wrap)?;
        sqlx::query("INSERT INTO schema_migrations (version, description) VALUES (?, ?)")
            .bind(version)
            .bind(migration.description)
            .execute(&mut *tx)
            .await
            .map_err(wrap)?;
        tx.commit().await.map_err(wrap)?;

        info!(version, description = migration.description, "applied migration");
        Ok(())
    }
}

pub fn all_embedded_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema",
        sql: include_str!("../../../migrations/001_initial_schema.sql"),
    }]
}
