use std::path::Path;

use futures::TryStreamExt;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};

use crate::rrf::{TableSchema, INDEXES, TABLES};
use crate::{Error, Result};

/// The relational staging store. Owns the SQLite pool for its whole
/// lifetime; callers hand it back through `close` or `destroy` rather than
/// letting connections linger.
pub struct Staging {
    pool: Pool<Sqlite>,
}

impl Staging {
    /// Create a fresh staging database at `path`, replacing any previous
    /// one. A run always recomputes from scratch.
    pub async fn create(path: &Path) -> Result<Self> {
        if path.exists() {
            tokio::fs::remove_file(path).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&format!("sqlite:{}?mode=rwc", path.display()))
            .await?;

        let staging = Self { pool };
        if let Err(err) = staging.init_schema().await {
            staging.pool.close().await;
            let _ = std::fs::remove_file(path);
            return Err(err);
        }

        Ok(staging)
    }

    /// Open an already-populated staging database.
    pub async fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::StoreNotFound {
                path: path.to_path_buf(),
            });
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&format!("sqlite:{}", path.display()))
            .await?;

        Ok(Self { pool })
    }

    pub async fn open_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let staging = Self { pool };
        staging.init_schema().await?;
        Ok(staging)
    }

    async fn init_schema(&self) -> Result<()> {
        for schema in &TABLES {
            sqlx::query(&schema.create_sql()).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert a batch of rows into one table inside a single transaction.
    pub async fn insert_all(&self, schema: &TableSchema, rows: &[Vec<String>]) -> Result<u64> {
        let sql = schema.insert_sql();
        let mut tx = self.pool.begin().await?;
        for row in rows {
            let mut query = sqlx::query(&sql);
            for field in row {
                query = query.bind(field);
            }
            query.execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(rows.len() as u64)
    }

    pub async fn create_indexes(&self) -> Result<()> {
        for (name, table, column) in &INDEXES {
            sqlx::query(&format!("CREATE INDEX IF NOT EXISTS {name} ON {table} ({column});"))
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    pub async fn table_count(&self, table: &str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table};"))
            .fetch_one(&self.pool)
            .await?;
        Ok(count.unsigned_abs())
    }

    /// Run a read-only query and materialize every row as strings, with
    /// NULL mapped to the empty string (the graph import format has no
    /// null marker).
    pub async fn fetch_rows(&self, sql: &str) -> Result<Vec<Vec<String>>> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_fields).collect()
    }

    /// Stream a read-only query row by row, without materializing the full
    /// result set. Used for the hierarchy walk, where result volume scales
    /// with path count.
    pub async fn for_each_row<F>(&self, sql: &str, mut f: F) -> Result<()>
    where
        F: FnMut(Vec<String>) -> Result<()>,
    {
        let mut rows = sqlx::query(sql).fetch(&self.pool);
        while let Some(row) = rows.try_next().await? {
            f(row_to_fields(&row)?)?;
        }
        Ok(())
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Close the pool and delete the backing file. Used when a failed load
    /// must not leave a half-populated store behind.
    pub async fn destroy(self, path: &Path) -> Result<()> {
        self.pool.close().await;
        if path.exists() {
            tokio::fs::remove_file(path).await?;
        }
        Ok(())
    }
}

fn row_to_fields(row: &SqliteRow) -> Result<Vec<String>> {
    (0..row.len())
        .map(|i| {
            let value: Option<String> = row.try_get(i)?;
            Ok(value.unwrap_or_default())
        })
        .collect()
}
