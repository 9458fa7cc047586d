//! SQLite implementation of the queue store, backed by sqlx.

use std::str::FromStr;

use futures::future::BoxFuture;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::dao::models::{QueueRecord, QueueStatus, RankingRecord};
use crate::dao::queue_store::QueueStore;
use crate::dao::storage::{StorageError, StorageResult};

/// Store handle wrapping a connection pool.
///
/// The pool is capped at a single connection: combined with the service-level
/// write gate this gives single-writer semantics, which is all the expected
/// load requires.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

/// Open (and create if missing) the database at `url` and bootstrap the
/// schema.
pub async fn connect(url: &str) -> StorageResult<SqliteStore> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(|err| StorageError::unavailable(format!("invalid database url `{url}`"), err))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|err| StorageError::unavailable("failed to open database".into(), err))?;

    ensure_schema(&pool).await?;
    info!(%url, "sqlite store ready");

    Ok(SqliteStore { pool })
}

/// Create the queue and rankings tables when they do not exist yet.
async fn ensure_schema(pool: &SqlitePool) -> StorageResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS queue (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            phone_number TEXT UNIQUE NOT NULL,
            registered_at REAL NOT NULL,
            status TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(schema_err)?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS rankings (
            name TEXT NOT NULL,
            phone_number TEXT NOT NULL,
            game TEXT NOT NULL,
            score INTEGER NOT NULL,
            PRIMARY KEY (name, game, phone_number)
        )",
    )
    .execute(pool)
    .await
    .map_err(schema_err)?;

    Ok(())
}

fn schema_err(err: sqlx::Error) -> StorageError {
    StorageError::unavailable("failed to bootstrap schema".into(), err)
}

fn query_err(err: sqlx::Error) -> StorageError {
    StorageError::unavailable("query failed".into(), err)
}

impl SqliteStore {
    /// Open an in-memory store, used by tests.
    #[cfg(test)]
    pub async fn in_memory() -> StorageResult<Self> {
        connect("sqlite::memory:").await
    }
}

impl QueueStore for SqliteStore {
    fn insert_queue_entry(
        &self,
        name: String,
        phone_number: String,
        registered_at: f64,
    ) -> BoxFuture<'static, StorageResult<Option<i64>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query(
                "INSERT INTO queue (name, phone_number, registered_at, status)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(&name)
            .bind(&phone_number)
            .bind(registered_at)
            .bind(QueueStatus::Waiting)
            .execute(&pool)
            .await;

            match result {
                Ok(outcome) => Ok(Some(outcome.last_insert_rowid())),
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Ok(None),
                Err(err) => Err(query_err(err)),
            }
        })
    }

    fn select_oldest_waiting(&self) -> BoxFuture<'static, StorageResult<Option<QueueRecord>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query_as::<_, QueueRecord>(
                "SELECT id, name, phone_number, registered_at, status FROM queue
                 WHERE status = 'waiting'
                 ORDER BY registered_at ASC, id ASC LIMIT 1",
            )
            .fetch_optional(&pool)
            .await
            .map_err(query_err)
        })
    }

    fn find_by_phone(
        &self,
        phone_number: String,
    ) -> BoxFuture<'static, StorageResult<Option<QueueRecord>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query_as::<_, QueueRecord>(
                "SELECT id, name, phone_number, registered_at, status FROM queue
                 WHERE phone_number = ?",
            )
            .bind(&phone_number)
            .fetch_optional(&pool)
            .await
            .map_err(query_err)
        })
    }

    fn update_status(
        &self,
        id: i64,
        status: QueueStatus,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query("UPDATE queue SET status = ? WHERE id = ?")
                .bind(status)
                .bind(id)
                .execute(&pool)
                .await
                .map_err(query_err)?;
            Ok(())
        })
    }

    fn delete_by_phone(
        &self,
        phone_number: String,
    ) -> BoxFuture<'static, StorageResult<Option<String>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let row: Option<(String,)> =
                sqlx::query_as("DELETE FROM queue WHERE phone_number = ? RETURNING name")
                    .bind(&phone_number)
                    .fetch_optional(&pool)
                    .await
                    .map_err(query_err)?;
            Ok(row.map(|(name,)| name))
        })
    }

    fn active_entries(&self) -> BoxFuture<'static, StorageResult<Vec<QueueRecord>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query_as::<_, QueueRecord>(
                "SELECT id, name, phone_number, registered_at, status FROM queue
                 WHERE status IN ('waiting', 'called')
                 ORDER BY registered_at ASC, id ASC",
            )
            .fetch_all(&pool)
            .await
            .map_err(query_err)
        })
    }

    fn complete_entry(
        &self,
        phone_number: String,
        game: String,
        score: i64,
    ) -> BoxFuture<'static, StorageResult<Option<String>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let mut tx = pool.begin().await.map_err(query_err)?;

            let removed: Option<(String,)> =
                sqlx::query_as("DELETE FROM queue WHERE phone_number = ? RETURNING name")
                    .bind(&phone_number)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(query_err)?;

            let Some((name,)) = removed else {
                // Unknown phone: nothing to complete, leave the store untouched.
                tx.rollback().await.map_err(query_err)?;
                return Ok(None);
            };

            sqlx::query(
                "INSERT INTO rankings (name, phone_number, game, score)
                 VALUES (?, ?, ?, ?)
                 ON CONFLICT (name, game, phone_number)
                 DO UPDATE SET score = excluded.score",
            )
            .bind(&name)
            .bind(&phone_number)
            .bind(&game)
            .bind(score)
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;

            tx.commit().await.map_err(query_err)?;
            Ok(Some(name))
        })
    }

    fn upsert_ranking(
        &self,
        name: String,
        game: String,
        phone_number: String,
        score: i64,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query(
                "INSERT INTO rankings (name, phone_number, game, score)
                 VALUES (?, ?, ?, ?)
                 ON CONFLICT (name, game, phone_number)
                 DO UPDATE SET score = excluded.score",
            )
            .bind(&name)
            .bind(&phone_number)
            .bind(&game)
            .bind(score)
            .execute(&pool)
            .await
            .map_err(query_err)?;
            Ok(())
        })
    }

    fn top_n_by_game(
        &self,
        game: String,
        n: u32,
    ) -> BoxFuture<'static, StorageResult<Vec<RankingRecord>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query_as::<_, RankingRecord>(
                "SELECT name, phone_number, game, score FROM rankings
                 WHERE game = ?
                 ORDER BY score DESC, name ASC LIMIT ?",
            )
            .bind(&game)
            .bind(n)
            .fetch_all(&pool)
            .await
            .map_err(query_err)
        })
    }

    fn all_rankings(&self) -> BoxFuture<'static, StorageResult<Vec<RankingRecord>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query_as::<_, RankingRecord>(
                "SELECT name, phone_number, game, score FROM rankings
                 ORDER BY game ASC, score DESC, name ASC",
            )
            .fetch_all(&pool)
            .await
            .map_err(query_err)
        })
    }

    fn delete_ranking(
        &self,
        name: String,
        game: String,
        score: i64,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            // Value-match delete; the rowid subselect guarantees at most one
            // row goes away even when duplicate scores match.
            let outcome = sqlx::query(
                "DELETE FROM rankings WHERE rowid IN (
                     SELECT rowid FROM rankings
                     WHERE name = ? AND game = ? AND score = ?
                     ORDER BY rowid ASC LIMIT 1
                 )",
            )
            .bind(&name)
            .bind(&game)
            .bind(score)
            .execute(&pool)
            .await
            .map_err(query_err)?;
            Ok(outcome.rows_affected() > 0)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&pool)
                .await
                .map_err(query_err)?;
            Ok(())
        })
    }
}
