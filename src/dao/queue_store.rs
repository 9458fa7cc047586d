use futures::future::BoxFuture;

use crate::dao::models::{QueueRecord, QueueStatus, RankingRecord};
use crate::dao::storage::StorageResult;

/// Abstraction over the persistence layer for queue entries and rankings.
///
/// Callers are expected to serialize check-then-act sequences themselves (see
/// the write gate on `AppState`); the store only guarantees that each
/// individual operation is atomic.
pub trait QueueStore: Send + Sync {
    /// Insert a fresh waiting entry. Returns `None` when the phone number
    /// already denotes an active entry (unique-constraint violation).
    fn insert_queue_entry(
        &self,
        name: String,
        phone_number: String,
        registered_at: f64,
    ) -> BoxFuture<'static, StorageResult<Option<i64>>>;

    /// The waiting entry with the smallest `registered_at`, ties broken by
    /// insertion order.
    fn select_oldest_waiting(&self) -> BoxFuture<'static, StorageResult<Option<QueueRecord>>>;

    /// Look up an entry by phone number regardless of status.
    fn find_by_phone(
        &self,
        phone_number: String,
    ) -> BoxFuture<'static, StorageResult<Option<QueueRecord>>>;

    /// Flip the status of an entry.
    fn update_status(
        &self,
        id: i64,
        status: QueueStatus,
    ) -> BoxFuture<'static, StorageResult<()>>;

    /// Remove an entry without recording a score. Returns the removed name,
    /// or `None` when the phone number is unknown.
    fn delete_by_phone(
        &self,
        phone_number: String,
    ) -> BoxFuture<'static, StorageResult<Option<String>>>;

    /// All active entries ordered oldest-first.
    fn active_entries(&self) -> BoxFuture<'static, StorageResult<Vec<QueueRecord>>>;

    /// Remove the queue entry for `phone_number` and upsert its ranking row
    /// in a single transaction. Returns the removed name, or `None` when the
    /// phone number is unknown (in which case nothing is written).
    fn complete_entry(
        &self,
        phone_number: String,
        game: String,
        score: i64,
    ) -> BoxFuture<'static, StorageResult<Option<String>>>;

    /// Insert or replace the score for `(name, game, phone_number)`.
    fn upsert_ranking(
        &self,
        name: String,
        game: String,
        phone_number: String,
        score: i64,
    ) -> BoxFuture<'static, StorageResult<()>>;

    /// Top `n` rows for a game, score-descending. Unknown games yield an
    /// empty list.
    fn top_n_by_game(
        &self,
        game: String,
        n: u32,
    ) -> BoxFuture<'static, StorageResult<Vec<RankingRecord>>>;

    /// Every ranking row across all games, ordered by `(game, score desc)`.
    fn all_rankings(&self) -> BoxFuture<'static, StorageResult<Vec<RankingRecord>>>;

    /// Delete the first row matching the exact `(name, game, score)` triple.
    /// Returns whether a row was found.
    fn delete_ranking(
        &self,
        name: String,
        game: String,
        score: i64,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    /// Cheap connectivity probe for the health endpoint.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
