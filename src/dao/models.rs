//! Database entity definitions shared by the store trait and its backends.

use serde::Serialize;

/// Lifecycle state of a queue row. Completed and cancelled entries are
/// deleted outright, so only the two live states exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, sqlx::Type, utoipa::ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Waiting,
    Called,
}

/// A single walk-in registration as persisted in the `queue` table.
#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct QueueRecord {
    pub id: i64,
    pub name: String,
    pub phone_number: String,
    /// UNIX timestamp in seconds, fractional.
    pub registered_at: f64,
    pub status: QueueStatus,
}

/// A leaderboard row keyed by `(name, game, phone_number)`.
#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct RankingRecord {
    pub name: String,
    pub phone_number: String,
    pub game: String,
    pub score: i64,
}
