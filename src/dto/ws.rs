use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::dto::{queue::QueueEntryDto, ranking::RankingEntryDto};

/// Per-connection tag selecting how much of the snapshot a viewer receives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryMode {
    /// Active queue plus per-game leaderboards.
    #[default]
    Full,
    /// Active queue only.
    QueueOnly,
}

/// Query parameters accepted by the WebSocket upgrade endpoint.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct WsQuery {
    #[serde(default)]
    pub mode: DeliveryMode,
}

/// Full snapshot pushed to `full` viewers: the active queue plus the top-5
/// leaderboard of every configured game, in configuration order.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct SnapshotPayload {
    pub queue_list: Vec<QueueEntryDto>,
    #[schema(value_type = Object)]
    pub ranking_lists: IndexMap<String, Vec<RankingEntryDto>>,
}

/// Reduced snapshot pushed to `queue-only` viewers. Deliberately carries no
/// ranking field at all rather than an empty one.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct QueueSnapshotPayload {
    pub queue_list: Vec<QueueEntryDto>,
}

impl SnapshotPayload {
    /// Project the snapshot down to the queue-only payload.
    pub fn queue_only(&self) -> QueueSnapshotPayload {
        QueueSnapshotPayload {
            queue_list: self.queue_list.clone(),
        }
    }
}
