//! Registry of live display connections and the broadcast fan-out.

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::dto::ws::{DeliveryMode, SnapshotPayload};

/// Outbound frames buffered per viewer before it counts as stalled.
pub const VIEWER_BUFFER: usize = 32;

#[derive(Clone)]
/// Handle used to push snapshots to a connected display.
pub struct ViewerConnection {
    pub id: Uuid,
    pub mode: DeliveryMode,
    pub tx: mpsc::Sender<Message>,
}

/// Set of live viewer connections, keyed by connection id.
///
/// Mutation is safe from within a broadcast's own iteration: the sender list
/// is snapshotted before any send happens.
#[derive(Default)]
pub struct ViewerHub {
    viewers: DashMap<Uuid, ViewerConnection>,
}

impl ViewerHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an established connection under its id.
    pub fn register(&self, connection: ViewerConnection) {
        debug!(id = %connection.id, mode = ?connection.mode, "viewer registered");
        self.viewers.insert(connection.id, connection);
    }

    /// Remove a connection. A no-op when the id is already gone.
    pub fn deregister(&self, id: &Uuid) {
        if self.viewers.remove(id).is_some() {
            debug!(id = %id, "viewer deregistered");
        }
    }

    /// Number of currently registered viewers.
    pub fn len(&self) -> usize {
        self.viewers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.viewers.is_empty()
    }

    /// Push the mode-appropriate projection of `snapshot` to every viewer.
    ///
    /// Best effort: a viewer whose channel is closed or whose buffer is full
    /// (a stalled display that stopped draining) is dropped from the
    /// registry and delivery continues with the rest. Each projection is
    /// serialized once per broadcast, not once per viewer.
    pub fn broadcast(&self, snapshot: &SnapshotPayload) {
        if self.viewers.is_empty() {
            return;
        }

        let full = render(snapshot, DeliveryMode::Full);
        let queue_only = render(snapshot, DeliveryMode::QueueOnly);

        let recipients: Vec<ViewerConnection> = self
            .viewers
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        for viewer in recipients {
            let frame = match viewer.mode {
                DeliveryMode::Full => full.clone(),
                DeliveryMode::QueueOnly => queue_only.clone(),
            };
            let Some(frame) = frame else { continue };

            if viewer.tx.try_send(frame).is_err() {
                warn!(id = %viewer.id, "viewer gone or backlogged, pruning connection");
                self.viewers.remove(&viewer.id);
            }
        }
    }
}

/// Serialize the projection of a snapshot for the given delivery mode.
///
/// Returns `None` when serialization fails, which is logged and treated as a
/// skipped delivery rather than an error.
pub fn render(snapshot: &SnapshotPayload, mode: DeliveryMode) -> Option<Message> {
    let serialized = match mode {
        DeliveryMode::Full => serde_json::to_string(snapshot),
        DeliveryMode::QueueOnly => serde_json::to_string(&snapshot.queue_only()),
    };
    match serialized {
        Ok(text) => Some(Message::Text(text.into())),
        Err(err) => {
            warn!(error = %err, "failed to serialize snapshot");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn empty_snapshot() -> SnapshotPayload {
        SnapshotPayload {
            queue_list: Vec::new(),
            ranking_lists: IndexMap::new(),
        }
    }

    fn connect(hub: &ViewerHub, mode: DeliveryMode) -> (Uuid, mpsc::Receiver<Message>) {
        connect_with_buffer(hub, mode, VIEWER_BUFFER)
    }

    fn connect_with_buffer(
        hub: &ViewerHub,
        mode: DeliveryMode,
        buffer: usize,
    ) -> (Uuid, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(buffer);
        let id = Uuid::new_v4();
        hub.register(ViewerConnection { id, mode, tx });
        (id, rx)
    }

    #[test]
    fn deregister_of_unknown_id_is_noop() {
        let hub = ViewerHub::new();
        hub.deregister(&Uuid::new_v4());
        assert!(hub.is_empty());
    }

    #[test]
    fn broadcast_reaches_every_registered_viewer() {
        let hub = ViewerHub::new();
        let (_, mut rx_a) = connect(&hub, DeliveryMode::Full);
        let (_, mut rx_b) = connect(&hub, DeliveryMode::QueueOnly);

        hub.broadcast(&empty_snapshot());

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
    }

    #[test]
    fn queue_only_viewer_never_sees_rankings() {
        let hub = ViewerHub::new();
        let (_, mut rx) = connect(&hub, DeliveryMode::QueueOnly);

        hub.broadcast(&empty_snapshot());

        let Ok(Message::Text(text)) = rx.try_recv() else {
            panic!("expected a text frame");
        };
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value.get("ranking_lists").is_none());
        assert!(value.get("queue_list").is_some());
    }

    #[test]
    fn failed_send_prunes_viewer_and_delivery_continues() {
        let hub = ViewerHub::new();
        let (_, rx_dead) = connect(&hub, DeliveryMode::Full);
        drop(rx_dead);
        let (_, mut rx_live) = connect(&hub, DeliveryMode::Full);

        hub.broadcast(&empty_snapshot());

        assert_eq!(hub.len(), 1);
        assert!(rx_live.try_recv().is_ok());
    }

    #[test]
    fn stalled_viewer_with_full_backlog_is_pruned() {
        let hub = ViewerHub::new();
        let (_, mut rx) = connect_with_buffer(&hub, DeliveryMode::Full, 1);

        hub.broadcast(&empty_snapshot());
        hub.broadcast(&empty_snapshot());

        assert!(hub.is_empty());
        // The frame that fit is still deliverable.
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }
}
