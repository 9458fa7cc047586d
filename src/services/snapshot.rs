//! Assembly of the combined queue + leaderboard snapshot pushed to viewers.

use indexmap::IndexMap;
use tracing::warn;

use crate::{
    dao::queue_store::QueueStore,
    dto::ws::SnapshotPayload,
    error::ServiceError,
    services::ranking_service,
    state::{SharedState, ViewerConnection, hub},
};

/// Number of leaderboard rows shown per game.
pub const TOP_N: u32 = 5;

/// Compute a fresh snapshot: active queue entries oldest-first plus the
/// top-5 leaderboard of every configured game, in configuration order.
///
/// Takes the write gate for the duration of the reads, so a snapshot never
/// mixes the queue state of one commit with the rankings of a later one.
pub async fn assemble(state: &SharedState) -> Result<SnapshotPayload, ServiceError> {
    let _gate = state.write_gate().lock().await;
    assemble_unlocked(state).await
}

/// Snapshot reads without gate acquisition. Callers must hold the gate.
async fn assemble_unlocked(state: &SharedState) -> Result<SnapshotPayload, ServiceError> {
    let queue_list = state
        .store()
        .active_entries()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let mut ranking_lists = IndexMap::new();
    for game in state.config().games() {
        let rows = ranking_service::top(state, &game.id, TOP_N).await?;
        ranking_lists.insert(game.id.clone(), rows);
    }

    Ok(SnapshotPayload {
        queue_list,
        ranking_lists,
    })
}

/// Recompute the snapshot and fan it out to every live viewer.
///
/// The gate is held across assembly and fan-out, so the frames any single
/// viewer receives are enqueued in commit order. Failures never propagate to
/// the mutating request: a store error here is logged and the viewers simply
/// keep their previous state until the next successful broadcast.
pub async fn broadcast(state: &SharedState) {
    let _gate = state.write_gate().lock().await;
    match assemble_unlocked(state).await {
        Ok(snapshot) => state.hub().broadcast(&snapshot),
        Err(err) => warn!(error = %err, "skipping broadcast: snapshot assembly failed"),
    }
}

/// Register a display connection and push its first snapshot.
///
/// Registration and the initial send happen under the gate, so the first
/// frame cannot be reordered after (or made staler than) a concurrent
/// mutation's broadcast.
pub async fn register_viewer(state: &SharedState, connection: ViewerConnection) {
    let _gate = state.write_gate().lock().await;
    let id = connection.id;
    let mode = connection.mode;
    let tx = connection.tx.clone();
    state.hub().register(connection);

    match assemble_unlocked(state).await {
        Ok(snapshot) => {
            if let Some(frame) = hub::render(&snapshot, mode) {
                let _ = tx.try_send(frame);
            }
        }
        Err(err) => warn!(%id, error = %err, "failed to assemble initial snapshot"),
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use tokio::time::sleep;
    use uuid::Uuid;

    use crate::{
        config::{AppConfig, Game, ScoreOrder},
        dao::sqlite::SqliteStore,
        dto::ws::DeliveryMode,
        state::AppState,
    };

    use super::*;

    async fn test_state() -> SharedState {
        let store = SqliteStore::in_memory().await.unwrap();
        let config = AppConfig::with_games(vec![
            Game {
                id: "2".into(),
                label: "Ring Toss".into(),
                order: ScoreOrder::Descending,
            },
            Game {
                id: "1".into(),
                label: "Target Shot".into(),
                order: ScoreOrder::Descending,
            },
        ]);
        AppState::new(config, Arc::new(store))
    }

    #[tokio::test]
    async fn snapshot_lists_every_configured_game_in_order() {
        let state = test_state().await;
        state
            .store()
            .upsert_ranking("Alice".into(), "1".into(), "010-1".into(), 300)
            .await
            .unwrap();

        let snapshot = assemble(&state).await.unwrap();

        let keys: Vec<&String> = snapshot.ranking_lists.keys().collect();
        assert_eq!(keys, vec!["2", "1"]);
        assert!(snapshot.ranking_lists["2"].is_empty());
        assert_eq!(snapshot.ranking_lists["1"].len(), 1);
    }

    #[tokio::test]
    async fn snapshot_queue_is_oldest_first() {
        let state = test_state().await;
        state
            .store()
            .insert_queue_entry("Bob".into(), "010-2".into(), 20.0)
            .await
            .unwrap();
        state
            .store()
            .insert_queue_entry("Alice".into(), "010-1".into(), 10.0)
            .await
            .unwrap();

        let snapshot = assemble(&state).await.unwrap();
        let names: Vec<&str> = snapshot
            .queue_list
            .iter()
            .map(|entry| entry.name.as_str())
            .collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }

    #[tokio::test]
    async fn assembly_waits_for_in_flight_mutations() {
        let state = test_state().await;
        let gate = state.write_gate().lock().await;

        let assembled = tokio::spawn({
            let state = state.clone();
            async move { assemble(&state).await }
        });
        sleep(Duration::from_millis(50)).await;
        assert!(
            !assembled.is_finished(),
            "snapshot reads must not interleave with a mutation in flight"
        );

        drop(gate);
        assembled.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn initial_frame_waits_for_in_flight_mutation() {
        let state = test_state().await;
        let (tx, mut rx) = tokio::sync::mpsc::channel(4);
        let gate = state.write_gate().lock().await;

        let task = tokio::spawn({
            let state = state.clone();
            async move {
                register_viewer(
                    &state,
                    ViewerConnection {
                        id: Uuid::new_v4(),
                        mode: DeliveryMode::Full,
                        tx,
                    },
                )
                .await
            }
        });
        sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());

        drop(gate);
        task.await.unwrap();
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err(), "exactly one initial frame");
    }
}
