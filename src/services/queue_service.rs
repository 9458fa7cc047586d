//! Queue operations: register, call, complete and cancel.
//!
//! Every mutating operation takes the state's write gate around its
//! check-then-act sequence, commits, releases the gate and then broadcasts a
//! fresh snapshot before returning to the caller.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::info;

use crate::{
    dao::models::{QueueRecord, QueueStatus},
    dao::queue_store::QueueStore,
    dto::queue::{CalledResponse, CompleteRequest, QueueEntryDto, RegisterRequest},
    error::ServiceError,
    services::snapshot,
    state::SharedState,
};

/// Register a visitor in the waiting queue.
///
/// Fails with `Conflict` when the phone number already denotes an active
/// entry. Re-registration after completion or cancellation is allowed.
pub async fn register(
    state: &SharedState,
    request: RegisterRequest,
) -> Result<QueueEntryDto, ServiceError> {
    let RegisterRequest { name, phone_number } = request;

    let entry = {
        let _gate = state.write_gate().lock().await;
        let registered_at = unix_now();
        let Some(id) = state
            .store()
            .insert_queue_entry(name.clone(), phone_number.clone(), registered_at)
            .await?
        else {
            return Err(ServiceError::Conflict(format!(
                "phone number `{phone_number}` is already registered"
            )));
        };

        QueueRecord {
            id,
            name,
            phone_number,
            registered_at,
            status: QueueStatus::Waiting,
        }
    };

    info!(id = entry.id, name = %entry.name, "visitor registered");
    snapshot::broadcast(state).await;
    Ok(entry.into())
}

/// Call the visitor who has been waiting the longest.
pub async fn call_next(state: &SharedState) -> Result<CalledResponse, ServiceError> {
    let entry = {
        let _gate = state.write_gate().lock().await;
        let Some(entry) = state.store().select_oldest_waiting().await? else {
            return Err(ServiceError::NotFound("no visitor is waiting".into()));
        };
        state
            .store()
            .update_status(entry.id, QueueStatus::Called)
            .await?;
        entry
    };

    info!(id = entry.id, name = %entry.name, "visitor called");
    snapshot::broadcast(state).await;
    Ok(CalledResponse {
        called_name: entry.name,
        phone_number: entry.phone_number,
    })
}

/// Call a specific visitor by phone number, regardless of current status.
/// Idempotent when the visitor has already been called.
pub async fn call_specific(
    state: &SharedState,
    phone_number: &str,
) -> Result<CalledResponse, ServiceError> {
    let entry = {
        let _gate = state.write_gate().lock().await;
        let Some(entry) = state.store().find_by_phone(phone_number.into()).await? else {
            return Err(unknown_phone(phone_number));
        };
        if entry.status != QueueStatus::Called {
            state
                .store()
                .update_status(entry.id, QueueStatus::Called)
                .await?;
        }
        entry
    };

    info!(id = entry.id, name = %entry.name, "visitor called by phone");
    snapshot::broadcast(state).await;
    Ok(CalledResponse {
        called_name: entry.name,
        phone_number: entry.phone_number,
    })
}

/// Complete a visit: remove the queue entry and record the score for the
/// given game, replacing any earlier score for the same visitor and game.
/// Returns the visitor's name.
pub async fn complete(
    state: &SharedState,
    request: CompleteRequest,
) -> Result<String, ServiceError> {
    let CompleteRequest {
        phone_number,
        score,
        game,
    } = request;

    if !state.config().knows_game(&game) {
        return Err(ServiceError::InvalidInput(format!(
            "unknown game `{game}`"
        )));
    }

    let name = {
        let _gate = state.write_gate().lock().await;
        let Some(name) = state
            .store()
            .complete_entry(phone_number.clone(), game.clone(), score)
            .await?
        else {
            return Err(unknown_phone(&phone_number));
        };
        name
    };

    info!(%name, %game, score, "visit completed");
    snapshot::broadcast(state).await;
    Ok(name)
}

/// Cancel a registration without recording any score. Returns the visitor's
/// name.
pub async fn cancel(state: &SharedState, phone_number: &str) -> Result<String, ServiceError> {
    let name = {
        let _gate = state.write_gate().lock().await;
        let Some(name) = state.store().delete_by_phone(phone_number.into()).await? else {
            return Err(unknown_phone(phone_number));
        };
        name
    };

    info!(%name, "registration cancelled");
    snapshot::broadcast(state).await;
    Ok(name)
}

fn unknown_phone(phone_number: &str) -> ServiceError {
    ServiceError::NotFound(format!("no visitor with phone number `{phone_number}`"))
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{config::AppConfig, dao::sqlite::SqliteStore, state::AppState};

    use super::*;

    async fn test_state() -> SharedState {
        let store = SqliteStore::in_memory().await.unwrap();
        AppState::new(AppConfig::default(), Arc::new(store))
    }

    fn register_request(name: &str, phone: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.into(),
            phone_number: phone.into(),
        }
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts_while_active() {
        let state = test_state().await;
        register(&state, register_request("Alice", "010-1"))
            .await
            .unwrap();

        let err = register(&state, register_request("Alice", "010-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn reregistration_allowed_after_cancel() {
        let state = test_state().await;
        register(&state, register_request("Alice", "010-1"))
            .await
            .unwrap();
        cancel(&state, "010-1").await.unwrap();

        assert!(register(&state, register_request("Alice", "010-1"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn call_next_picks_oldest_and_excludes_it_afterwards() {
        let state = test_state().await;
        register(&state, register_request("Alice", "010-1"))
            .await
            .unwrap();
        register(&state, register_request("Bob", "010-2"))
            .await
            .unwrap();

        let first = call_next(&state).await.unwrap();
        assert_eq!(first.called_name, "Alice");

        let second = call_next(&state).await.unwrap();
        assert_eq!(second.called_name, "Bob");

        let err = call_next(&state).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn call_specific_is_idempotent_for_called_entries() {
        let state = test_state().await;
        register(&state, register_request("Alice", "010-1"))
            .await
            .unwrap();

        call_specific(&state, "010-1").await.unwrap();
        let again = call_specific(&state, "010-1").await.unwrap();
        assert_eq!(again.called_name, "Alice");
    }

    #[tokio::test]
    async fn complete_rejects_unknown_game_before_touching_the_queue() {
        let state = test_state().await;
        register(&state, register_request("Alice", "010-1"))
            .await
            .unwrap();

        let err = complete(
            &state,
            CompleteRequest {
                phone_number: "010-1".into(),
                score: 100,
                game: "bowling".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        // Entry must still be in the queue.
        assert!(state
            .store()
            .find_by_phone("010-1".into())
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn complete_unknown_phone_is_not_found() {
        let state = test_state().await;
        let err = complete(
            &state,
            CompleteRequest {
                phone_number: "010-9".into(),
                score: 100,
                game: "1".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn walkthrough_register_call_complete_cancel() {
        let state = test_state().await;
        register(&state, register_request("Alice", "010-1"))
            .await
            .unwrap();
        register(&state, register_request("Bob", "010-2"))
            .await
            .unwrap();

        let called = call_next(&state).await.unwrap();
        assert_eq!(called.called_name, "Alice");

        let name = complete(
            &state,
            CompleteRequest {
                phone_number: "010-1".into(),
                score: 300,
                game: "1".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(name, "Alice");

        let name = cancel(&state, "010-2").await.unwrap();
        assert_eq!(name, "Bob");

        // Queue empty, exactly one ranking row for Alice, none for Bob.
        assert!(state.store().active_entries().await.unwrap().is_empty());
        let rows = state.store().all_rankings().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Alice");
        assert_eq!(rows[0].game, "1");
        assert_eq!(rows[0].score, 300);
    }

    #[tokio::test]
    async fn each_mutation_broadcasts_exactly_once() {
        use crate::{dto::ws::DeliveryMode, state::ViewerConnection};

        let state = test_state().await;
        let (tx, mut rx) = tokio::sync::mpsc::channel(4);
        state.hub().register(ViewerConnection {
            id: uuid::Uuid::new_v4(),
            mode: DeliveryMode::Full,
            tx,
        });

        register(&state, register_request("Alice", "010-1"))
            .await
            .unwrap();

        let axum::extract::ws::Message::Text(text) = rx.try_recv().unwrap() else {
            panic!("expected a text frame");
        };
        assert!(text.contains("Alice"));
        assert!(rx.try_recv().is_err(), "exactly one broadcast per mutation");
    }

    #[tokio::test]
    async fn second_completion_overwrites_score() {
        let state = test_state().await;
        for score in [500, 120] {
            register(&state, register_request("Alice", "010-1"))
                .await
                .unwrap();
            complete(
                &state,
                CompleteRequest {
                    phone_number: "010-1".into(),
                    score,
                    game: "1".into(),
                },
            )
            .await
            .unwrap();
        }

        let rows = state.store().all_rankings().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].score, 120);
    }
}
