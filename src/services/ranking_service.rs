//! Leaderboard queries and administrative deletion.

use tracing::info;

use crate::{
    dao::queue_store::QueueStore,
    dto::ranking::{DeleteRankingRequest, FullRankingEntryDto, RankingEntryDto},
    error::ServiceError,
    services::snapshot,
    state::SharedState,
};

/// Top `n` leaderboard rows for a game, score-descending. An unknown game
/// yields an empty list rather than an error.
pub async fn top(
    state: &SharedState,
    game: &str,
    n: u32,
) -> Result<Vec<RankingEntryDto>, ServiceError> {
    let rows = state.store().top_n_by_game(game.into(), n).await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Every leaderboard row across all games, for the administrative view.
pub async fn all(state: &SharedState) -> Result<Vec<FullRankingEntryDto>, ServiceError> {
    let rows = state.store().all_rankings().await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Delete a single leaderboard row matching the exact `(name, game, score)`
/// triple. Value-match contract: with duplicate scores the first match goes.
pub async fn delete(state: &SharedState, request: DeleteRankingRequest) -> Result<(), ServiceError> {
    let DeleteRankingRequest { name, game, score } = request;

    let found = {
        let _gate = state.write_gate().lock().await;
        state
            .store()
            .delete_ranking(name.clone(), game.clone(), score)
            .await?
    };
    if !found {
        return Err(ServiceError::NotFound(format!(
            "no ranking row for ({name}, {game}, {score})"
        )));
    }

    info!(%name, %game, score, "ranking row deleted");
    snapshot::broadcast(state).await;
    Ok(())
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

    #[tokio::test]
    async fn top_of_unknown_game_is_empty() {
        let state = test_state().await;
        assert!(top(&state, "bowling", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn all_groups_by_game_then_score() {
        let state = test_state().await;
        for (name, phone, game, score) in [
            ("Alice", "010-1", "2", 400),
            ("Bob", "010-2", "1", 250),
            ("Carol", "010-3", "1", 300),
        ] {
            state
                .store()
                .upsert_ranking(name.into(), game.into(), phone.into(), score)
                .await
                .unwrap();
        }

        let rows = all(&state).await.unwrap();
        let order: Vec<(&str, i64)> = rows
            .iter()
            .map(|row| (row.game.as_str(), row.score))
            .collect();
        assert_eq!(order, vec![("1", 300), ("1", 250), ("2", 400)]);
    }

    #[tokio::test]
    async fn delete_requires_exact_match() {
        let state = test_state().await;
        state
            .store()
            .upsert_ranking("Alice".into(), "1".into(), "010-1".into(), 300)
            .await
            .unwrap();

        let err = delete(
            &state,
            DeleteRankingRequest {
                name: "Alice".into(),
                game: "1".into(),
                score: 299,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        delete(
            &state,
            DeleteRankingRequest {
                name: "Alice".into(),
                game: "1".into(),
                score: 300,
            },
        )
        .await
        .unwrap();
        assert!(all(&state).await.unwrap().is_empty());
    }
}
