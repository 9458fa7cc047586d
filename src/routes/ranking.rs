use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get},
};

use crate::{
    dto::queue::MessageResponse,
    dto::ranking::{DeleteRankingRequest, FullRankingEntryDto, GamesResponse},
    error::AppError,
    services::ranking_service,
    state::SharedState,
};

/// Routes exposing the configured game set and the leaderboard admin view.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", get(games))
        .route("/rankings/all", get(all_rankings))
        .route("/rankings", delete(delete_ranking))
}

/// List the configured games.
#[utoipa::path(
    get,
    path = "/games",
    tag = "ranking",
    responses((status = 200, description = "Configured game set", body = GamesResponse))
)]
pub async fn games(State(state): State<SharedState>) -> Json<GamesResponse> {
    Json(GamesResponse::new(state.config().games()))
}

/// Every leaderboard row across all games, for the administrative view.
#[utoipa::path(
    get,
    path = "/rankings/all",
    tag = "ranking",
    responses((status = 200, description = "All leaderboard rows", body = [FullRankingEntryDto]))
)]
pub async fn all_rankings(
    State(state): State<SharedState>,
) -> Result<Json<Vec<FullRankingEntryDto>>, AppError> {
    let rows = ranking_service::all(&state).await?;
    Ok(Json(rows))
}

/// Delete a single leaderboard row by exact value match.
#[utoipa::path(
    delete,
    path = "/rankings",
    tag = "ranking",
    request_body = DeleteRankingRequest,
    responses(
        (status = 200, description = "Row deleted", body = MessageResponse),
        (status = 404, description = "No exact match")
    )
)]
pub async fn delete_ranking(
    State(state): State<SharedState>,
    Json(payload): Json<DeleteRankingRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let name = payload.name.clone();
    ranking_service::delete(&state, payload).await?;
    Ok(Json(MessageResponse::new(format!(
        "ranking row for '{name}' deleted"
    ))))
}
