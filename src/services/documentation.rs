use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Lineup Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::queue::register,
        crate::routes::queue::call_next,
        crate::routes::queue::call_specific,
        crate::routes::queue::complete,
        crate::routes::queue::cancel,
        crate::routes::ranking::games,
        crate::routes::ranking::all_rankings,
        crate::routes::ranking::delete_ranking,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::queue::RegisterRequest,
            crate::dto::queue::CompleteRequest,
            crate::dto::queue::CancelRequest,
            crate::dto::queue::QueueEntryDto,
            crate::dto::queue::CalledResponse,
            crate::dto::queue::MessageResponse,
            crate::dto::ranking::RankingEntryDto,
            crate::dto::ranking::FullRankingEntryDto,
            crate::dto::ranking::DeleteRankingRequest,
            crate::dto::ranking::GamesResponse,
            crate::dto::ws::SnapshotPayload,
            crate::dto::ws::QueueSnapshotPayload,
            crate::dao::models::QueueStatus,
            crate::config::Game,
            crate::config::ScoreOrder,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "queue", description = "Walk-in queue operations"),
        (name = "ranking", description = "Leaderboard queries and administration"),
        (name = "displays", description = "WebSocket stream for live displays"),
    )
)]
pub struct ApiDoc;
