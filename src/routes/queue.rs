use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use validator::Validate;

use crate::{
    dto::queue::{
        CalledResponse, CancelRequest, CompleteRequest, MessageResponse, QueueEntryDto,
        RegisterRequest,
    },
    error::AppError,
    services::queue_service,
    state::SharedState,
};

/// Routes handling the walk-in queue operations.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/queue/register", post(register))
        .route("/queue/call-next", post(call_next))
        .route("/queue/call-specific/{phone_number}", post(call_specific))
        .route("/queue/complete", post(complete))
        .route("/queue/cancel", post(cancel))
}

/// Register a visitor in the waiting queue.
#[utoipa::path(
    post,
    path = "/queue/register",
    tag = "queue",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Visitor registered", body = QueueEntryDto),
        (status = 400, description = "Phone number already active or invalid input")
    )
)]
pub async fn register(
    State(state): State<SharedState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<QueueEntryDto>, AppError> {
    payload.validate()?;
    let entry = queue_service::register(&state, payload).await?;
    Ok(Json(entry))
}

/// Call the visitor who has been waiting the longest.
#[utoipa::path(
    post,
    path = "/queue/call-next",
    tag = "queue",
    responses(
        (status = 200, description = "Visitor called", body = CalledResponse),
        (status = 404, description = "No waiting visitor")
    )
)]
pub async fn call_next(
    State(state): State<SharedState>,
) -> Result<Json<CalledResponse>, AppError> {
    let called = queue_service::call_next(&state).await?;
    Ok(Json(called))
}

/// Call a specific visitor by phone number.
#[utoipa::path(
    post,
    path = "/queue/call-specific/{phone_number}",
    tag = "queue",
    params(("phone_number" = String, Path, description = "Phone number of the visitor to call")),
    responses(
        (status = 200, description = "Visitor called", body = CalledResponse),
        (status = 404, description = "Unknown phone number")
    )
)]
pub async fn call_specific(
    State(state): State<SharedState>,
    Path(phone_number): Path<String>,
) -> Result<Json<CalledResponse>, AppError> {
    let called = queue_service::call_specific(&state, &phone_number).await?;
    Ok(Json(called))
}

/// Complete a visit with a score for one of the configured games.
#[utoipa::path(
    post,
    path = "/queue/complete",
    tag = "queue",
    request_body = CompleteRequest,
    responses(
        (status = 200, description = "Visit completed and score recorded", body = MessageResponse),
        (status = 400, description = "Unknown game"),
        (status = 404, description = "Unknown phone number")
    )
)]
pub async fn complete(
    State(state): State<SharedState>,
    Json(payload): Json<CompleteRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;
    let score = payload.score;
    let game = payload.game.clone();
    let name = queue_service::complete(&state, payload).await?;
    Ok(Json(MessageResponse::new(format!(
        "'{name}' completed with score {score} for game '{game}'"
    ))))
}

/// Cancel a registration without recording a score.
#[utoipa::path(
    post,
    path = "/queue/cancel",
    tag = "queue",
    request_body = CancelRequest,
    responses(
        (status = 200, description = "Registration cancelled", body = MessageResponse),
        (status = 404, description = "Unknown phone number")
    )
)]
pub async fn cancel(
    State(state): State<SharedState>,
    Json(payload): Json<CancelRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    payload.validate()?;
    let name = queue_service::cancel(&state, &payload.phone_number).await?;
    Ok(Json(MessageResponse::new(format!(
        "'{name}' was removed from the queue"
    ))))
}
