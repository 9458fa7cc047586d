use axum::{
    Router,
    extract::{Query, State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};

use crate::{dto::ws::WsQuery, services::websocket_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/queue/ws",
    tag = "displays",
    params(("mode" = Option<String>, Query, description = "Delivery mode: `full` (default) or `queue-only`")),
    responses((status = 101, description = "Switching protocols to WebSocket"))
)]
/// Upgrade the HTTP connection into a live display session.
pub async fn ws_handler(
    State(state): State<SharedState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let shared_state = state.clone();
    ws.on_upgrade(move |socket| websocket_service::handle_socket(shared_state, socket, query.mode))
}

/// Configure the WebSocket endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/queue/ws", get(ws_handler))
}
