//! Lifecycle of an individual display WebSocket connection.

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::DeliveryMode,
    services::snapshot,
    state::{SharedState, ViewerConnection, hub::VIEWER_BUFFER},
};

/// Handle the full lifecycle of a display connection: register it with the
/// hub, push one initial snapshot, then drain inbound frames until the peer
/// goes away.
pub async fn handle_socket(state: SharedState, socket: WebSocket, mode: DeliveryMode) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<Message>(VIEWER_BUFFER);

    // Dedicated writer task keeps outbound snapshots flowing even while we
    // await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let id = Uuid::new_v4();
    snapshot::register_viewer(
        &state,
        ViewerConnection {
            id,
            mode,
            tx: outbound_tx.clone(),
        },
    )
    .await;
    info!(%id, ?mode, "display connected");

    // Inbound frames carry no meaning on this endpoint; drain and ignore
    // them until the transport reports the peer is gone.
    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.try_send(Message::Pong(payload));
            }
            Ok(Message::Close(_)) => {
                info!(%id, "display closed");
                break;
            }
            Ok(_) => {}
            Err(err) => {
                warn!(%id, error = %err, "websocket error");
                break;
            }
        }
    }

    state.hub().deregister(&id);
    info!(%id, "display disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::Sender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
