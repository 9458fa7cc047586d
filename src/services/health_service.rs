use tracing::warn;

use crate::{dao::queue_store::QueueStore, dto::health::HealthResponse, state::SharedState};

/// Ping the store and report health accordingly.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.store().health_check().await {
        Ok(()) => HealthResponse::ok(),
        Err(err) => {
            warn!(error = %err, "storage health check failed");
            HealthResponse::degraded()
        }
    }
}
