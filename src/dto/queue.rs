use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dao::models::{QueueRecord, QueueStatus};
use crate::dto::validation::validate_phone_number;

/// Payload used to register a visitor in the walk-in queue.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[validate(custom(function = validate_phone_number))]
    pub phone_number: String,
}

/// Payload used to complete a visit with a score for one of the games.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CompleteRequest {
    #[validate(custom(function = validate_phone_number))]
    pub phone_number: String,
    pub score: i64,
    pub game: String,
}

/// Payload used to cancel a registration. The name is accepted for parity
/// with the registration form but the lookup goes by phone number alone.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CancelRequest {
    pub name: String,
    #[validate(custom(function = validate_phone_number))]
    pub phone_number: String,
}

/// Public projection of a queue entry.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct QueueEntryDto {
    pub id: i64,
    pub name: String,
    pub phone_number: String,
    pub registered_at: f64,
    pub status: QueueStatus,
}

impl From<QueueRecord> for QueueEntryDto {
    fn from(record: QueueRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            phone_number: record.phone_number,
            registered_at: record.registered_at,
            status: record.status,
        }
    }
}

/// Response returned when a visitor is called to the booth.
#[derive(Debug, Serialize, ToSchema)]
pub struct CalledResponse {
    pub called_name: String,
    pub phone_number: String,
}

/// Generic confirmation message for completion, cancellation and deletion.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
