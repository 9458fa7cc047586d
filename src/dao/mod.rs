/// Database model definitions.
pub mod models;
/// Store abstraction consumed by the service layer.
pub mod queue_store;
/// SQLite backend.
pub mod sqlite;
/// Storage abstraction layer for database operations.
pub mod storage;
