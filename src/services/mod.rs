pub mod documentation;
pub mod health_service;
pub mod queue_service;
pub mod ranking_service;
pub mod snapshot;
pub mod websocket_service;
