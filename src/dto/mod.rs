pub mod health;
pub mod queue;
pub mod ranking;
pub mod validation;
pub mod ws;
