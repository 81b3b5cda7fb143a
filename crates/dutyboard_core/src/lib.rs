//! Core domain logic for the duty board.
//! This crate is the single source of truth for duty invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError, RuntimeMode};
pub use db::{init_shared_db, shared_db, shutdown_shared_db, DbError, SharedDb};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::duty::{generate_duty_id, Duty, DutyId};
pub use repo::duty_repo::{
    DutyGateway, ExistsCriterion, GatewayError, GatewayResult, SqliteDutyGateway,
    UNKNOWN_ERROR_MESSAGE,
};
pub use service::duty_service::{DuplicateOn, DutyError, DutyResult, DutyService, ErrorCode};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
