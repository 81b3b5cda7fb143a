//! Persistence gateway abstractions and the SQLite implementation.
//!
//! # Responsibility
//! - Define the storage contract the service layer orchestrates.
//! - Isolate SQLite query details from business rules.
//!
//! # Invariants
//! - Gateway operations never leak raw storage errors; every failure is
//!   normalized into `GatewayError`.

pub mod duty_repo;
