//! Domain model for the duty board.
//!
//! # Responsibility
//! - Define the canonical record shared by storage, service and API layers.
//!
//! # Invariants
//! - Every duty is identified by a stable, orchestrator-assigned `DutyId`.
//! - Deletion is a hard delete; there is no tombstone state.

pub mod duty;
