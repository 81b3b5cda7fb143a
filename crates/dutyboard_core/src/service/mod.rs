//! Core use-case services.
//!
//! # Responsibility
//! - Validate caller input and enforce duty invariants.
//! - Sequence gateway calls into use-case level APIs.

pub mod duty_service;
