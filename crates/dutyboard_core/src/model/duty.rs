//! Duty domain model.
//!
//! # Responsibility
//! - Define the single persisted record (`id` + `name`).
//! - Own identifier generation so callers never pick their own ids.
//!
//! # Invariants
//! - `id` is assigned once at creation and never changes.
//! - `name` is non-empty and unique across all stored duties.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque duty identifier in string form.
pub type DutyId = String;

/// Canonical duty record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Duty {
    pub id: DutyId,
    pub name: String,
}

impl Duty {
    pub fn new(id: impl Into<DutyId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Generates a fresh collision-resistant duty id.
pub fn generate_duty_id() -> DutyId {
    Uuid::new_v4().to_string()
}
