//! Duty use-case service.
//!
//! # Responsibility
//! - Reject malformed input before any storage call.
//! - Check existence and name uniqueness through the gateway, then write.
//! - Map every outcome to a `Duty` value or a typed `DutyError`.
//!
//! # Invariants
//! - Validation failures never reach the gateway.
//! - Gateway failures are returned unchanged and stop the operation.
//! - Ids are generated here, never by callers or storage.
//! - Update checks name uniqueness without excluding the duty's own name, so
//!   renaming a duty to its current name is rejected as a duplicate.

use crate::model::duty::{generate_duty_id, Duty};
use crate::repo::duty_repo::{DutyGateway, GatewayError};
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub type DutyResult<T> = Result<T, DutyError>;

/// Outward error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    BadUserInput,
    InternalServerError,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BadUserInput => "BAD_USER_INPUT",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation that hit a name collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateOn {
    Create,
    Update,
}

impl Display for DuplicateOn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => f.write_str("Duty already existed"),
            Self::Update => f.write_str("Duty's name already exists"),
        }
    }
}

/// Result error of every duty use case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DutyError {
    #[error("Invalid user input")]
    InvalidInput,
    #[error("{0}")]
    DuplicateName(DuplicateOn),
    #[error("Duty not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] GatewayError),
}

impl DutyError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidInput | Self::DuplicateName(_) | Self::NotFound => ErrorCode::BadUserInput,
            Self::Internal(_) => ErrorCode::InternalServerError,
        }
    }

    /// Stable variant name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput => "InvalidInput",
            Self::DuplicateName(_) => "DuplicateName",
            Self::NotFound => "NotFound",
            Self::Internal(_) => "InternalError",
        }
    }

    /// Underlying gateway failure text, for diagnostics.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Internal(err) => Some(err.message()),
            _ => None,
        }
    }
}

/// Use-case service for duty list/create/update/delete.
pub struct DutyService<G: DutyGateway> {
    gateway: G,
}

impl<G: DutyGateway> DutyService<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Lists all duties; an empty list is a normal result.
    pub async fn list_duties(&self) -> DutyResult<Vec<Duty>> {
        Ok(self.gateway.list().await?)
    }

    /// Creates a duty named `name` under a freshly generated id.
    pub async fn create_duty(&self, name: &str) -> DutyResult<Duty> {
        if name.is_empty() {
            return Err(DutyError::InvalidInput);
        }

        if self.gateway.exists_by_name(name).await? {
            return Err(DutyError::DuplicateName(DuplicateOn::Create));
        }

        let id = generate_duty_id();
        Ok(self.gateway.insert(&id, name).await?)
    }

    /// Renames the duty `id` to `name`.
    ///
    /// Both existence checks run concurrently; the first failure wins.
    /// `NotFound` takes precedence over `DuplicateName`.
    pub async fn update_duty(&self, id: &str, name: &str) -> DutyResult<Duty> {
        if id.is_empty() || name.is_empty() {
            return Err(DutyError::InvalidInput);
        }

        let (id_exists, name_taken) = tokio::try_join!(
            self.gateway.exists_by_id(id),
            self.gateway.exists_by_name(name)
        )?;

        if !id_exists {
            return Err(DutyError::NotFound);
        }
        if name_taken {
            return Err(DutyError::DuplicateName(DuplicateOn::Update));
        }

        Ok(self.gateway.update(id, name).await?)
    }

    /// Deletes the duty `id` and returns it as it was.
    pub async fn delete_duty(&self, id: &str) -> DutyResult<Duty> {
        if id.is_empty() {
            return Err(DutyError::InvalidInput);
        }

        if !self.gateway.exists_by_id(id).await? {
            return Err(DutyError::NotFound);
        }

        Ok(self.gateway.remove(id).await?)
    }
}
