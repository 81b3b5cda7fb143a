//! Duty persistence gateway contract and SQLite implementation.
//!
//! # Responsibility
//! - Translate the logical duty operations into parameterized SQL.
//! - Normalize every storage failure into `GatewayError::Internal`.
//! - Emit audit log records for successful writes.
//!
//! # Invariants
//! - No raw `rusqlite`/`DbError` value crosses this boundary.
//! - A failure without any message text is reported as `"Unknown error"`.
//! - The gateway does not enforce name uniqueness; callers screen first.

use crate::db::{DbError, SharedDb};
use crate::model::duty::{Duty, DutyId};
use async_trait::async_trait;
use log::{error, info};
use rusqlite::{params, Row};
use std::sync::Arc;
use thiserror::Error;

/// Message used when a failure carries no text of its own.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

const DUTY_EXISTS_BY_ID_SQL: &str = "SELECT EXISTS(SELECT 1 FROM duty WHERE id = ?1);";
const DUTY_EXISTS_BY_NAME_SQL: &str = "SELECT EXISTS(SELECT 1 FROM duty WHERE name = ?1);";

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Classified gateway failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("{message}")]
    Internal { message: String },
}

impl GatewayError {
    /// Builds an internal failure, substituting the generic message for blank text.
    pub fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            return Self::Internal {
                message: UNKNOWN_ERROR_MESSAGE.to_string(),
            };
        }
        Self::Internal { message }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Internal { message } => message,
        }
    }
}

impl From<DbError> for GatewayError {
    fn from(value: DbError) -> Self {
        Self::internal(value.to_string())
    }
}

/// Field used for an existence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExistsCriterion {
    Id(DutyId),
    Name(String),
}

impl ExistsCriterion {
    pub fn value(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Name(name) => name,
        }
    }

    fn sql(&self) -> &'static str {
        match self {
            Self::Id(_) => DUTY_EXISTS_BY_ID_SQL,
            Self::Name(_) => DUTY_EXISTS_BY_NAME_SQL,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Id(_) => "id",
            Self::Name(_) => "name",
        }
    }
}

/// Storage contract consumed by the duty service.
#[async_trait]
pub trait DutyGateway: Send + Sync {
    /// Returns whether a duty matching `criterion` exists.
    async fn exists(&self, criterion: &ExistsCriterion) -> GatewayResult<bool>;

    async fn exists_by_id(&self, id: &str) -> GatewayResult<bool> {
        self.exists(&ExistsCriterion::Id(id.to_string())).await
    }

    async fn exists_by_name(&self, name: &str) -> GatewayResult<bool> {
        self.exists(&ExistsCriterion::Name(name.to_string())).await
    }

    /// Lists every stored duty. Order is unspecified.
    async fn list(&self) -> GatewayResult<Vec<Duty>>;

    /// Inserts a duty and returns the stored record.
    async fn insert(&self, id: &str, name: &str) -> GatewayResult<Duty>;

    /// Renames a duty and returns the updated record.
    ///
    /// A missing `id` yields `GatewayError::Internal`.
    async fn update(&self, id: &str, name: &str) -> GatewayResult<Duty>;

    /// Deletes a duty and returns the record as it was before removal.
    async fn remove(&self, id: &str) -> GatewayResult<Duty>;
}

#[async_trait]
impl<G: DutyGateway + ?Sized> DutyGateway for Arc<G> {
    async fn exists(&self, criterion: &ExistsCriterion) -> GatewayResult<bool> {
        (**self).exists(criterion).await
    }

    async fn exists_by_id(&self, id: &str) -> GatewayResult<bool> {
        (**self).exists_by_id(id).await
    }

    async fn exists_by_name(&self, name: &str) -> GatewayResult<bool> {
        (**self).exists_by_name(name).await
    }

    async fn list(&self) -> GatewayResult<Vec<Duty>> {
        (**self).list().await
    }

    async fn insert(&self, id: &str, name: &str) -> GatewayResult<Duty> {
        (**self).insert(id, name).await
    }

    async fn update(&self, id: &str, name: &str) -> GatewayResult<Duty> {
        (**self).update(id, name).await
    }

    async fn remove(&self, id: &str) -> GatewayResult<Duty> {
        (**self).remove(id).await
    }
}

/// SQLite-backed duty gateway over a [`SharedDb`] handle.
#[derive(Clone)]
pub struct SqliteDutyGateway {
    db: SharedDb,
}

impl SqliteDutyGateway {
    pub fn new(db: SharedDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DutyGateway for SqliteDutyGateway {
    async fn exists(&self, criterion: &ExistsCriterion) -> GatewayResult<bool> {
        let sql = criterion.sql();
        let label = criterion.label();
        let value = criterion.value().to_string();

        self.db
            .run(move |conn| Ok(conn.query_row(sql, [value], |row| row.get::<_, bool>(0))?))
            .await
            .map_err(|err| normalize_failure("duty_exists", label, err))
    }

    async fn list(&self) -> GatewayResult<Vec<Duty>> {
        self.db
            .run(|conn| {
                let mut stmt = conn.prepare("SELECT id, name FROM duty;")?;
                let duties = stmt
                    .query_map([], parse_duty_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(duties)
            })
            .await
            .map_err(|err| normalize_failure("duty_list", "all", err))
    }

    async fn insert(&self, id: &str, name: &str) -> GatewayResult<Duty> {
        let (id, name) = (id.to_string(), name.to_string());
        let duty = self
            .db
            .run(move |conn| {
                Ok(conn.query_row(
                    "INSERT INTO duty (id, name) VALUES (?1, ?2) RETURNING id, name;",
                    params![id, name],
                    parse_duty_row,
                )?)
            })
            .await
            .map_err(|err| normalize_failure("duty_insert", "id", err))?;

        info!(
            "event=duty_insert module=repo status=ok id={} name={:?}",
            duty.id, duty.name
        );
        Ok(duty)
    }

    async fn update(&self, id: &str, name: &str) -> GatewayResult<Duty> {
        let (id, name) = (id.to_string(), name.to_string());
        let duty = self
            .db
            .run(move |conn| {
                Ok(conn.query_row(
                    "UPDATE duty SET name = ?2 WHERE id = ?1 RETURNING id, name;",
                    params![id, name],
                    parse_duty_row,
                )?)
            })
            .await
            .map_err(|err| normalize_failure("duty_update", "id", err))?;

        info!(
            "event=duty_update module=repo status=ok id={} new_name={:?}",
            duty.id, duty.name
        );
        Ok(duty)
    }

    async fn remove(&self, id: &str) -> GatewayResult<Duty> {
        let id = id.to_string();
        let duty = self
            .db
            .run(move |conn| {
                Ok(conn.query_row(
                    "DELETE FROM duty WHERE id = ?1 RETURNING id, name;",
                    [id],
                    parse_duty_row,
                )?)
            })
            .await
            .map_err(|err| normalize_failure("duty_remove", "id", err))?;

        info!(
            "event=duty_remove module=repo status=ok id={} old_name={:?}",
            duty.id, duty.name
        );
        Ok(duty)
    }
}

fn parse_duty_row(row: &Row<'_>) -> rusqlite::Result<Duty> {
    Ok(Duty {
        id: row.get("id")?,
        name: row.get("name")?,
    })
}

fn normalize_failure(event: &str, criterion: &str, err: DbError) -> GatewayError {
    error!("event={event} module=repo status=error criterion={criterion} error={err:?}");
    GatewayError::from(err)
}
