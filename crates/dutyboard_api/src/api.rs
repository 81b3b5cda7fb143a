//! GraphQL schema over the duty service.
//!
//! # Responsibility
//! - Expose `duties`, `createDuty`, `updateDuty` and `deleteDuty`.
//! - Execute requests in-process and return formatted JSON responses.
//!
//! # Invariants
//! - Resolvers hold no state; every call goes through `DutyService`.
//! - Outward errors follow the runtime-mode policy in `crate::error`.

use crate::error::{format_response, internal_failure_body, to_graphql_error};
use async_graphql::{Context, EmptySubscription, Object, Request, Schema, SimpleObject};
use dutyboard_core::{Duty, DutyGateway, DutyService, RuntimeMode};
use log::debug;
use serde_json::Value;
use std::sync::Arc;

/// Duty service as stored in the schema context.
pub type ApiService = DutyService<Arc<dyn DutyGateway>>;

pub type DutySchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// GraphQL projection of a duty.
#[derive(Debug, Clone, PartialEq, Eq, SimpleObject)]
#[graphql(name = "Duty")]
pub struct DutyNode {
    pub id: String,
    pub name: String,
}

impl From<Duty> for DutyNode {
    fn from(duty: Duty) -> Self {
        Self {
            id: duty.id,
            name: duty.name,
        }
    }
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// All duties, in no particular order.
    async fn duties(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<DutyNode>> {
        let service = ctx.data::<ApiService>()?;
        let duties = service.list_duties().await.map_err(to_graphql_error)?;
        Ok(duties.into_iter().map(DutyNode::from).collect())
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Creates a duty; the id is assigned by the server.
    async fn create_duty(&self, ctx: &Context<'_>, name: String) -> async_graphql::Result<DutyNode> {
        let service = ctx.data::<ApiService>()?;
        service
            .create_duty(&name)
            .await
            .map(DutyNode::from)
            .map_err(to_graphql_error)
    }

    /// Renames an existing duty.
    async fn update_duty(
        &self,
        ctx: &Context<'_>,
        id: String,
        name: String,
    ) -> async_graphql::Result<DutyNode> {
        let service = ctx.data::<ApiService>()?;
        service
            .update_duty(&id, &name)
            .await
            .map(DutyNode::from)
            .map_err(to_graphql_error)
    }

    /// Deletes a duty and returns it as it was.
    async fn delete_duty(&self, ctx: &Context<'_>, id: String) -> async_graphql::Result<DutyNode> {
        let service = ctx.data::<ApiService>()?;
        service
            .delete_duty(&id)
            .await
            .map(DutyNode::from)
            .map_err(to_graphql_error)
    }
}

/// Builds the schema with `service` in its context data.
///
/// Introspection is only served in development mode.
pub fn build_schema(service: ApiService, mode: RuntimeMode) -> DutySchema {
    let builder = Schema::build(QueryRoot, MutationRoot, EmptySubscription).data(service);
    if mode.is_development() {
        builder.finish()
    } else {
        builder.disable_introspection().finish()
    }
}

/// SDL of the duty schema; needs no service or database.
pub fn schema_sdl() -> String {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .finish()
        .sdl()
}

/// Executes one request against `schema` and returns the mode-formatted JSON response.
pub async fn execute(
    schema: &DutySchema,
    request: impl Into<Request>,
    mode: RuntimeMode,
) -> Value {
    let response = schema.execute(request).await;
    debug!(
        "event=graphql_execute module=api status={} errors={}",
        if response.is_ok() { "ok" } else { "error" },
        response.errors.len()
    );

    match serde_json::to_value(&response) {
        Ok(body) => format_response(body, mode),
        Err(err) => internal_failure_body(&err.to_string()),
    }
}

/// In-process GraphQL executor for the duty board.
pub struct DutyApi {
    schema: DutySchema,
    mode: RuntimeMode,
}

impl DutyApi {
    pub fn new(service: ApiService, mode: RuntimeMode) -> Self {
        Self {
            schema: build_schema(service, mode),
            mode,
        }
    }

    /// Builds the API over any gateway implementation.
    pub fn from_gateway(gateway: impl DutyGateway + 'static, mode: RuntimeMode) -> Self {
        let gateway: Arc<dyn DutyGateway> = Arc::new(gateway);
        Self::new(DutyService::new(gateway), mode)
    }

    pub fn mode(&self) -> RuntimeMode {
        self.mode
    }

    pub fn schema(&self) -> &DutySchema {
        &self.schema
    }

    /// Schema definition in SDL form.
    pub fn sdl(&self) -> String {
        self.schema.sdl()
    }

    pub async fn execute(&self, request: impl Into<Request>) -> Value {
        execute(&self.schema, request, self.mode).await
    }
}
