//! GraphQL surface for the duty board.

pub mod api;
pub mod error;

pub use api::{
    build_schema, execute, schema_sdl, ApiService, DutyApi, DutyNode, DutySchema, MutationRoot,
    QueryRoot,
};
pub use async_graphql::{Request, Variables};
pub use error::{format_response, to_graphql_error};
