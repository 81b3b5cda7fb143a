//! Outward error shaping for GraphQL responses.
//!
//! # Responsibility
//! - Attach `extensions.code` (and diagnostic `kind`) to resolver errors.
//! - Strip everything but `message` and `extensions.code` in production.
//!
//! # Invariants
//! - Every outward error carries a `code`. Code-less errors raised while
//!   resolving a field (they carry a `path`) are `INTERNAL_SERVER_ERROR`;
//!   parse and validation errors are `BAD_USER_INPUT`.

use async_graphql::ErrorExtensions;
use dutyboard_core::{DutyError, ErrorCode, RuntimeMode};
use log::{error, warn};
use serde_json::{json, Map, Value};

/// Converts a service error into a GraphQL error with extensions.
pub fn to_graphql_error(err: DutyError) -> async_graphql::Error {
    let code = err.code();
    match code {
        ErrorCode::InternalServerError => {
            error!("event=graphql_resolve module=api status=error code={code} error={err}");
        }
        ErrorCode::BadUserInput => {
            warn!(
                "event=graphql_resolve module=api status=rejected code={code} kind={}",
                err.kind()
            );
        }
    }

    let kind = err.kind();
    let detail = err.detail().map(str::to_string);
    async_graphql::Error::new(err.to_string()).extend_with(|_, ext| {
        ext.set("code", code.as_str());
        ext.set("kind", kind);
        if let Some(detail) = detail {
            ext.set("detail", detail);
        }
    })
}

/// Applies the runtime-mode error policy to a serialized GraphQL response.
pub fn format_response(mut response: Value, mode: RuntimeMode) -> Value {
    let Some(errors) = response.get_mut("errors").and_then(Value::as_array_mut) else {
        return response;
    };

    for entry in errors.iter_mut() {
        ensure_code(entry);
        if !mode.is_development() {
            *entry = strip_diagnostics(entry);
        }
    }
    response
}

/// Fallback body used when a response cannot be serialized.
pub(crate) fn internal_failure_body(message: &str) -> Value {
    json!({
        "data": Value::Null,
        "errors": [{
            "message": message,
            "extensions": { "code": ErrorCode::InternalServerError.as_str() }
        }]
    })
}

fn ensure_code(entry: &mut Value) {
    let Some(object) = entry.as_object_mut() else {
        return;
    };
    let fallback = if object.contains_key("path") {
        ErrorCode::InternalServerError
    } else {
        ErrorCode::BadUserInput
    };
    let extensions = object
        .entry("extensions")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Some(extensions) = extensions.as_object_mut() {
        extensions
            .entry("code")
            .or_insert_with(|| Value::from(fallback.as_str()));
    }
}

fn strip_diagnostics(entry: &Value) -> Value {
    let message = entry.get("message").cloned().unwrap_or(Value::Null);
    let code = entry
        .pointer("/extensions/code")
        .cloned()
        .unwrap_or(Value::Null);
    json!({ "message": message, "extensions": { "code": code } })
}
