use std::time::Duration;

use thiserror::Error;

/// A field that failed its schema constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid argument `{field}`: {constraint}")]
pub struct ValidationError {
    pub field: String,
    pub constraint: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            constraint: constraint.into(),
        }
    }
}

/// Ways a tool call can be rejected before (or instead of) producing a
/// `ToolResult`. Handler failures are not listed here: they become an
/// `isError` result.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("tool call exceeded the {}s deadline", .0.as_secs())]
    Timeout(Duration),
}

/// Failures while relaying a request downstream.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("failed to read request body: {0}")]
    InboundBody(#[source] axum::Error),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}
