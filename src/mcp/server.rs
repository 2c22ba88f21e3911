use log::{error, info, warn};
use serde_json::Value;
use std::sync::Arc;

use crate::error::ToolError;
use crate::protocol::mcp::{ToolDefinition, ToolResult};

use super::handlers::ToolContext;
use super::sampler::{Clock, RandomSampler, SystemClock, UsageSampler};
use super::tools::{ToolSpec, TOOLS};

/// The local tool registry. Immutable once built, so one instance is shared
/// by every request.
pub struct MockToolServer {
    tools: &'static [ToolSpec],
    sampler: Arc<dyn UsageSampler>,
    clock: Arc<dyn Clock>,
}

impl Default for MockToolServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockToolServer {
    pub fn new() -> Self {
        Self::with_tools(TOOLS)
    }

    pub fn with_tools(tools: &'static [ToolSpec]) -> Self {
        Self {
            tools,
            sampler: Arc::new(RandomSampler),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_sampler(mut self, sampler: Arc<dyn UsageSampler>) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(ToolSpec::definition).collect()
    }

    fn lookup(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Validate and run one tool call.
    ///
    /// Unknown names and argument errors are returned as `Err`; anything
    /// the handler itself fails on comes back as an `isError` result.
    pub fn call_tool(&self, name: &str, args: &Value) -> Result<ToolResult, ToolError> {
        let Some(spec) = self.lookup(name) else {
            warn!("Rejected call to unknown tool {}", name);
            return Err(ToolError::UnknownTool(name.to_string()));
        };

        let validated = spec.schema.validate(args).map_err(|e| {
            warn!("{}: {}", name, e);
            e
        })?;

        info!("Calling tool {}", name);
        let ctx = ToolContext {
            sampler: self.sampler.as_ref(),
            now: self.clock.now(),
        };

        match (spec.handler)(&ctx, validated) {
            Ok(result) => Ok(result),
            Err(e) => {
                error!("{} failed: {:#}", name, e);
                Ok(ToolResult::error(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::schema::{FieldKind, FieldSpec, InputSchema};
    use anyhow::anyhow;
    use serde_json::{json, Map};

    fn always_fails(
        _ctx: &ToolContext<'_>,
        _args: Map<String, Value>,
    ) -> anyhow::Result<ToolResult> {
        Err(anyhow!("backend exploded"))
    }

    static FAILING: &[ToolSpec] = &[ToolSpec {
        name: "explode",
        description: "Always fails",
        schema: InputSchema::new(&[FieldSpec::required(
            "reason",
            "Why",
            FieldKind::String { min_len: 1 },
        )]),
        handler: always_fails,
    }];

    #[test]
    fn handler_failure_becomes_error_envelope() {
        let server = MockToolServer::with_tools(FAILING);
        let result = server.call_tool("explode", &json!({ "reason": "x" })).unwrap();
        assert!(result.is_error);
        assert_eq!(result.content.len(), 1);
        let body: Value = serde_json::from_str(result.first_text().unwrap()).unwrap();
        assert_eq!(body, json!({ "error": "backend exploded" }));
    }

    #[test]
    fn validation_runs_before_the_handler() {
        let server = MockToolServer::with_tools(FAILING);
        let err = server.call_tool("explode", &json!({})).unwrap_err();
        assert!(matches!(err, ToolError::Validation(ref v) if v.field == "reason"));
    }

    #[test]
    fn unknown_tool_is_not_a_handler_error() {
        let server = MockToolServer::with_tools(FAILING);
        let err = server.call_tool("missing", &json!({})).unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(ref n) if n == "missing"));
    }
}
