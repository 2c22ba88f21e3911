pub mod jsonrpc;
pub mod mcp;

pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use mcp::{ContentItem, ToolDefinition, ToolInvocationRequest, ToolResult};
