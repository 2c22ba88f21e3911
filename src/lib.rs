pub mod config;
pub mod error;
pub mod http;
pub mod mcp;
pub mod protocol;

pub use error::{ProxyError, ToolError, ValidationError};
pub use mcp::MockToolServer;
