use std::time::Duration;

/// Downstream MCP endpoint used by proxy mode when none is configured.
pub const DEFAULT_DOWNSTREAM_URL: &str = "http://localhost:3000/api/mcp";

/// Wall-clock budget for handling one request, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_PORT: u16 = 3001;

/// Path the MCP surface is served on in both modes.
pub const MCP_PATH: &str = "/api/mcp";

pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Which of the two deployments this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// Serve the mock tools from this process.
    Local,
    /// Forward every request to the downstream URL.
    Proxy,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Local => "local",
            Mode::Proxy => "proxy",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub target: String,
    pub timeout: Duration,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_DOWNSTREAM_URL.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}
