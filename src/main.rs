use anyhow::Result;
use clap::Parser;
use log::info;
use std::time::Duration;

use mcp_mock_server::{
    config::{Mode, ProxyConfig, DEFAULT_DOWNSTREAM_URL, DEFAULT_PORT, REQUEST_TIMEOUT_SECS},
    http::{self, ProxyDispatcher},
    MockToolServer,
};

#[derive(Parser)]
#[command(
    name = "mcp-mock-server",
    about = "MCP server with mock tools, or a pass-through proxy to a downstream MCP endpoint"
)]
struct Cli {
    /// Serve the mock tools locally or forward everything downstream
    #[arg(short, long, value_enum, default_value = "local", env = "MCP_MODE")]
    mode: Mode,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "MCP_PORT")]
    port: u16,

    /// Bind address
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Downstream MCP endpoint (proxy mode)
    #[arg(long, default_value = DEFAULT_DOWNSTREAM_URL, env = "MCP_DOWNSTREAM_URL")]
    downstream_url: String,

    /// Time budget for one request, in seconds
    #[arg(long, default_value_t = REQUEST_TIMEOUT_SECS, env = "MCP_REQUEST_TIMEOUT_SECS")]
    request_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let timeout = Duration::from_secs(cli.request_timeout_secs);

    let router = match cli.mode {
        Mode::Local => http::local_router(MockToolServer::new(), timeout),
        Mode::Proxy => {
            let dispatcher = ProxyDispatcher::new(&ProxyConfig {
                target: cli.downstream_url,
                timeout,
            })?;
            info!("Forwarding requests to {}", dispatcher.target());
            http::proxy_router(dispatcher)
        }
    };

    info!("Starting in {} mode", cli.mode.as_str());
    http::serve(&cli.bind, cli.port, router).await
}
