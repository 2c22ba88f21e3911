pub mod proxy;
pub(crate) mod routes;
pub(crate) mod rpc;
mod state;

pub use proxy::ProxyDispatcher;
pub use state::AppState;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use log::info;
use tower_http::cors::CorsLayer;

use crate::config::MCP_PATH;
use crate::MockToolServer;

/// Local deployment: the mock tools are served from this process.
pub fn local_router(server: MockToolServer, request_timeout: Duration) -> Router {
    let state = AppState {
        server: Arc::new(server),
        request_timeout,
    };

    Router::new()
        .route(MCP_PATH, post(rpc::mcp_rpc))
        .route("/api/v1/health", get(routes::health))
        .route("/api/v1/tools", get(routes::list_tools))
        .route("/api/v1/:tool_name", post(routes::call_tool))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Proxy deployment: the MCP path is relayed to the downstream service.
pub fn proxy_router(dispatcher: ProxyDispatcher) -> Router {
    Router::new()
        .route(
            MCP_PATH,
            get(proxy::proxy).post(proxy::proxy).delete(proxy::proxy),
        )
        .with_state(Arc::new(dispatcher))
}

pub async fn serve(bind: &str, port: u16, router: Router) -> anyhow::Result<()> {
    let addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    eprintln!("MCP server listening on http://{}{}", addr, MCP_PATH);
    info!("MCP server listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl-C, shutting down");
            }
        })
        .await?;

    Ok(())
}
