use anyhow::Result;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// HTTP client for the MCP server's JSON-RPC and REST routes.
pub struct McpClient {
    http_client: reqwest::Client,
    base_url: String,
    next_id: AtomicU64,
}

impl McpClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http_client
    }

    /// Send one JSON-RPC request to `/api/mcp` and return the whole reply.
    pub async fn rpc(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut request = json!({ "jsonrpc": "2.0", "id": id, "method": method });
        if let Some(params) = params {
            request["params"] = params;
        }

        let resp = self
            .http_client
            .post(format!("{}/api/mcp", self.base_url))
            .json(&request)
            .send()
            .await?;
        Ok(resp.json().await?)
    }

    /// `tools/call` over JSON-RPC.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value> {
        self.rpc(
            "tools/call",
            Some(json!({ "name": name, "arguments": arguments })),
        )
        .await
    }

    /// `POST /api/v1/{name}`; returns the status code and the JSON body.
    pub async fn call_tool_rest(&self, name: &str, arguments: Value) -> Result<(u16, Value)> {
        let resp = self
            .http_client
            .post(format!("{}/api/v1/{}", self.base_url, name))
            .json(&arguments)
            .send()
            .await?;
        let status = resp.status().as_u16();
        Ok((status, resp.json().await?))
    }

    pub async fn get(&self, path: &str) -> Result<(u16, Value)> {
        let resp = self
            .http_client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        let status = resp.status().as_u16();
        Ok((status, resp.json().await?))
    }
}
