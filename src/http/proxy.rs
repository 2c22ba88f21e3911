//! Pass-through deployment: every request on the MCP path is relayed to a
//! single downstream URL.
//!
//! Dropping the inbound request (client disconnect) drops the in-flight
//! `reqwest` future or the relayed body stream, which closes the outbound
//! connection as well.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use log::{debug, error, info};
use serde_json::json;

use crate::config::ProxyConfig;
use crate::error::ProxyError;

/// Inbound headers that describe the inbound connection, not the request.
const HOP_HEADERS: [&str; 3] = ["host", "connection", "content-length"];

pub struct ProxyDispatcher {
    client: reqwest::Client,
    target: String,
    timeout: Duration,
}

impl ProxyDispatcher {
    pub fn new(config: &ProxyConfig) -> anyhow::Result<Self> {
        url::Url::parse(&config.target)
            .with_context(|| format!("Invalid downstream URL: {}", config.target))?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            target: config.target.clone(),
            timeout: config.timeout,
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Relay `request` downstream. Never fails: transport errors become a
    /// 502 response carrying the target URL.
    pub async fn forward(&self, request: Request) -> Response {
        let method = request.method().clone();
        match self.try_forward(request).await {
            Ok(response) => {
                debug!("{} {} -> {}", method, self.target, response.status());
                response
            }
            Err(e) => {
                error!("Proxy error: {}", e);
                self.error_response(&e)
            }
        }
    }

    async fn try_forward(&self, request: Request) -> Result<Response, ProxyError> {
        let (parts, body) = request.into_parts();

        let mut outbound = self
            .client
            .request(parts.method.clone(), self.target.as_str())
            .headers(forwarded_headers(&parts.headers));

        if !matches!(parts.method, Method::GET | Method::HEAD) {
            let body = axum::body::to_bytes(body, usize::MAX)
                .await
                .map_err(ProxyError::InboundBody)?;
            outbound = outbound.body(body);
        }

        let downstream = outbound.send().await?;
        let status = downstream.status();
        let headers = downstream.headers().clone();

        let body = if is_event_stream(&headers) {
            info!("Relaying event stream from {}", self.target);
            Body::from_stream(downstream.bytes_stream())
        } else {
            Body::from(downstream.bytes().await?)
        };

        let mut response = Response::new(body);
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }

    fn error_response(&self, err: &ProxyError) -> Response {
        let message = match err {
            ProxyError::Transport(e) if e.is_timeout() => format!(
                "Downstream did not respond within {}s",
                self.timeout.as_secs()
            ),
            other => other.to_string(),
        };

        (
            StatusCode::BAD_GATEWAY,
            Json(json!({
                "error": "proxy_error",
                "message": message,
                "target": self.target,
            })),
        )
            .into_response()
    }
}

/// Copy of `inbound` without the hop-only headers.
pub fn forwarded_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = inbound.clone();
    for name in HOP_HEADERS {
        headers.remove(name);
    }
    headers
}

pub fn is_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("text/event-stream"))
}

pub async fn proxy(State(dispatcher): State<Arc<ProxyDispatcher>>, request: Request) -> Response {
    dispatcher.forward(request).await
}
