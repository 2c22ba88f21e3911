//! MCP JSON-RPC endpoint for local mode.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::debug;
use serde_json::{json, Value};

use crate::config::PROTOCOL_VERSION;
use crate::error::ToolError;
use crate::mcp::handlers::handle_tool_call;
use crate::protocol::jsonrpc::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR, INVALID_PARAMS,
    INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR, REQUEST_TIMEOUT,
};
use crate::protocol::mcp::ToolInvocationRequest;

use super::state::AppState;

fn rpc_error(code: i64, message: impl Into<String>, data: Option<Value>) -> JsonRpcError {
    JsonRpcError {
        code,
        message: message.into(),
        data,
    }
}

impl From<ToolError> for JsonRpcError {
    fn from(err: ToolError) -> Self {
        match &err {
            ToolError::UnknownTool(name) => {
                rpc_error(INVALID_PARAMS, err.to_string(), Some(json!({ "tool": name })))
            }
            ToolError::Validation(v) => rpc_error(
                INVALID_PARAMS,
                err.to_string(),
                Some(json!({ "field": v.field, "constraint": v.constraint })),
            ),
            ToolError::Timeout(_) => rpc_error(REQUEST_TIMEOUT, err.to_string(), None),
        }
    }
}

pub async fn mcp_rpc(State(state): State<AppState>, body: Bytes) -> Response {
    let raw: Value = match serde_json::from_slice(&body) {
        Ok(raw) => raw,
        Err(e) => {
            let message = format!("Parse error: {}", e);
            let reply = JsonRpcResponse::failure(Value::Null, PARSE_ERROR, message, None);
            return Json(reply).into_response();
        }
    };

    let id = raw.get("id").cloned().unwrap_or(Value::Null);
    let request: JsonRpcRequest = match serde_json::from_value(raw) {
        Ok(request) => request,
        Err(e) => {
            let message = format!("Invalid request: {}", e);
            let reply = JsonRpcResponse::failure(id, INVALID_REQUEST, message, None);
            return Json(reply).into_response();
        }
    };
    if request.jsonrpc != "2.0" {
        let message = "Invalid request: jsonrpc must be \"2.0\"";
        let reply = JsonRpcResponse::failure(id, INVALID_REQUEST, message, None);
        return Json(reply).into_response();
    }

    if request.is_notification() {
        debug!("Notification {}", request.method);
        return StatusCode::ACCEPTED.into_response();
    }

    let id = request.id.clone().unwrap_or(Value::Null);
    let reply = match dispatch(&state, &request).await {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(e) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(e),
        },
    };
    Json(reply).into_response()
}

async fn dispatch(state: &AppState, request: &JsonRpcRequest) -> Result<Value, JsonRpcError> {
    match request.method.as_str() {
        "initialize" => Ok(json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION")
            }
        })),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({ "tools": state.server.list_tools() })),
        "tools/call" => {
            let params = request.params.clone().unwrap_or(Value::Null);
            let call: ToolInvocationRequest = serde_json::from_value(params)
                .map_err(|e| rpc_error(INVALID_PARAMS, format!("Invalid params: {}", e), None))?;

            let result = handle_tool_call(
                state.server.clone(),
                &call.name,
                call.arguments,
                state.request_timeout,
            )
            .await?;
            serde_json::to_value(result).map_err(|e| rpc_error(INTERNAL_ERROR, e.to_string(), None))
        }
        other => Err(rpc_error(
            METHOD_NOT_FOUND,
            format!("Method not found: {}", other),
            None,
        )),
    }
}
