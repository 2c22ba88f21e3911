use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::{error::ToolError, mcp::handlers::handle_tool_call};

use super::state::AppState;

#[derive(Serialize)]
pub(crate) struct ApiResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ApiResponse {
    fn success(result: Value) -> Json<ApiResponse> {
        Json(ApiResponse {
            ok: true,
            result: Some(result),
            error: None,
        })
    }

    fn error(status: StatusCode, msg: impl Into<String>) -> (StatusCode, Json<ApiResponse>) {
        (
            status,
            Json(ApiResponse {
                ok: false,
                result: None,
                error: Some(msg.into()),
            }),
        )
    }
}

fn status_for(err: &ToolError) -> StatusCode {
    match err {
        ToolError::UnknownTool(_) => StatusCode::NOT_FOUND,
        ToolError::Validation(_) => StatusCode::BAD_REQUEST,
        ToolError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
    }
}

pub async fn health(State(state): State<AppState>) -> Json<ApiResponse> {
    ApiResponse::success(json!({
        "status": "ok",
        "mode": "local",
        "tools": state.server.list_tools().len(),
    }))
}

pub async fn list_tools(State(state): State<AppState>) -> Json<ApiResponse> {
    ApiResponse::success(json!({ "tools": state.server.list_tools() }))
}

pub async fn call_tool(
    State(state): State<AppState>,
    Path(tool_name): Path<String>,
    Json(args): Json<Value>,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)> {
    let server = state.server.clone();
    match handle_tool_call(server, &tool_name, args, state.request_timeout).await {
        Ok(result) => {
            let text = result.first_text().unwrap_or_default();
            // Parse the text content back to JSON if possible, otherwise return as string
            let value = serde_json::from_str::<Value>(text).unwrap_or_else(|_| json!(text));
            if result.is_error {
                let message = value["error"].as_str().unwrap_or(text).to_string();
                return Err(ApiResponse::error(StatusCode::UNPROCESSABLE_ENTITY, message));
            }
            Ok(ApiResponse::success(value))
        }
        Err(e) => Err(ApiResponse::error(status_for(&e), e.to_string())),
    }
}
