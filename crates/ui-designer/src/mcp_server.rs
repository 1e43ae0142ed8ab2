use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::context::ToolContext;
use crate::tools;

const SERVER_NAME: &str = "ui-designer-power";
const PROTOCOL_VERSION: &str = "2024-11-05";

/// MCP server implementation
///
/// Exposes the UI design tools as MCP tools over JSON-RPC 2.0 stdio protocol.
pub(crate) async fn run_mcp_server(ctx: Arc<ToolContext>) -> Result<()> {
    info!("UI Designer Power MCP server running on stdio");
    serve(ctx, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
    info!("MCP server shutting down");
    Ok(())
}

/// Read newline-delimited requests from `reader` until EOF.
///
/// Every request runs as its own task so a slow tool call never blocks the
/// next line; the shared executor still serializes the Gemini calls behind
/// them. Responses are written by a single task in completion order. At EOF
/// the in-flight requests are drained before returning.
pub(crate) async fn serve<R, W>(ctx: Arc<ToolContext>, reader: R, writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let writer_task = tokio::spawn(write_responses(writer, rx));
    let mut pending = JoinSet::new();
    let mut lines = reader.lines();

    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read line from stdin")?
    {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        debug!("Received: {}", trimmed);

        let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                let _ = tx.send(JsonRpcResponse::failure(
                    None,
                    PARSE_ERROR,
                    format!("Parse error: {e}"),
                ));
                continue;
            }
        };

        let ctx = ctx.clone();
        let tx = tx.clone();
        pending.spawn(async move {
            if let Some(response) = handle_request(&ctx, request).await {
                let _ = tx.send(response);
            }
        });

        while let Some(done) = pending.try_join_next() {
            log_task_result(done);
        }
    }

    debug!(in_flight = pending.len(), "Input closed, draining requests");
    while let Some(done) = pending.join_next().await {
        log_task_result(done);
    }

    drop(tx);
    writer_task.await.context("Response writer task panicked")?
}

fn log_task_result(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        error!("Request task failed: {}", e);
    }
}

const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

/// JSON-RPC 2.0 Request
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    method: String,
    #[serde(default)]
    params: Option<Value>,
    id: Option<Value>,
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
    id: Option<Value>,
}

/// JSON-RPC 2.0 Error
#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

impl JsonRpcResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    fn failure(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
            id,
        }
    }
}

/// Handle JSON-RPC request. Notifications get no response.
async fn handle_request(ctx: &ToolContext, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
    if request.method.starts_with("notifications/") || request.id.is_none() {
        debug!("Handling notification: {}", request.method);
        return None;
    }
    let id = request.id.clone();

    let response = match request.method.as_str() {
        "initialize" => {
            debug!("Handling initialize");
            JsonRpcResponse::success(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {
                        "tools": {}
                    },
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }),
            )
        }
        "tools/list" => {
            debug!("Handling tools/list");
            JsonRpcResponse::success(id, json!({ "tools": tools::tool_definitions() }))
        }
        "tools/call" => {
            debug!("Handling tools/call");
            match tool_call_target(request.params) {
                Ok((name, arguments)) => {
                    JsonRpcResponse::success(id, tools::call_tool(ctx, &name, arguments).await)
                }
                Err(message) => JsonRpcResponse::failure(id, INVALID_PARAMS, message),
            }
        }
        "ping" | "shutdown" => {
            debug!("Handling {}", request.method);
            JsonRpcResponse::success(id, json!({}))
        }
        _ => JsonRpcResponse::failure(
            id,
            METHOD_NOT_FOUND,
            format!("Method not found: {}", request.method),
        ),
    };
    Some(response)
}

/// Tool name and arguments from `tools/call` params.
fn tool_call_target(params: Option<Value>) -> Result<(String, Value), &'static str> {
    let params = params.ok_or("Missing params for tools/call")?;
    let name = params
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or("Missing tool name")?
        .to_string();
    let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);
    Ok((name, arguments))
}

async fn write_responses<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        write_response(&mut writer, &response).await?;
    }
    Ok(())
}

/// Write one JSON-RPC response as a single line
async fn write_response<W>(writer: &mut W, response: &JsonRpcResponse) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(response).context("Failed to serialize response")?;
    line.push(b'\n');
    writer
        .write_all(&line)
        .await
        .context("Failed to write response to stdout")?;
    writer.flush().await.context("Failed to flush stdout")?;
    Ok(())
}

#[cfg(test)]
#[path = "mcp_server_tests.rs"]
mod tests;
