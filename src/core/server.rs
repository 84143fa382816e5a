use crate::core::tools::{self, ToolContext};
use crate::core::truncate::truncate_response;
use crate::domain::ports::GaqlExecutor;
use crate::utils::error::Result;
use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "ads-mcp";

#[derive(Debug)]
pub struct RpcError {
    code: i64,
    message: String,
}

impl RpcError {
    fn parse_error(message: impl Into<String>) -> Self {
        Self {
            code: -32700,
            message: message.into(),
        }
    }

    fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            code: -32600,
            message: message.into(),
        }
    }

    fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: format!("Method not found: {}", method),
        }
    }

    fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            code: -32603,
            message: message.into(),
        }
    }
}

fn success_response(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
}

fn error_response(id: Value, error: RpcError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": error.code,
            "message": error.message,
        },
    })
}

pub struct McpServer<E: GaqlExecutor> {
    ctx: ToolContext<E>,
}

impl<E: GaqlExecutor> McpServer<E> {
    pub fn new(ctx: ToolContext<E>) -> Self {
        Self { ctx }
    }

    // 換行分隔的 JSON-RPC 訊息迴圈：stdout 只寫協議框架，日誌全走 stderr
    pub async fn serve_stdio(&self) -> Result<()> {
        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);
        let mut stdout = tokio::io::stdout();
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;
            if bytes_read == 0 {
                break;
            }

            let frame = line.trim();
            if frame.is_empty() {
                continue;
            }

            let incoming: Value = match serde_json::from_str(frame) {
                Ok(value) => value,
                Err(e) => {
                    let response = error_response(
                        Value::Null,
                        RpcError::parse_error(format!("Invalid JSON payload: {}", e)),
                    );
                    write_frame(&mut stdout, &response).await?;
                    continue;
                }
            };

            if let Some(response) = self.handle_message(incoming).await {
                write_frame(&mut stdout, &response).await?;
            }
        }

        Ok(())
    }

    pub async fn handle_message(&self, incoming: Value) -> Option<Value> {
        let Some(object) = incoming.as_object() else {
            return Some(error_response(
                Value::Null,
                RpcError::invalid_request("Request must be a JSON object"),
            ));
        };

        if object.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
            let id = object.get("id").cloned().unwrap_or(Value::Null);
            return Some(error_response(
                id,
                RpcError::invalid_request("jsonrpc must be '2.0'"),
            ));
        }

        let Some(method) = object.get("method").and_then(Value::as_str) else {
            // 多半是客戶端回應；本伺服器不發出請求，直接忽略
            return None;
        };

        let params = object.get("params").cloned().unwrap_or(Value::Null);
        if let Some(id) = object.get("id").cloned() {
            let result = self.handle_request(method, params).await;
            Some(match result {
                Ok(payload) => success_response(id, payload),
                Err(error) => error_response(id, error),
            })
        } else {
            self.handle_notification(method).await;
            None
        }
    }

    async fn handle_notification(&self, method: &str) {
        if !matches!(
            method,
            "notifications/initialized" | "notifications/cancelled"
        ) {
            tracing::debug!("Ignoring unknown notification: {}", method);
        }
    }

    async fn handle_request(&self, method: &str, params: Value) -> std::result::Result<Value, RpcError> {
        match method {
            "initialize" => Ok(self.initialize_payload()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.tools_list_payload()),
            "tools/call" => self.handle_tools_call(params).await,
            _ => Err(RpcError::method_not_found(method)),
        }
    }

    fn initialize_payload(&self) -> Value {
        json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {
                "tools": {
                    "listChanged": false,
                },
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            },
        })
    }

    fn tools_list_payload(&self) -> Value {
        json!({ "tools": tools::tool_descriptors() })
    }

    async fn handle_tools_call(&self, params: Value) -> std::result::Result<Value, RpcError> {
        let params = params
            .as_object()
            .ok_or_else(|| RpcError::invalid_params("tools/call params must be an object"))?;

        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::invalid_params("tools/call requires string field 'name'"))?;

        let args = match params.get("arguments") {
            Some(Value::Object(map)) => Value::Object(map.clone()),
            Some(Value::Null) | None => Value::Object(Map::new()),
            Some(_) => {
                return Err(RpcError::invalid_params(
                    "tools/call 'arguments' must be an object",
                ));
            }
        };

        tracing::debug!("Tool call received: {}", name);

        // 分派邊界：任何未預期的失敗都收斂成帶工具名的失敗封套，伺服器繼續服務
        let envelope = match name {
            tools::GAQL_TOOL_NAME => tools::run_google_ads_gaql(&self.ctx, &args).await,
            tools::LIST_ACCOUNTS_TOOL_NAME => {
                tools::google_ads_list_accounts(&self.ctx, &args).await
            }
            unknown => {
                tracing::error!("Tool execution failed: unknown tool {}", unknown);
                json!({
                    "success": false,
                    "error": format!("Unknown tool: {}", unknown),
                    "tool": unknown,
                })
            }
        };

        let is_error = envelope.get("success").and_then(Value::as_bool) == Some(false);

        // 工具已經渲染好 content 就直接用，否則整個封套轉為縮排 JSON
        let content = match envelope.get("content").and_then(Value::as_str) {
            Some(body) => body.to_string(),
            None => serde_json::to_string_pretty(&envelope)
                .map_err(|e| RpcError::internal(format!("Failed to render response: {}", e)))?,
        };

        let text = truncate_response(&content, "");

        Ok(json!({
            "content": [{ "type": "text", "text": text }],
            "isError": is_error,
        }))
    }
}

async fn write_frame(stdout: &mut tokio::io::Stdout, response: &Value) -> Result<()> {
    let body = serde_json::to_string(response)?;
    stdout.write_all(body.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}
