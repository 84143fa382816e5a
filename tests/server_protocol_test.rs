use ads_mcp::core::server::McpServer;
use ads_mcp::core::tools::ToolContext;
use ads_mcp::domain::ports::GaqlExecutor;
use ads_mcp::utils::error::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

struct FakeExecutor {
    rows: Vec<Value>,
}

#[async_trait]
impl GaqlExecutor for FakeExecutor {
    async fn search(&self, _customer_id: &str, _query: &str) -> Result<Vec<Value>> {
        Ok(self.rows.clone())
    }

    async fn search_stream(&self, _customer_id: &str, _query: &str) -> Result<Vec<Value>> {
        Ok(self.rows.clone())
    }
}

fn server_with_rows(rows: Vec<Value>) -> McpServer<FakeExecutor> {
    McpServer::new(ToolContext::new(
        FakeExecutor { rows },
        "1111111111".to_string(),
    ))
}

fn call_frame(id: u64, tool: &str, args: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": tool, "arguments": args},
    })
}

fn content_text(response: &Value) -> &str {
    response["result"]["content"][0]["text"].as_str().unwrap()
}

#[tokio::test]
async fn test_initialize_reports_server_info() {
    let server = server_with_rows(vec![]);
    let response = server
        .handle_message(json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"}))
        .await
        .unwrap();

    assert_eq!(response["jsonrpc"], json!("2.0"));
    assert_eq!(response["id"], json!(1));
    assert_eq!(response["result"]["protocolVersion"], json!("2024-11-05"));
    assert_eq!(response["result"]["serverInfo"]["name"], json!("ads-mcp"));
    assert!(response["result"]["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn test_ping_returns_empty_result() {
    let server = server_with_rows(vec![]);
    let response = server
        .handle_message(json!({"jsonrpc": "2.0", "id": 2, "method": "ping"}))
        .await
        .unwrap();
    assert_eq!(response["result"], json!({}));
}

#[tokio::test]
async fn test_tools_list_returns_two_fixed_descriptors() {
    let server = server_with_rows(vec![]);
    let response = server
        .handle_message(json!({"jsonrpc": "2.0", "id": 3, "method": "tools/list"}))
        .await
        .unwrap();

    let tools = response["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0]["name"], json!("run_google_ads_gaql"));
    assert_eq!(tools[1]["name"], json!("google_ads_list_accounts"));
    assert_eq!(
        tools[0]["inputSchema"]["required"],
        json!(["customer_id", "query"])
    );
    assert_eq!(
        tools[1]["inputSchema"]["properties"]["response_format"]["enum"],
        json!(["markdown", "json"])
    );
}

#[tokio::test]
async fn test_unknown_method_is_method_not_found() {
    let server = server_with_rows(vec![]);
    let response = server
        .handle_message(json!({"jsonrpc": "2.0", "id": 4, "method": "resources/list"}))
        .await
        .unwrap();
    assert_eq!(response["error"]["code"], json!(-32601));
}

#[tokio::test]
async fn test_wrong_jsonrpc_version_is_invalid_request() {
    let server = server_with_rows(vec![]);
    let response = server
        .handle_message(json!({"jsonrpc": "1.0", "id": 5, "method": "ping"}))
        .await
        .unwrap();
    assert_eq!(response["error"]["code"], json!(-32600));
}

#[tokio::test]
async fn test_non_object_frame_is_invalid_request() {
    let server = server_with_rows(vec![]);
    let response = server.handle_message(json!([1, 2, 3])).await.unwrap();
    assert_eq!(response["error"]["code"], json!(-32600));
}

#[tokio::test]
async fn test_notifications_produce_no_response() {
    let server = server_with_rows(vec![]);
    let response = server
        .handle_message(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
        .await;
    assert!(response.is_none());
}

#[tokio::test]
async fn test_tools_call_requires_name() {
    let server = server_with_rows(vec![]);
    let response = server
        .handle_message(json!({"jsonrpc": "2.0", "id": 6, "method": "tools/call", "params": {}}))
        .await
        .unwrap();
    assert_eq!(response["error"]["code"], json!(-32602));
}

#[tokio::test]
async fn test_unknown_tool_yields_tagged_failure_envelope() {
    let server = server_with_rows(vec![]);
    let response = server
        .handle_message(call_frame(7, "does_not_exist", json!({})))
        .await
        .unwrap();

    // dispatch failures are envelopes, not protocol errors; the server keeps serving
    assert_eq!(response["result"]["isError"], json!(true));
    let text = content_text(&response);
    assert!(text.contains("Unknown tool: does_not_exist"));
    let envelope: Value = serde_json::from_str(text).unwrap();
    assert_eq!(envelope["success"], json!(false));
    assert_eq!(envelope["tool"], json!("does_not_exist"));
}

#[tokio::test]
async fn test_gaql_call_returns_text_content_item() {
    let server = server_with_rows(vec![json!({"campaign": {"id": "42"}})]);
    let response = server
        .handle_message(call_frame(
            8,
            "run_google_ads_gaql",
            json!({"customer_id": "1234567890", "query": "SELECT campaign.id FROM campaign"}),
        ))
        .await
        .unwrap();

    assert_eq!(response["result"]["isError"], json!(false));
    assert_eq!(response["result"]["content"][0]["type"], json!("text"));

    let envelope: Value = serde_json::from_str(content_text(&response)).unwrap();
    assert_eq!(envelope["success"], json!(true));
    assert_eq!(envelope["result_count"], json!(1));
}

#[tokio::test]
async fn test_validation_failure_sets_error_flag() {
    let server = server_with_rows(vec![]);
    let response = server
        .handle_message(call_frame(
            9,
            "run_google_ads_gaql",
            json!({"customer_id": "bogus", "query": "SELECT campaign.id FROM campaign"}),
        ))
        .await
        .unwrap();

    assert_eq!(response["result"]["isError"], json!(true));
    assert!(content_text(&response).contains("Invalid customer ID format"));
}

#[tokio::test]
async fn test_markdown_content_is_passed_through_untouched() {
    let server = server_with_rows(vec![]);
    let response = server
        .handle_message(call_frame(10, "google_ads_list_accounts", json!({})))
        .await
        .unwrap();

    assert_eq!(response["result"]["isError"], json!(false));
    assert_eq!(
        content_text(&response),
        "# Google Ads Accounts\n\nNo accessible accounts found under MCC 1111111111."
    );
}

#[tokio::test]
async fn test_missing_credentials_envelope_lists_variables() {
    let ctx = ToolContext::<FakeExecutor>::unconfigured(vec![
        "GOOGLE_ADS_DEVELOPER_TOKEN".to_string(),
        "GOOGLE_ADS_CLIENT_SECRET".to_string(),
    ]);
    let server = McpServer::new(ctx);
    let response = server
        .handle_message(call_frame(
            11,
            "run_google_ads_gaql",
            json!({"customer_id": "1234567890", "query": "SELECT campaign.id FROM campaign"}),
        ))
        .await
        .unwrap();

    assert_eq!(response["result"]["isError"], json!(true));
    let text = content_text(&response);
    assert!(text.contains("Missing required environment variables for OAuth 2.0:"));
    assert!(text.contains("GOOGLE_ADS_DEVELOPER_TOKEN"));
    assert!(text.contains("GOOGLE_ADS_CLIENT_SECRET"));
}

#[tokio::test]
async fn test_oversized_response_is_truncated_to_budget() {
    // one row with a huge text field pushes the rendered envelope past the budget
    let big = "x".repeat(30_000);
    let server = server_with_rows(vec![json!({"campaign": {"description": big}})]);
    let response = server
        .handle_message(call_frame(
            12,
            "run_google_ads_gaql",
            json!({"customer_id": "1234567890", "query": "SELECT campaign.id FROM campaign"}),
        ))
        .await
        .unwrap();

    let text = content_text(&response);
    assert_eq!(text.chars().count(), 25_000);
    assert!(text.contains("--- RESPONSE TRUNCATED ---"));
    assert!(text.contains("Truncated to: 25,000 characters"));
}
