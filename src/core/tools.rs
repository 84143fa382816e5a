use crate::core::gaql::{
    contains_mutation_keywords, validate_customer_id, LIST_ACCOUNTS_QUERY,
};
use crate::core::serialize::serialize_row;
use crate::domain::model::{AccountRecord, QueryReport, ResponseFormat};
use crate::domain::ports::GaqlExecutor;
use crate::utils::error::{AdsError, Result};
use serde_json::{json, Value};
use std::time::Duration;

pub const GAQL_TOOL_NAME: &str = "run_google_ads_gaql";
pub const LIST_ACCOUNTS_TOOL_NAME: &str = "google_ads_list_accounts";

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(120);

// 請求處理情境：啟動時建構一次，之後唯讀傳遞。
// 憑證不齊時仍可建構（tools/list 必須照常運作），工具呼叫才回報缺漏。
pub struct ToolContext<E> {
    executor: Option<E>,
    login_customer_id: Option<String>,
    missing: Vec<String>,
    query_timeout: Duration,
}

impl<E: GaqlExecutor> ToolContext<E> {
    pub fn new(executor: E, login_customer_id: String) -> Self {
        Self {
            executor: Some(executor),
            login_customer_id: Some(login_customer_id),
            missing: Vec::new(),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn unconfigured(missing: Vec<String>) -> Self {
        Self {
            executor: None,
            login_customer_id: None,
            missing,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    // 憑證不齊但登入帳戶已設定時，帳戶列表工具要回報缺漏清單而不是 MCC 未設定
    pub fn with_login_customer_id(mut self, login_customer_id: Option<String>) -> Self {
        self.login_customer_id = login_customer_id;
        self
    }

    pub fn missing_env_vars(&self) -> &[String] {
        &self.missing
    }

    fn executor(&self) -> Result<&E> {
        self.executor.as_ref().ok_or_else(|| AdsError::ConfigError {
            message: missing_credentials_message(&self.missing),
        })
    }
}

pub fn missing_credentials_message(missing: &[String]) -> String {
    let mut message = String::from("Missing required environment variables for OAuth 2.0:\n");
    for var in missing {
        message.push_str(&format!("  - {}\n", var));
    }
    message.push_str("\nPlease configure these in your MCP host settings.");
    message
}

// 封套內的錯誤文字：驗證與設定類錯誤已是完整訊息，其他用 Display
fn envelope_error(error: &AdsError) -> String {
    match error {
        AdsError::ValidationError { message } | AdsError::ConfigError { message } => {
            message.clone()
        }
        other => other.to_string(),
    }
}

// 以計時器包裹外部呼叫：計時器先到只是放棄等待，不保證遠端作業停止
async fn execute_query<E: GaqlExecutor>(
    ctx: &ToolContext<E>,
    customer_id: &str,
    query: &str,
    use_streaming: bool,
) -> Result<Vec<Value>> {
    let executor = ctx.executor()?;
    let seconds = ctx.query_timeout.as_secs();

    tracing::debug!(
        "Executing GAQL query for customer {} ({} chars, streaming: {})",
        customer_id,
        query.len(),
        use_streaming
    );

    let call = async {
        if use_streaming {
            executor.search_stream(customer_id, query).await
        } else {
            executor.search(customer_id, query).await
        }
    };

    match tokio::time::timeout(ctx.query_timeout, call).await {
        Ok(Ok(rows)) => {
            tracing::debug!("GAQL query completed with {} rows", rows.len());
            Ok(rows)
        }
        Ok(Err(e)) => Err(AdsError::QueryError {
            message: envelope_error(&e),
            query: query.to_string(),
        }),
        Err(_) => Err(AdsError::TimeoutError { seconds }),
    }
}

pub async fn run_google_ads_gaql<E: GaqlExecutor>(ctx: &ToolContext<E>, args: &Value) -> Value {
    let customer_id = args
        .get("customer_id")
        .and_then(Value::as_str)
        .unwrap_or("");
    let query = args.get("query").and_then(Value::as_str).unwrap_or("");
    let use_streaming = args
        .get("use_streaming")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let formatted = match validate_customer_id(customer_id) {
        Ok(id) => id,
        Err(e) => {
            return json!({ "success": false, "error": envelope_error(&e) });
        }
    };

    if query.trim().is_empty() {
        return json!({
            "success": false,
            "error": "Query is required and must be a non-empty string",
        });
    }

    if contains_mutation_keywords(query) {
        return json!({
            "success": false,
            "error": "This tool is read-only and does not support mutation operations (CREATE, UPDATE, REMOVE, MUTATE)",
        });
    }

    let query = query.trim();

    match execute_query(ctx, &formatted, query, use_streaming).await {
        Ok(rows) => {
            let results: Vec<Value> = rows.iter().map(serialize_row).collect();
            let report = QueryReport {
                success: true,
                customer_id: formatted,
                query: query.to_string(),
                result_count: results.len(),
                results,
                streaming_used: use_streaming,
            };
            serde_json::to_value(report).unwrap_or_else(|e| {
                json!({ "success": false, "error": format!("Failed to encode response: {}", e) })
            })
        }
        Err(e) => {
            tracing::error!("❌ GAQL query error: {}", e);
            json!({
                "success": false,
                "error": envelope_error(&e),
                "customer_id": formatted,
                "query": query,
            })
        }
    }
}

pub async fn google_ads_list_accounts<E: GaqlExecutor>(ctx: &ToolContext<E>, args: &Value) -> Value {
    let format = ResponseFormat::from_arg(args.get("response_format").and_then(Value::as_str));

    let Some(mcc_id) = ctx.login_customer_id.clone() else {
        return json!({
            "success": false,
            "error": "MCC account ID not configured. Set GOOGLE_ADS_LOGIN_CUSTOMER_ID environment variable.",
        });
    };

    match execute_query(ctx, &mcc_id, LIST_ACCOUNTS_QUERY, false).await {
        Ok(rows) => {
            let accounts: Vec<AccountRecord> = rows.iter().map(account_from_row).collect();

            match format {
                ResponseFormat::Json => json!({
                    "success": true,
                    "mcc_account_id": mcc_id,
                    "total_accounts": accounts.len(),
                    "accounts": accounts,
                }),
                ResponseFormat::Markdown => json!({
                    "success": true,
                    "content": render_accounts_markdown(&mcc_id, &accounts),
                }),
            }
        }
        Err(e) => {
            tracing::error!("❌ List accounts error: {}", e);
            json!({ "success": false, "error": envelope_error(&e) })
        }
    }
}

// REST 回應的列是 camelCase 的 customerClient 物件，攤平成帳戶記錄
fn account_from_row(row: &Value) -> AccountRecord {
    let client = row.get("customerClient").cloned().unwrap_or(Value::Null);

    let id = match client.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    let text_or_na = |key: &str| -> String {
        client
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or("N/A")
            .to_string()
    };

    // 枚舉欄位可能是純字串，也可能是帶 name 的物件
    let status = match client.get("status") {
        Some(Value::Object(map)) => map
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN")
            .to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "UNKNOWN".to_string(),
    };

    AccountRecord {
        id,
        name: text_or_na("descriptiveName"),
        currency: text_or_na("currencyCode"),
        timezone: text_or_na("timeZone"),
        status,
        is_manager: client.get("manager").and_then(Value::as_bool).unwrap_or(false),
        is_test_account: client
            .get("testAccount")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

fn render_accounts_markdown(mcc_id: &str, accounts: &[AccountRecord]) -> String {
    if accounts.is_empty() {
        return format!(
            "# Google Ads Accounts\n\nNo accessible accounts found under MCC {}.",
            mcc_id
        );
    }

    let mut lines = vec![
        "# Google Ads Accounts".to_string(),
        String::new(),
        format!("**MCC Account:** {}", mcc_id),
        format!("**Total Accounts:** {}", accounts.len()),
        String::new(),
        "| Account ID | Name | Currency | Status | Timezone |".to_string(),
        "|------------|------|----------|--------|----------|".to_string(),
    ];

    for account in accounts {
        lines.push(format!(
            "| {} | {} | {} | {} | {} |",
            account.id, account.name, account.currency, account.status, account.timezone
        ));
    }

    lines.join("\n")
}

// tools/list 回傳的兩個固定工具描述
pub fn tool_descriptors() -> Vec<Value> {
    vec![
        json!({
            "name": GAQL_TOOL_NAME,
            "description": "Execute a Google Ads Query Language (GAQL) query for data retrieval.\n\n\
This tool allows you to query any Google Ads resource including:\n\
- Campaigns, Ad Groups, Ads\n\
- Keywords, Search Terms\n\
- Metrics and Performance data\n\
- Account structure and settings\n\n\
IMPORTANT: This tool is read-only. Mutation operations (CREATE, UPDATE, REMOVE) are blocked for safety.\n\n\
Common GAQL Resources:\n\
- campaign: Campaign-level data\n\
- ad_group: Ad group data\n\
- keyword_view: Keyword performance\n\
- search_term_view: Search query reports\n\
- customer: Account information\n\n\
Example queries:\n\
1. Campaign performance:\n\
   SELECT campaign.name, metrics.impressions, metrics.clicks, metrics.cost_micros\n\
   FROM campaign\n\
   WHERE segments.date DURING LAST_30_DAYS\n\n\
2. Top keywords:\n\
   SELECT ad_group_criterion.keyword.text, metrics.clicks, metrics.conversions\n\
   FROM keyword_view\n\
   WHERE segments.date DURING LAST_7_DAYS\n\
   ORDER BY metrics.clicks DESC\n\
   LIMIT 50",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "customer_id": {
                        "type": "string",
                        "description": "Google Ads customer ID (format: 1234567890 or 123-456-7890)",
                    },
                    "query": {
                        "type": "string",
                        "description": "The Google Ads Query Language (GAQL) query to execute",
                    },
                    "use_streaming": {
                        "type": "boolean",
                        "description": "Use streaming mode for large result sets (default: false)",
                        "default": false,
                    },
                },
                "required": ["customer_id", "query"],
            },
        }),
        json!({
            "name": LIST_ACCOUNTS_TOOL_NAME,
            "description": "List all Google Ads accounts accessible under the configured MCC (Manager) account.\n\n\
Returns account details including:\n\
- Account ID\n\
- Account name\n\
- Currency code\n\
- Timezone\n\
- Status (ENABLED/PAUSED)\n\
- Manager and test account flags\n\n\
Use this tool to discover which accounts you can query with run_google_ads_gaql.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "response_format": {
                        "type": "string",
                        "enum": ["markdown", "json"],
                        "description": "Output format: \"markdown\" for human-readable or \"json\" for structured data",
                        "default": "markdown",
                    },
                },
                "required": [],
            },
        }),
    ]
}
