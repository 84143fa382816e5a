use serde::{Deserialize, Serialize};

// 帳戶列表工具輸出的扁平帳戶記錄
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: String,
    pub name: String,
    pub currency: String,
    pub timezone: String,
    pub status: String,
    pub is_manager: bool,
    pub is_test_account: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Markdown,
    Json,
}

impl ResponseFormat {
    // 未知值回退到 markdown，與工具的寬鬆輸入處理一致
    pub fn from_arg(value: Option<&str>) -> Self {
        match value {
            Some("json") => ResponseFormat::Json,
            _ => ResponseFormat::Markdown,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub success: bool,
    pub customer_id: String,
    pub query: String,
    pub results: Vec<serde_json::Value>,
    pub result_count: usize,
    pub streaming_used: bool,
}
