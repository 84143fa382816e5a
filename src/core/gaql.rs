use crate::utils::error::{AdsError, Result};
use regex::Regex;
use std::sync::OnceLock;

// 只讀安全防線使用的變更關鍵字，固定清單，不可擴充語意
pub const MUTATION_KEYWORDS: [&str; 4] = ["create", "update", "remove", "mutate"];

// 列出 MCC 下啟用中非管理帳戶的固定查詢
pub const LIST_ACCOUNTS_QUERY: &str = "\
SELECT
  customer_client.id,
  customer_client.descriptive_name,
  customer_client.currency_code,
  customer_client.time_zone,
  customer_client.status,
  customer_client.manager,
  customer_client.test_account
FROM customer_client
WHERE customer_client.status = 'ENABLED'
  AND customer_client.manager = FALSE
ORDER BY customer_client.id";

fn customer_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{10}$").expect("customer id pattern is valid"))
}

pub fn format_customer_id(customer_id: &str) -> String {
    customer_id.replace('-', "")
}

// 驗證失敗是可回報的結果而不是例外，訊息直接放進回應封套
pub fn validate_customer_id(customer_id: &str) -> Result<String> {
    if customer_id.is_empty() {
        return Err(AdsError::ValidationError {
            message: "Customer ID is required".to_string(),
        });
    }

    let formatted = format_customer_id(customer_id);

    if !customer_id_pattern().is_match(&formatted) {
        return Err(AdsError::ValidationError {
            message: format!(
                "Invalid customer ID format: \"{}\". Expected 10 digits (e.g., 1234567890 or 123-456-7890)",
                customer_id
            ),
        });
    }

    Ok(formatted)
}

// 啟發式的子字串掃描，不是解析器：會誤擋 update_time 這類欄位名，
// 也攔不住語意上等價但字面不同的變更方式。此行為是刻意保留的。
pub fn contains_mutation_keywords(query: &str) -> bool {
    let lower = query.to_lowercase();
    MUTATION_KEYWORDS
        .iter()
        .any(|keyword| lower.contains(keyword))
}
