use ads_mcp::config::{missing_env_vars, REQUIRED_ENV_VARS};
use ads_mcp::domain::ports::GaqlExecutor;
use ads_mcp::utils::validation::Validate;
use ads_mcp::{GoogleAdsClient, GoogleAdsConfig};

// 在接上 MCP host 之前，先確認憑證設定可以真的打到 API
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt::init();

    println!("🚀 Google Ads 憑證檢測");

    // 逐一檢查必要環境變數，已設定的只顯示前幾碼
    for name in REQUIRED_ENV_VARS {
        match std::env::var(name) {
            Ok(value) if !value.trim().is_empty() => {
                let display = if value.len() > 8 {
                    format!("{}...", value.chars().take(4).collect::<String>())
                } else {
                    "***".to_string()
                };
                println!("  ✅ {}: {}", name, display);
            }
            _ => println!("  ❌ {}: not set", name),
        }
    }

    let missing = missing_env_vars();
    if !missing.is_empty() {
        anyhow::bail!(
            "Missing required environment variables: {}",
            missing.join(", ")
        );
    }

    let config = GoogleAdsConfig::from_env()?;
    config.validate()?;
    println!("✅ 配置驗證通過");

    let client = GoogleAdsClient::new(&config);

    // 對登入帳戶做最小查詢，確認 token 交換與 API 權限都正常
    println!("📡 正在查詢帳戶 {} ...", config.login_customer_id);
    let rows = client
        .search(
            &config.login_customer_id,
            "SELECT customer.id, customer.descriptive_name FROM customer LIMIT 1",
        )
        .await?;

    println!("✅ API 憑證有效，查詢回傳 {} 筆", rows.len());
    for row in &rows {
        println!("  - {}", row);
    }

    Ok(())
}
