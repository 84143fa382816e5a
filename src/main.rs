use ads_mcp::config::missing_env_vars;
use ads_mcp::utils::{logger, validation::Validate};
use ads_mcp::{CliConfig, GoogleAdsClient, GoogleAdsConfig, McpServer, ToolContext};
use clap::Parser;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌（stderr；stdout 保留給協議）
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_server_logger(cli.verbose);
    }

    tracing::info!("Starting ads-mcp v{}", env!("CARGO_PKG_VERSION"));

    // 啟動時檢查憑證：缺漏只警告，tools/list 仍須照常回應
    let missing = missing_env_vars();
    let ctx = if missing.is_empty() {
        let config = GoogleAdsConfig::from_env()?;

        if let Err(e) = config.validate() {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }

        let timeout = Duration::from_secs(config.query_timeout_seconds);
        let client = GoogleAdsClient::new(&config);
        ToolContext::new(client, config.login_customer_id.clone()).with_timeout(timeout)
    } else {
        tracing::warn!(
            "⚠️ Missing required environment variables: {}",
            missing.join(", ")
        );
        tracing::warn!("Tool calls will fail until these are configured.");

        let login_customer_id = std::env::var("GOOGLE_ADS_LOGIN_CUSTOMER_ID")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| ads_mcp::core::gaql::format_customer_id(&value));
        ToolContext::<GoogleAdsClient>::unconfigured(missing)
            .with_login_customer_id(login_customer_id)
    };

    let server = McpServer::new(ctx);
    tracing::info!("🚀 MCP server ready on stdio");

    if let Err(e) = server.serve_stdio().await {
        tracing::error!("❌ MCP server terminated: {}", e);
        std::process::exit(1);
    }

    tracing::info!("✅ MCP server shut down cleanly");
    Ok(())
}
