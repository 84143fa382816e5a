use crate::core::gaql::{format_customer_id, validate_customer_id};
use crate::utils::error::{AdsError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_url, Validate,
};
use clap::Parser;
use std::env;

pub const REQUIRED_ENV_VARS: [&str; 5] = [
    "GOOGLE_ADS_DEVELOPER_TOKEN",
    "GOOGLE_ADS_LOGIN_CUSTOMER_ID",
    "GOOGLE_ADS_CLIENT_ID",
    "GOOGLE_ADS_CLIENT_SECRET",
    "GOOGLE_ADS_REFRESH_TOKEN",
];

pub const DEFAULT_API_BASE_URL: &str = "https://googleads.googleapis.com";
pub const DEFAULT_OAUTH_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_API_VERSION: &str = "v21";
pub const DEFAULT_QUERY_TIMEOUT_SECONDS: u64 = 120;

#[derive(Debug, Clone, Parser)]
#[command(name = "ads-mcp")]
#[command(about = "Google Ads MCP server exposing GAQL query tools over stdio")]
pub struct CliConfig {
    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines for host log collection")]
    pub log_json: bool,
}

#[derive(Debug, Clone)]
pub struct GoogleAdsConfig {
    pub developer_token: String,
    pub login_customer_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub api_base_url: String,
    pub oauth_token_url: String,
    pub api_version: String,
    pub query_timeout_seconds: u64,
}

// 啟動時先掃一次缺漏清單：缺憑證不擋啟動，只擋工具呼叫
pub fn missing_env_vars() -> Vec<String> {
    REQUIRED_ENV_VARS
        .iter()
        .filter(|name| {
            env::var(name)
                .map(|value| value.trim().is_empty())
                .unwrap_or(true)
        })
        .map(|name| name.to_string())
        .collect()
}

fn require_env(name: &str) -> Result<String> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AdsError::MissingConfigError {
            field: name.to_string(),
        })
}

impl GoogleAdsConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            developer_token: require_env("GOOGLE_ADS_DEVELOPER_TOKEN")?,
            // 登入帳戶 ID 在載入時就去掉分隔線
            login_customer_id: format_customer_id(&require_env("GOOGLE_ADS_LOGIN_CUSTOMER_ID")?),
            client_id: require_env("GOOGLE_ADS_CLIENT_ID")?,
            client_secret: require_env("GOOGLE_ADS_CLIENT_SECRET")?,
            refresh_token: require_env("GOOGLE_ADS_REFRESH_TOKEN")?,
            api_base_url: env::var("GOOGLE_ADS_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            oauth_token_url: env::var("GOOGLE_ADS_OAUTH_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_OAUTH_TOKEN_URL.to_string()),
            api_version: env::var("GOOGLE_ADS_API_VERSION")
                .unwrap_or_else(|_| DEFAULT_API_VERSION.to_string()),
            query_timeout_seconds: env::var("GOOGLE_ADS_QUERY_TIMEOUT_SECONDS")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(DEFAULT_QUERY_TIMEOUT_SECONDS),
        })
    }
}

impl Validate for GoogleAdsConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("developer_token", &self.developer_token)?;
        validate_non_empty_string("client_id", &self.client_id)?;
        validate_non_empty_string("client_secret", &self.client_secret)?;
        validate_non_empty_string("refresh_token", &self.refresh_token)?;

        if validate_customer_id(&self.login_customer_id).is_err() {
            return Err(AdsError::InvalidConfigValueError {
                field: "login_customer_id".to_string(),
                value: self.login_customer_id.clone(),
                reason: "Expected a 10-digit customer ID".to_string(),
            });
        }

        validate_url("api_base_url", &self.api_base_url)?;
        validate_url("oauth_token_url", &self.oauth_token_url)?;
        validate_range(
            "query_timeout_seconds",
            self.query_timeout_seconds,
            1,
            3600,
        )?;

        tracing::info!("✅ Google Ads configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> GoogleAdsConfig {
        GoogleAdsConfig {
            developer_token: "dev-token".to_string(),
            login_customer_id: "1234567890".to_string(),
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            refresh_token: "refresh-token".to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            oauth_token_url: DEFAULT_OAUTH_TOKEN_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            query_timeout_seconds: DEFAULT_QUERY_TIMEOUT_SECONDS,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn test_dashed_login_customer_id_is_rejected() {
        // from_env 會去掉分隔線；直接建構帶分隔線的值必須被驗證擋下
        let mut config = sample_config();
        config.login_customer_id = "123-456-7890".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_api_base_url_is_rejected() {
        let mut config = sample_config();
        config.api_base_url = "not-a-url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut config = sample_config();
        config.query_timeout_seconds = 0;
        assert!(config.validate().is_err());
    }
}
