use crate::config::GoogleAdsConfig;
use crate::domain::ports::GaqlExecutor;
use crate::utils::error::{AdsError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

// 到期前提早換發，避免請求途中 token 失效
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

pub struct GoogleAdsClient {
    http: Client,
    developer_token: String,
    login_customer_id: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    api_base_url: String,
    oauth_token_url: String,
    api_version: String,
    token_cache: Mutex<Option<CachedToken>>,
}

impl GoogleAdsClient {
    pub fn new(config: &GoogleAdsConfig) -> Self {
        Self {
            http: Client::new(),
            developer_token: config.developer_token.clone(),
            login_customer_id: config.login_customer_id.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            refresh_token: config.refresh_token.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            oauth_token_url: config.oauth_token_url.clone(),
            api_version: config.api_version.clone(),
            token_cache: Mutex::new(None),
        }
    }

    // refresh token 換 access token，快取到接近到期為止
    async fn access_token(&self) -> Result<String> {
        let mut cache = self.token_cache.lock().await;

        if let Some(token) = cache.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.access_token.clone());
            }
        }

        tracing::debug!("Refreshing Google Ads access token");

        let response = self
            .http
            .post(&self.oauth_token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", self.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdsError::ApiStatusError {
                status: status.as_u16(),
                body: format!("OAuth token refresh failed: {}", body),
            });
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        let access_token = token.access_token.clone();

        *cache = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + lifetime,
        });

        Ok(access_token)
    }

    fn search_url(&self, customer_id: &str, streaming: bool) -> String {
        format!(
            "{}/{}/customers/{}/googleAds:{}",
            self.api_base_url,
            self.api_version,
            customer_id,
            if streaming { "searchStream" } else { "search" }
        )
    }

    async fn post_search(&self, url: &str, body: &Value) -> Result<Value> {
        let access_token = self.access_token().await?;

        let response = self
            .http
            .post(url)
            .bearer_auth(&access_token)
            .header("developer-token", &self.developer_token)
            .header("login-customer-id", &self.login_customer_id)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            // 盡量取出 API 錯誤物件裡的 message，取不到就回整段內容
            let message = serde_json::from_str::<Value>(&body_text)
                .ok()
                .and_then(|v| {
                    v.get("error")
                        .and_then(|e| e.get("message"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or(body_text);
            return Err(AdsError::ApiStatusError {
                status: status.as_u16(),
                body: message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl GaqlExecutor for GoogleAdsClient {
    async fn search(&self, customer_id: &str, query: &str) -> Result<Vec<Value>> {
        let url = self.search_url(customer_id, false);
        let mut rows = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut body = json!({ "query": query });
            if let Some(token) = &page_token {
                body["pageToken"] = json!(token);
            }

            let payload = self.post_search(&url, &body).await?;

            if let Some(results) = payload.get("results").and_then(Value::as_array) {
                rows.extend(results.iter().cloned());
            }

            match payload.get("nextPageToken").and_then(Value::as_str) {
                Some(token) if !token.is_empty() => page_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(rows)
    }

    async fn search_stream(&self, customer_id: &str, query: &str) -> Result<Vec<Value>> {
        let url = self.search_url(customer_id, true);
        let payload = self.post_search(&url, &json!({ "query": query })).await?;

        // searchStream 回傳批次陣列，逐批攤平 results
        let mut rows = Vec::new();
        match &payload {
            Value::Array(batches) => {
                for batch in batches {
                    if let Some(results) = batch.get("results").and_then(Value::as_array) {
                        rows.extend(results.iter().cloned());
                    }
                }
            }
            other => {
                if let Some(results) = other.get("results").and_then(Value::as_array) {
                    rows.extend(results.iter().cloned());
                }
            }
        }

        Ok(rows)
    }
}
