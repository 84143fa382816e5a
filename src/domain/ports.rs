use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait GaqlExecutor: Send + Sync {
    // 分頁模式：跟隨 nextPageToken 直到取完
    async fn search(&self, customer_id: &str, query: &str) -> Result<Vec<Value>>;

    // 串流模式：批次回應攤平成單一列表
    async fn search_stream(&self, customer_id: &str, query: &str) -> Result<Vec<Value>>;
}
