use std::time::Duration;

use async_trait::async_trait;
use common::{IndexName, TaskUid};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ClientError, Result};
use crate::wire::{CreateIndexRequest, IndexStats, SearchRequest, TaskInfo, TaskRef};
use crate::{DeleteOutcome, IndexingService, SearchOutcome};

/// Connection settings for [`SearchClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service base address, e.g. `http://localhost:7700`
    pub base_url: String,
    /// Sent as a bearer token when present
    pub api_key: Option<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for a Meilisearch-compatible indexing service.
///
/// Holds nothing but the connection handle; cloning is cheap and clones share
/// the connection pool.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl SearchClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::Configuration(format!(
                "base URL must start with http:// or https://, got '{}'",
                config.base_url
            )));
        }

        let http = Client::builder()
            .user_agent(concat!("indexbench/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.filter(|key| !key.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn send(operation: &'static str, request: RequestBuilder) -> Result<Response> {
        request
            .send()
            .await
            .map_err(|source| ClientError::ServiceUnavailable { operation, source })
    }
}

/// Pass 2xx responses through, turn anything else into `UnexpectedStatus`.
async fn expect_success(operation: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    Err(ClientError::UnexpectedStatus {
        operation,
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(operation: &'static str, response: Response) -> Result<T> {
    let text = response
        .text()
        .await
        .map_err(|source| ClientError::ServiceUnavailable { operation, source })?;
    serde_json::from_str(&text).map_err(|source| ClientError::Decode { operation, source })
}

#[async_trait]
impl IndexingService for SearchClient {
    async fn delete_index(&self, name: &IndexName) -> Result<DeleteOutcome> {
        const OP: &str = "delete index";
        let path = format!("/indexes/{}", name);
        let response = Self::send(OP, self.request(Method::DELETE, &path)).await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(index = %name, "index absent, nothing to delete");
            return Ok(DeleteOutcome::NotFound);
        }

        let response = expect_success(OP, response).await?;
        // Some backends delete synchronously and answer 204 without a body
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(DeleteOutcome::Deleted(None));
        }
        let task: TaskRef = decode(OP, response).await?;
        Ok(DeleteOutcome::Deleted(Some(task.task_uid)))
    }

    async fn create_index(&self, name: &IndexName, primary_key: &str) -> Result<Option<TaskUid>> {
        const OP: &str = "create index";
        let body = CreateIndexRequest {
            uid: name.as_str(),
            primary_key,
        };
        let response = Self::send(OP, self.request(Method::POST, "/indexes").json(&body)).await?;
        let response = expect_success(OP, response).await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let task: TaskRef = decode(OP, response).await?;
        Ok(Some(task.task_uid))
    }

    async fn submit_documents(&self, name: &IndexName, batch: &[Value]) -> Result<TaskUid> {
        const OP: &str = "submit documents";
        let path = format!("/indexes/{}/documents", name);
        let response = Self::send(OP, self.request(Method::POST, &path).json(batch)).await?;
        let response = expect_success(OP, response).await?;
        let task: TaskRef = decode(OP, response).await?;

        tracing::debug!(index = %name, task = %task.task_uid, documents = batch.len(), "documents enqueued");
        Ok(task.task_uid)
    }

    async fn task_status(&self, task: TaskUid) -> Result<TaskInfo> {
        const OP: &str = "get task";
        let path = format!("/tasks/{}", task);
        let response = Self::send(OP, self.request(Method::GET, &path)).await?;
        let response = expect_success(OP, response).await?;
        decode(OP, response).await
    }

    async fn get_stats(&self, name: &IndexName) -> Result<IndexStats> {
        const OP: &str = "get stats";
        let path = format!("/indexes/{}/stats", name);
        let response = Self::send(OP, self.request(Method::GET, &path)).await?;
        let response = expect_success(OP, response).await?;
        decode(OP, response).await
    }

    async fn search(&self, name: &IndexName, query: &str) -> Result<SearchOutcome> {
        const OP: &str = "search";
        let path = format!("/indexes/{}/search", name);
        let response = Self::send(
            OP,
            self.request(Method::POST, &path).json(&SearchRequest { q: query }),
        )
        .await?;

        let status = response.status().as_u16();
        // The round trip includes the body, not just the headers
        response
            .bytes()
            .await
            .map_err(|source| ClientError::ServiceUnavailable { operation: OP, source })?;
        Ok(SearchOutcome { status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = SearchClient::new(ClientConfig::new("http://localhost:7700/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:7700");
    }

    #[test]
    fn test_rejects_non_http_url() {
        let err = SearchClient::new(ClientConfig::new("localhost:7700")).unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }

    #[test]
    fn test_empty_api_key_is_dropped() {
        let mut config = ClientConfig::new("http://localhost:7700");
        config.api_key = Some(String::new());
        let client = SearchClient::new(config).unwrap();
        assert!(client.api_key.is_none());
    }
}
