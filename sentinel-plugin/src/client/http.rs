//! HTTP implementation of the Sentinel gateway.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use sentinel_common::{ApiOperation, HttpMethod};
use serde_json::Value;

use super::Gateway;
use crate::config::SentinelConfig;
use crate::error::{Error, Result};

/// Default bound on every request, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Sentinel gateway client.
///
/// Maps operations to REST endpoints, sends GET arguments as query
/// parameters and POST arguments as a JSON body.
pub struct SentinelClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    agent_id: String,
    timeout: Duration,
}

impl SentinelClient {
    pub fn new(api_key: &str, base_url: &str, agent_id: &str) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            agent_id: agent_id.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }

    /// Replace the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a client from resolved configuration. Fails without an API key.
    pub fn from_config(config: &SentinelConfig) -> Result<Self> {
        let api_key = config.api_key.as_deref().ok_or_else(|| {
            Error::Config("Sentinel Error: SENTINEL_API_KEY is not set.".to_string())
        })?;
        Ok(Self::new(api_key, &config.api_base_url, &config.agent_id))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request(&self, operation: ApiOperation, args: Value) -> Result<Value> {
        let url = format!("{}{}", self.base_url, operation.endpoint());
        let method = operation.method();
        let args = match args {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        let builder = match method {
            HttpMethod::Get => self
                .http_client
                .get(&url)
                .query(&query_pairs(&args))
                .header(CONTENT_TYPE, "application/json"),
            // `json` sets the content type
            HttpMethod::Post => self.http_client.post(&url).json(&args),
        };

        tracing::debug!(operation = %operation, method = %method, url = %url, "Sentinel request");
        let start = Instant::now();
        let result = self.send(builder).await;

        match &result {
            Ok(_) => tracing::debug!(
                operation = %operation,
                duration_ms = %start.elapsed().as_millis(),
                "Sentinel request succeeded"
            ),
            Err(e) => tracing::debug!(
                operation = %operation,
                duration_ms = %start.elapsed().as_millis(),
                error = %e,
                "Sentinel request failed"
            ),
        }

        result
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Value> {
        let response = builder
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|body| body.get("error").and_then(Value::as_str).map(String::from))
                .unwrap_or_else(|| format!("HTTP {} from Sentinel API", status.as_u16()));
            return Err(Error::Api(detail));
        }

        if text.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| Error::InvalidResponse(e.to_string()))
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout(self.timeout.as_secs())
        } else {
            Error::Communication(e.to_string())
        }
    }
}

/// Scalar arguments become query parameters; null and nested values are not sent.
fn query_pairs(args: &Value) -> Vec<(String, String)> {
    let Some(map) = args.as_object() else {
        return Vec::new();
    };

    map.iter()
        .filter_map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key.clone(), rendered))
        })
        .collect()
}

#[async_trait]
impl Gateway for SentinelClient {
    fn agent_id(&self) -> &str {
        &self.agent_id
    }

    async fn query(&self, operation: ApiOperation, args: Value) -> Result<Value> {
        self.request(operation, args).await
    }

    async fn mutate(&self, operation: ApiOperation, args: Value) -> Result<Value> {
        self.request(operation, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_base_url_normalization() {
        let client = SentinelClient::new("key", "http://localhost:3000/", "agent");
        assert_eq!(client.base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_default_timeout() {
        let client = SentinelClient::new("key", "http://localhost", "agent");
        assert_eq!(client.timeout, Duration::from_secs(REQUEST_TIMEOUT_SECS));

        let client = client.with_timeout(Duration::from_secs(2));
        assert_eq!(client.timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_query_pairs_keep_scalars_only() {
        let mut pairs = query_pairs(&json!({
            "query": "coffee",
            "limit": 5,
            "includeArchived": false,
            "tags": ["a", "b"],
            "missing": null,
            "nested": {"x": 1}
        }));
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("includeArchived".to_string(), "false".to_string()),
                ("limit".to_string(), "5".to_string()),
                ("query".to_string(), "coffee".to_string()),
            ]
        );
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let config = SentinelConfig {
            api_key: None,
            api_base_url: "http://localhost".to_string(),
            agent_id: "agent".to_string(),
            workspace_dir: None,
            agent_id_configured: false,
        };
        let err = SentinelClient::from_config(&config).err().unwrap();
        assert_eq!(err.to_string(), "Sentinel Error: SENTINEL_API_KEY is not set.");
    }
}
