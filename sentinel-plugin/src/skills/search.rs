//! Memory search skill.

use std::sync::Arc;

use async_trait::async_trait;
use sentinel_common::ApiOperation;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{parse_args, Skill};
use crate::client::Gateway;
use crate::error::{Error, Result};

const DEFAULT_LIMIT: u32 = 5;
const MAX_LIMIT: u32 = 20;

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    /// Integral values only; `5.0` is accepted as 5.
    #[serde(default)]
    limit: Option<f64>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// Results returned to the agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    pub ok: bool,
    /// Number of results the gateway returned, before truncation.
    pub count: usize,
    pub results: Vec<Value>,
}

/// The `search_remote_memory` skill.
pub struct SearchMemorySkill {
    gateway: Arc<dyn Gateway>,
}

impl SearchMemorySkill {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn search(
        &self,
        query: &str,
        limit: u32,
        tags: Option<Vec<String>>,
    ) -> Result<SearchResults> {
        let response = self
            .gateway
            .query(
                ApiOperation::MemoriesSearch,
                json!({
                    "query": query,
                    "limit": limit,
                    "tags": tags,
                    "includeArchived": false,
                }),
            )
            .await?;

        let results = match response.get("results") {
            Some(Value::Array(results)) => results.clone(),
            _ => Vec::new(),
        };
        let count = results.len();
        tracing::debug!(query, count, "Memory search completed");

        Ok(SearchResults {
            ok: true,
            count,
            results: results.into_iter().take(limit as usize).collect(),
        })
    }
}

fn validate(args: &SearchArgs) -> Result<u32> {
    if args.query.is_empty() {
        return Err(Error::InvalidArguments("query must not be empty".to_string()));
    }

    match args.limit {
        None => Ok(DEFAULT_LIMIT),
        Some(limit) if limit.fract() == 0.0 && (1.0..=MAX_LIMIT as f64).contains(&limit) => {
            Ok(limit as u32)
        }
        Some(limit) => Err(Error::InvalidArguments(format!(
            "limit must be between 1 and {}, got {}",
            MAX_LIMIT, limit
        ))),
    }
}

#[async_trait]
impl Skill for SearchMemorySkill {
    fn name(&self) -> &'static str {
        "search_remote_memory"
    }

    fn description(&self) -> &'static str {
        "Searches saved Sentinel memories by query and optional tags."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "minLength": 1,
                    "description": "Search phrase for memory retrieval"
                },
                "limit": { "type": "integer", "minimum": 1, "maximum": MAX_LIMIT },
                "tags": { "type": "array", "items": { "type": "string" } }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let args: SearchArgs = parse_args(args)?;
        let limit = validate(&args)?;
        let results = self.search(&args.query, limit, args.tags).await?;
        serde_json::to_value(results).map_err(|e| Error::InvalidResponse(e.to_string()))
    }
}
