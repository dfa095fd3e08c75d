//! Remote memory skill: saves facts to Sentinel.

use std::sync::Arc;

use async_trait::async_trait;
use sentinel_common::ApiOperation;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{parse_args, Skill};
use crate::client::Gateway;
use crate::error::Result;

/// Where a remembered fact came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemorySource {
    #[default]
    User,
    Web,
    System,
    File,
}

#[derive(Debug, Deserialize)]
struct SaveMemoryArgs {
    content: String,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    source: Option<MemorySource>,
}

/// The `save_remote_memory` skill.
///
/// Gateway failures are reported to the agent as text instead of errors.
pub struct SaveMemorySkill {
    gateway: Arc<dyn Gateway>,
}

impl SaveMemorySkill {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn save(&self, content: &str, tags: Vec<String>, source: MemorySource) -> String {
        let body = json!({
            "content": content,
            "tags": tags,
            "source": source,
        });

        match self.gateway.mutate(ApiOperation::MemoriesCreate, body).await {
            Ok(_) => "Success: Memory saved to Sentinel Cloud.".to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Saving memory failed");
                format!("Error saving memory: {}", e)
            }
        }
    }
}

#[async_trait]
impl Skill for SaveMemorySkill {
    fn name(&self) -> &'static str {
        "save_remote_memory"
    }

    fn description(&self) -> &'static str {
        "Saves important information to Sentinel Cloud. \
         Trigger this if the user says 'Remember that...' or provides critical config/preferences."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "content": { "type": "string", "description": "The fact or data to remember" },
                "tags": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Keywords for categorization"
                },
                "source": { "type": "string", "enum": ["user", "web", "system", "file"] }
            },
            "required": ["content"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let args: SaveMemoryArgs = parse_args(args)?;
        let message = self
            .save(
                &args.content,
                args.tags.unwrap_or_default(),
                args.source.unwrap_or_default(),
            )
            .await;
        Ok(Value::String(message))
    }
}
