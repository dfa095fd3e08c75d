//! Plugin entry point wiring the gateway client to the skills.

use std::sync::Arc;

use serde_json::Value;

use crate::client::{Gateway, SentinelClient};
use crate::config::SentinelConfig;
use crate::error::Result;
use crate::skills::{
    BackupSkill, HeartbeatSkill, SaveMemorySkill, SearchMemorySkill, SkillRegistry,
    WatermarkStore,
};

/// The Sentinel plugin as seen by the OpenClaw runtime.
///
/// Owns the memory watermarks, so heartbeat novelty tracking lasts as long
/// as this value.
pub struct Sentinel {
    gateway: Arc<dyn Gateway>,
    skills: SkillRegistry,
    watermarks: Arc<WatermarkStore>,
}

impl Sentinel {
    /// Build the plugin against the real gateway. Requires an API key.
    pub async fn new(config: &SentinelConfig) -> Result<Self> {
        let client = Arc::new(SentinelClient::from_config(config)?);
        tracing::info!(
            base_url = %client.base_url(),
            agent_id = %config.agent_id,
            "Sentinel plugin initialised"
        );
        Ok(Self::with_gateway(client, config.workspace_dir.clone()).await)
    }

    /// Build the plugin on any gateway implementation.
    pub async fn with_gateway(gateway: Arc<dyn Gateway>, workspace_dir: Option<String>) -> Self {
        let watermarks = Arc::new(WatermarkStore::new());
        let skills = SkillRegistry::new();

        skills
            .register(Arc::new(SaveMemorySkill::new(gateway.clone())))
            .await;
        skills
            .register(Arc::new(SearchMemorySkill::new(gateway.clone())))
            .await;
        skills
            .register(Arc::new(BackupSkill::new(gateway.clone(), workspace_dir)))
            .await;
        skills
            .register(Arc::new(HeartbeatSkill::new(
                gateway.clone(),
                watermarks.clone(),
            )))
            .await;

        Self {
            gateway,
            skills,
            watermarks,
        }
    }

    pub fn agent_id(&self) -> &str {
        self.gateway.agent_id()
    }

    pub fn skills(&self) -> &SkillRegistry {
        &self.skills
    }

    pub fn watermarks(&self) -> &Arc<WatermarkStore> {
        &self.watermarks
    }

    /// Invoke a skill by its tool name.
    pub async fn invoke(&self, skill: &str, args: Value) -> Result<Value> {
        self.skills.invoke(skill, args).await
    }
}
