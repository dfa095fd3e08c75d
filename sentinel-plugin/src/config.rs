//! Configuration for the Sentinel plugin and CLI.

use std::collections::HashMap;

use config::{Config as ConfigLoader, ConfigError, Environment};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://api.openclawsentinel.com";
pub const DEFAULT_AGENT_ID: &str = "default-agent";

/// Environment variable prefix for Sentinel settings (`SENTINEL_API_KEY`, ...).
pub const ENV_PREFIX: &str = "SENTINEL";
/// Agent id variable kept for older OpenClaw setups.
pub const LEGACY_AGENT_ID_VAR: &str = "AGENT_ID";
/// Workspace holding the agent's identity files.
pub const WORKSPACE_DIR_VAR: &str = "OPENCLAW_WORKSPACE_DIR";

/// Resolved runtime configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SentinelConfig {
    /// Bearer token for the gateway. Required to build a client.
    #[serde(default)]
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub agent_id: String,
    #[serde(default)]
    pub workspace_dir: Option<String>,
    /// Whether the agent id came from somewhere other than the built-in default.
    #[serde(skip)]
    pub agent_id_configured: bool,
}

/// Explicit values (typically CLI flags) that win over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub agent_id: Option<String>,
    pub workspace_dir: Option<String>,
}

impl SentinelConfig {
    /// Load configuration from the process environment.
    ///
    /// Sources (in order of precedence):
    /// 1. Explicit overrides
    /// 2. `SENTINEL_*` environment variables
    /// 3. Legacy `AGENT_ID`
    /// 4. Built-in defaults
    pub fn load(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        Self::load_from(overrides, std::env::vars().collect())
    }

    /// Same as [`SentinelConfig::load`] with an explicit environment snapshot.
    pub fn load_from(
        overrides: ConfigOverrides,
        env: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let env: HashMap<String, String> = env
            .into_iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .collect();
        let overrides = ConfigOverrides {
            api_key: non_blank(overrides.api_key),
            base_url: non_blank(overrides.base_url),
            agent_id: non_blank(overrides.agent_id),
            workspace_dir: non_blank(overrides.workspace_dir),
        };

        let legacy_agent_id = env.get(LEGACY_AGENT_ID_VAR).cloned();
        let agent_id_configured = overrides.agent_id.is_some()
            || legacy_agent_id.is_some()
            || env.contains_key(&format!("{}_AGENT_ID", ENV_PREFIX));
        let workspace_dir = overrides
            .workspace_dir
            .or_else(|| env.get(WORKSPACE_DIR_VAR).cloned());

        let loader = ConfigLoader::builder()
            .set_default("api_base_url", DEFAULT_BASE_URL)?
            .set_default(
                "agent_id",
                legacy_agent_id.unwrap_or_else(|| DEFAULT_AGENT_ID.to_string()),
            )?
            .add_source(Environment::with_prefix(ENV_PREFIX).source(Some(env)))
            .set_override_option("api_key", overrides.api_key)?
            .set_override_option("api_base_url", overrides.base_url)?
            .set_override_option("agent_id", overrides.agent_id)?
            .set_override_option("workspace_dir", workspace_dir)?
            .build()?;

        let mut config: SentinelConfig = loader.try_deserialize()?;
        config.api_key = non_blank(config.api_key);
        config.agent_id_configured = agent_id_configured;
        Ok(config)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
