//! `sentinel doctor` and `sentinel check`: configuration and connectivity checks.

use std::fmt;

use sentinel_common::ApiOperation;
use sentinel_plugin::config::DEFAULT_AGENT_ID;
use sentinel_plugin::{Gateway, SentinelConfig};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckLevel {
    Ok,
    Warn,
    Fail,
}

impl fmt::Display for CheckLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckLevel::Ok => write!(f, "OK"),
            CheckLevel::Warn => write!(f, "WARN"),
            CheckLevel::Fail => write!(f, "FAIL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    pub label: &'static str,
    pub level: CheckLevel,
    pub detail: String,
}

impl Check {
    fn new(label: &'static str, level: CheckLevel, detail: impl Into<String>) -> Self {
        Self {
            label,
            level,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.label, self.detail)
    }
}

/// Result of `sentinel doctor`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorReport {
    pub ok: bool,
    pub has_warnings: bool,
    pub strict_warn: bool,
    pub checks: Vec<Check>,
}

/// Result of `sentinel check`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub ok: bool,
    pub checks: Vec<Check>,
    pub agent_id: String,
    pub base_url: String,
}

fn api_key_check(config: &SentinelConfig) -> Check {
    if config.has_api_key() {
        Check::new("API key", CheckLevel::Ok, "SENTINEL_API_KEY is set.")
    } else {
        Check::new("API key", CheckLevel::Fail, "SENTINEL_API_KEY is missing.")
    }
}

async fn probe(gateway: &dyn Gateway) -> Result<(), String> {
    gateway
        .query(ApiOperation::HealthGet, json!({}))
        .await
        .map(|_| ())
        .map_err(|e| e.to_string())
}

/// Full diagnostics. `gateway` is `None` when no API key is configured.
pub async fn doctor(
    config: &SentinelConfig,
    gateway: Option<&dyn Gateway>,
    strict_warn: bool,
) -> DoctorReport {
    let mut checks = vec![api_key_check(config)];

    if config.agent_id_configured {
        checks.push(Check::new(
            "Agent ID",
            CheckLevel::Ok,
            format!("Agent ID resolved as '{}'.", config.agent_id),
        ));
    } else {
        checks.push(Check::new(
            "Agent ID",
            CheckLevel::Warn,
            format!(
                "No agent ID configured. Using fallback '{}'.",
                DEFAULT_AGENT_ID
            ),
        ));
    }

    let reachability = match gateway {
        Some(gateway) => match probe(gateway).await {
            Ok(()) => Check::new(
                "API reachability",
                CheckLevel::Ok,
                format!("Connected to {} (GET /v1/health).", config.api_base_url),
            ),
            Err(detail) => Check::new(
                "API reachability",
                CheckLevel::Fail,
                format!(
                    "{} unreachable or rejected request: {}",
                    config.api_base_url, detail
                ),
            ),
        },
        None => Check::new(
            "API reachability",
            CheckLevel::Fail,
            "Skipped because SENTINEL_API_KEY is missing.",
        ),
    };
    checks.push(reachability);

    let has_fail = checks.iter().any(|c| c.level == CheckLevel::Fail);
    let has_warnings = checks.iter().any(|c| c.level == CheckLevel::Warn);

    DoctorReport {
        ok: !(has_fail || (strict_warn && has_warnings)),
        has_warnings,
        strict_warn,
        checks,
    }
}

/// Fast connectivity check: API key and health only.
pub async fn check(config: &SentinelConfig, gateway: Option<&dyn Gateway>) -> CheckReport {
    let mut checks = vec![api_key_check(config)];

    if let Some(gateway) = gateway {
        checks.push(match probe(gateway).await {
            Ok(()) => Check::new(
                "API health",
                CheckLevel::Ok,
                format!("Connected to {}.", config.api_base_url),
            ),
            Err(detail) => Check::new("API health", CheckLevel::Fail, detail),
        });
    }

    CheckReport {
        ok: checks.iter().all(|c| c.level == CheckLevel::Ok),
        checks,
        agent_id: config.agent_id.clone(),
        base_url: config.api_base_url.clone(),
    }
}
