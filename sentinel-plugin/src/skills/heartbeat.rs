//! Heartbeat skill: one-line health assessment of the Sentinel connection.
//!
//! A heartbeat makes three sequential gateway calls:
//!
//! 1. `health:get`: failure ends the heartbeat with a gateway alert.
//! 2. `backups:list`: a missing or stale (> 24h) completed backup asks the
//!    agent to back up. If the listing fails, a backup is requested anyway.
//! 3. `memories:search` (newest memory only): a creation time newer than the
//!    agent's watermark reports new memories. If the search fails, nothing
//!    new is reported.
//!
//! The result is always a single message; this skill never fails.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sentinel_common::{ApiOperation, BackupList, MemorySearchResponse, TimestampMs};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::{Skill, WatermarkStore};
use crate::client::Gateway;
use crate::error::{Error, Result};

pub const ONE_DAY_MS: TimestampMs = 24.0 * 60.0 * 60.0 * 1000.0;

pub const BACKUP_REQUIRED: &str = "Backup Required (Last backup > 24h ago).";
pub const NEW_MEMORIES: &str = "New Memories Available (User updated dashboard).";
pub const NOMINAL: &str = "System Nominal. Connection active.";
pub const GATEWAY_UNAVAILABLE: &str = "ALERT: Gateway unavailable.";

/// Result of one heartbeat check.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The gateway answered and the condition was evaluated.
    Observed(bool),
    /// The call failed; `value` is the conservative default used instead.
    Defaulted { value: bool, reason: String },
}

impl StepOutcome {
    pub fn value(&self) -> bool {
        match self {
            StepOutcome::Observed(value) => *value,
            StepOutcome::Defaulted { value, .. } => *value,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, StepOutcome::Defaulted { .. })
    }
}

/// Signals gathered by a heartbeat whose gateway check passed.
#[derive(Debug, Clone, PartialEq)]
pub struct HeartbeatReport {
    pub gateway_reachable: bool,
    pub needs_backup: StepOutcome,
    pub new_memories: StepOutcome,
}

impl HeartbeatReport {
    /// Instructions for the agent, backup first.
    pub fn instructions(&self) -> Vec<&'static str> {
        let mut instructions = Vec::new();
        if self.needs_backup.value() {
            instructions.push(BACKUP_REQUIRED);
        }
        if self.new_memories.value() {
            instructions.push(NEW_MEMORIES);
        }
        instructions
    }

    pub fn message(&self) -> String {
        let instructions = self.instructions();
        if !instructions.is_empty() {
            return format!("ALERT: {}", instructions.join(" "));
        }

        if self.gateway_reachable {
            NOMINAL.to_string()
        } else {
            // Not produced by `assess`, which stops on gateway failure.
            GATEWAY_UNAVAILABLE.to_string()
        }
    }
}

/// Outcome of a full heartbeat.
#[derive(Debug, Clone, PartialEq)]
pub enum Assessment {
    /// `health:get` failed; no other check ran.
    GatewayDown(String),
    Report(HeartbeatReport),
}

impl Assessment {
    pub fn message(&self) -> String {
        match self {
            Assessment::GatewayDown(detail) => {
                format!("ALERT: Gateway health check failed ({}).", detail)
            }
            Assessment::Report(report) => report.message(),
        }
    }
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// The `sentinel_heartbeat` skill.
pub struct HeartbeatSkill {
    gateway: Arc<dyn Gateway>,
    watermarks: Arc<WatermarkStore>,
    clock: Clock,
}

impl HeartbeatSkill {
    pub fn new(gateway: Arc<dyn Gateway>, watermarks: Arc<WatermarkStore>) -> Self {
        Self {
            gateway,
            watermarks,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the wall clock used for backup staleness.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn watermarks(&self) -> &Arc<WatermarkStore> {
        &self.watermarks
    }

    /// Run a heartbeat and return the message for the agent.
    pub async fn run(&self) -> String {
        self.assess().await.message()
    }

    /// Run a heartbeat and return the individual signals.
    pub async fn assess(&self) -> Assessment {
        let agent_id = self.gateway.agent_id();

        if let Err(e) = self.gateway.query(ApiOperation::HealthGet, json!({})).await {
            tracing::warn!(agent_id, error = %e, "Sentinel gateway health check failed");
            return Assessment::GatewayDown(e.to_string());
        }

        let needs_backup = self.check_backups().await;
        let new_memories = self.check_memories(agent_id).await;

        tracing::debug!(
            agent_id,
            needs_backup = ?needs_backup,
            new_memories = ?new_memories,
            "Heartbeat assessed"
        );

        Assessment::Report(HeartbeatReport {
            gateway_reachable: true,
            needs_backup,
            new_memories,
        })
    }

    async fn check_backups(&self) -> StepOutcome {
        let backups: BackupList = match self.fetch(ApiOperation::BackupsList, json!({})).await {
            Ok(backups) => backups,
            Err(e) => {
                tracing::warn!(error = %e, "Backup listing failed, assuming a backup is needed");
                return StepOutcome::Defaulted {
                    value: true,
                    reason: e.to_string(),
                };
            }
        };

        match backups.latest_completed() {
            None => StepOutcome::Observed(true),
            Some(latest) => {
                let now = (self.clock)().timestamp_millis() as TimestampMs;
                StepOutcome::Observed(now - latest > ONE_DAY_MS)
            }
        }
    }

    async fn check_memories(&self, agent_id: &str) -> StepOutcome {
        let args = json!({ "query": "", "limit": 1, "includeArchived": false });
        let response: MemorySearchResponse =
            match self.fetch(ApiOperation::MemoriesSearch, args).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(error = %e, "Memory search failed, reporting no new memories");
                    return StepOutcome::Defaulted {
                        value: false,
                        reason: e.to_string(),
                    };
                }
            };

        match response.latest_timestamp() {
            Some(latest) => StepOutcome::Observed(self.watermarks.observe(agent_id, latest)),
            None => StepOutcome::Observed(false),
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, operation: ApiOperation, args: Value) -> Result<T> {
        let value = self.gateway.query(operation, args).await?;
        serde_json::from_value(value).map_err(|e| Error::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl Skill for HeartbeatSkill {
    fn name(&self) -> &'static str {
        "sentinel_heartbeat"
    }

    fn description(&self) -> &'static str {
        "Checks the status of the Sentinel cloud connection. Run this periodically."
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value) -> Result<Value> {
        Ok(Value::String(self.run().await))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::ScriptedGateway;
    use chrono::Duration;
    use rstest::rstest;

    const AGENT: &str = "agent-1";

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn ms_ago(d: Duration) -> f64 {
        (fixed_now() - d).timestamp_millis() as f64
    }

    fn skill(gateway: &Arc<ScriptedGateway>) -> HeartbeatSkill {
        HeartbeatSkill::new(gateway.clone(), Arc::new(WatermarkStore::new())).with_clock(fixed_now)
    }

    fn healthy_gateway() -> Arc<ScriptedGateway> {
        let gateway = Arc::new(ScriptedGateway::new(AGENT));
        gateway.respond(ApiOperation::HealthGet, Ok(json!({"status": "ok"})));
        gateway
    }

    fn report(assessment: Assessment) -> HeartbeatReport {
        match assessment {
            Assessment::Report(report) => report,
            other => panic!("expected report, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_gateway_down_short_circuits() {
        let gateway = Arc::new(ScriptedGateway::new(AGENT));
        gateway.respond(ApiOperation::HealthGet, Err("connection refused".to_string()));
        gateway.respond(ApiOperation::BackupsList, Ok(json!({"backups": []})));
        gateway.respond(
            ApiOperation::MemoriesSearch,
            Ok(json!({"results": [{"creationTime": 5}]})),
        );

        let message = skill(&gateway).run().await;

        assert_eq!(message, "ALERT: Gateway health check failed (connection refused).");
        assert_eq!(gateway.operations(), vec![ApiOperation::HealthGet]);
    }

    #[tokio::test]
    async fn test_calls_are_sequential_and_shaped() {
        let gateway = healthy_gateway();
        gateway.respond(ApiOperation::BackupsList, Ok(json!({"backups": []})));
        gateway.respond(ApiOperation::MemoriesSearch, Ok(json!({"results": []})));

        skill(&gateway).run().await;

        let calls = gateway.calls();
        let ops: Vec<ApiOperation> = calls.iter().map(|(op, _)| *op).collect();
        assert_eq!(
            ops,
            vec![
                ApiOperation::HealthGet,
                ApiOperation::BackupsList,
                ApiOperation::MemoriesSearch
            ]
        );
        assert_eq!(
            calls[2].1,
            json!({"query": "", "limit": 1, "includeArchived": false})
        );
    }

    #[tokio::test]
    async fn test_no_backups_requires_backup() {
        let gateway = healthy_gateway();
        gateway.respond(ApiOperation::BackupsList, Ok(json!({"backups": []})));
        gateway.respond(ApiOperation::MemoriesSearch, Ok(json!({"results": []})));

        let report = report(skill(&gateway).assess().await);

        assert_eq!(report.needs_backup, StepOutcome::Observed(true));
        assert_eq!(report.message(), format!("ALERT: {}", BACKUP_REQUIRED));
    }

    #[rstest]
    #[case::stale(Duration::hours(25), true)]
    #[case::fresh(Duration::hours(1), false)]
    #[case::exactly_one_day(Duration::hours(24), false)]
    #[tokio::test]
    async fn test_backup_staleness(#[case] age: Duration, #[case] expected: bool) {
        let gateway = healthy_gateway();
        gateway.respond(
            ApiOperation::BackupsList,
            Ok(json!({"backups": [{"status": "completed", "createdAt": ms_ago(age)}]})),
        );
        gateway.respond(ApiOperation::MemoriesSearch, Ok(json!({"results": []})));

        let report = report(skill(&gateway).assess().await);

        assert_eq!(report.needs_backup, StepOutcome::Observed(expected));
        assert_eq!(report.message().contains(BACKUP_REQUIRED), expected);
    }

    #[tokio::test]
    async fn test_only_completed_backups_count() {
        let gateway = healthy_gateway();
        gateway.respond(
            ApiOperation::BackupsList,
            Ok(json!({"backups": [
                {"status": "completed", "creationTime": ms_ago(Duration::hours(30))},
                {"status": "failed", "createdAt": ms_ago(Duration::minutes(5))},
                {"status": "in_progress", "createdAt": ms_ago(Duration::minutes(1))}
            ]})),
        );
        gateway.respond(ApiOperation::MemoriesSearch, Ok(json!({"results": []})));

        let report = report(skill(&gateway).assess().await);
        assert_eq!(report.needs_backup, StepOutcome::Observed(true));
    }

    #[tokio::test]
    async fn test_backup_list_failure_defaults_to_required() {
        let gateway = healthy_gateway();
        gateway.respond(ApiOperation::BackupsList, Err("HTTP 500 from Sentinel API".to_string()));
        gateway.respond(ApiOperation::MemoriesSearch, Ok(json!({"results": []})));

        let report = report(skill(&gateway).assess().await);

        assert!(report.needs_backup.is_defaulted());
        assert!(report.needs_backup.value());
        assert_eq!(report.message(), format!("ALERT: {}", BACKUP_REQUIRED));
    }

    #[tokio::test]
    async fn test_malformed_backup_response_defaults_to_required() {
        let gateway = healthy_gateway();
        gateway.respond(ApiOperation::BackupsList, Ok(Value::Null));
        gateway.respond(ApiOperation::MemoriesSearch, Ok(json!({"results": []})));

        let report = report(skill(&gateway).assess().await);
        assert!(report.needs_backup.is_defaulted());
        assert!(report.needs_backup.value());
    }

    #[tokio::test]
    async fn test_memory_search_failure_defaults_to_nothing_new() {
        let gateway = healthy_gateway();
        gateway.respond(
            ApiOperation::BackupsList,
            Ok(json!({"backups": [{"status": "completed", "createdAt": ms_ago(Duration::hours(1))}]})),
        );
        gateway.respond(ApiOperation::MemoriesSearch, Err("timeout".to_string()));

        let heartbeat = skill(&gateway);
        let report = report(heartbeat.assess().await);

        assert_eq!(
            report.new_memories,
            StepOutcome::Defaulted {
                value: false,
                reason: "timeout".to_string()
            }
        );
        assert_eq!(report.message(), NOMINAL);
        assert!(heartbeat.watermarks().is_empty());
    }

    #[tokio::test]
    async fn test_watermark_reports_each_memory_once() {
        let gateway = healthy_gateway();
        gateway.respond(
            ApiOperation::BackupsList,
            Ok(json!({"backups": [{"status": "completed", "createdAt": ms_ago(Duration::hours(1))}]})),
        );
        gateway.script(
            ApiOperation::MemoriesSearch,
            vec![
                Ok(json!({"results": [{"_creationTime": 1000.0}]})),
                Ok(json!({"results": [{"_creationTime": 1000.0}]})),
                Ok(json!({"results": [{"_creationTime": 2000.0}]})),
                Ok(json!({"results": [{"_creationTime": 2000.0}]})),
            ],
        );
        let heartbeat = skill(&gateway);

        let first = report(heartbeat.assess().await);
        let second = report(heartbeat.assess().await);
        let third = report(heartbeat.assess().await);
        let fourth = report(heartbeat.assess().await);

        assert_eq!(first.new_memories, StepOutcome::Observed(true));
        assert_eq!(first.message(), format!("ALERT: {}", NEW_MEMORIES));
        assert_eq!(second.new_memories, StepOutcome::Observed(false));
        assert_eq!(second.message(), NOMINAL);
        assert_eq!(third.new_memories, StepOutcome::Observed(true));
        assert_eq!(fourth.new_memories, StepOutcome::Observed(false));
        assert_eq!(heartbeat.watermarks().get(AGENT), Some(2000.0));
    }

    #[tokio::test]
    async fn test_injected_watermark_is_respected() {
        let gateway = healthy_gateway();
        gateway.respond(
            ApiOperation::BackupsList,
            Ok(json!({"backups": [{"status": "completed", "createdAt": ms_ago(Duration::hours(2))}]})),
        );
        gateway.respond(
            ApiOperation::MemoriesSearch,
            Ok(json!({"results": [{"creationTime": 500}]})),
        );
        let watermarks = Arc::new(WatermarkStore::new());
        watermarks.set(AGENT, 900.0);
        let heartbeat =
            HeartbeatSkill::new(gateway.clone(), watermarks.clone()).with_clock(fixed_now);

        assert_eq!(heartbeat.run().await, NOMINAL);
        assert_eq!(watermarks.get(AGENT), Some(500.0));
    }

    #[tokio::test]
    async fn test_deleted_newest_memory_rewinds_watermark() {
        let gateway = healthy_gateway();
        gateway.respond(
            ApiOperation::BackupsList,
            Ok(json!({"backups": [{"status": "completed", "createdAt": ms_ago(Duration::hours(1))}]})),
        );
        gateway.script(
            ApiOperation::MemoriesSearch,
            vec![
                Ok(json!({"results": [{"creationTime": 2000}]})),
                Ok(json!({"results": [{"creationTime": 1000}]})),
                Ok(json!({"results": [{"creationTime": 1500}]})),
            ],
        );
        let heartbeat = skill(&gateway);

        assert_eq!(heartbeat.run().await, format!("ALERT: {}", NEW_MEMORIES));
        assert_eq!(heartbeat.run().await, NOMINAL);
        assert_eq!(heartbeat.watermarks().get(AGENT), Some(1000.0));
        assert_eq!(heartbeat.run().await, format!("ALERT: {}", NEW_MEMORIES));
        assert_eq!(heartbeat.watermarks().get(AGENT), Some(1500.0));
    }

    #[tokio::test]
    async fn test_memory_without_timestamp_leaves_state_alone() {
        let gateway = healthy_gateway();
        gateway.respond(
            ApiOperation::BackupsList,
            Ok(json!({"backups": [{"status": "completed", "createdAt": ms_ago(Duration::hours(2))}]})),
        );
        gateway.respond(
            ApiOperation::MemoriesSearch,
            Ok(json!({"results": [{"content": "no timestamp"}]})),
        );
        let heartbeat = skill(&gateway);

        let report = report(heartbeat.assess().await);
        assert_eq!(report.new_memories, StepOutcome::Observed(false));
        assert!(heartbeat.watermarks().is_empty());
    }

    #[tokio::test]
    async fn test_backup_instruction_precedes_memory_instruction() {
        let gateway = healthy_gateway();
        gateway.respond(ApiOperation::BackupsList, Ok(json!({"backups": []})));
        gateway.respond(
            ApiOperation::MemoriesSearch,
            Ok(json!({"results": [{"creationTime": 1}]})),
        );

        let message = skill(&gateway).run().await;
        assert_eq!(
            message,
            "ALERT: Backup Required (Last backup > 24h ago). New Memories Available (User updated dashboard)."
        );
    }

    #[test]
    fn test_unreachable_report_without_instructions() {
        let report = HeartbeatReport {
            gateway_reachable: false,
            needs_backup: StepOutcome::Observed(false),
            new_memories: StepOutcome::Observed(false),
        };
        assert_eq!(report.message(), GATEWAY_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_execute_returns_message_string() {
        let gateway = healthy_gateway();
        gateway.respond(
            ApiOperation::BackupsList,
            Ok(json!({"backups": [{"status": "completed", "createdAt": ms_ago(Duration::hours(3))}]})),
        );
        gateway.respond(ApiOperation::MemoriesSearch, Ok(json!({"results": []})));

        let result = skill(&gateway).execute(Value::Null).await.unwrap();
        assert_eq!(result, Value::String(NOMINAL.to_string()));
    }
}
