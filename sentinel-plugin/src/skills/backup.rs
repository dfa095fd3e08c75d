//! Backup skill: uploads the agent's identity files.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use sentinel_common::{ApiOperation, BackupFile};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_args, Skill};
use crate::client::Gateway;
use crate::error::{Error, Result};
use crate::workspace::resolve_workspace_dir;

/// Files every backup must contain, relative to the workspace.
pub const REQUIRED_FILES: [&str; 5] = ["IDENTITY.md", "AGENTS.md", "SOUL.md", "TOOLS.md", "USER.md"];

/// Why a backup was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupTrigger {
    Manual,
    Scheduled,
}

impl fmt::Display for BackupTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupTrigger::Manual => write!(f, "manual"),
            BackupTrigger::Scheduled => write!(f, "scheduled"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackupArgs {
    trigger: BackupTrigger,
    #[serde(default)]
    workspace_dir: Option<String>,
}

/// The `backup_brain` skill.
pub struct BackupSkill {
    gateway: Arc<dyn Gateway>,
    workspace_dir: Option<String>,
}

impl BackupSkill {
    /// `workspace_dir` is used when a call does not name one.
    pub fn new(gateway: Arc<dyn Gateway>, workspace_dir: Option<String>) -> Self {
        Self {
            gateway,
            workspace_dir,
        }
    }

    /// Upload all required files, or report which are missing.
    ///
    /// Nothing is uploaded unless every required file is readable.
    pub async fn backup(&self, trigger: BackupTrigger, workspace_dir: Option<&str>) -> Result<String> {
        let workspace = resolve_workspace_dir(&[workspace_dir, self.workspace_dir.as_deref()])?;
        let (files, missing) = collect_files(&workspace).await;

        if !missing.is_empty() {
            tracing::warn!(
                workspace = %workspace.display(),
                missing = ?missing,
                "Skipping backup, required files are missing"
            );
            return Ok(format!(
                "Backup skipped. Missing required files: {}.",
                missing.join(", ")
            ));
        }

        let count = files.len();
        self.gateway
            .mutate(ApiOperation::BackupsCreate, json!({ "files": files }))
            .await?;

        tracing::info!(
            workspace = %workspace.display(),
            files = count,
            trigger = %trigger,
            "Identity backup uploaded"
        );
        Ok(format!(
            "Backup successful. Uploaded {} files ({}).",
            count, trigger
        ))
    }
}

async fn collect_files(workspace: &Path) -> (Vec<BackupFile>, Vec<&'static str>) {
    let mut files = Vec::new();
    let mut missing = Vec::new();

    for name in REQUIRED_FILES {
        match tokio::fs::read_to_string(workspace.join(name)).await {
            Ok(content) => files.push(BackupFile::new(name, content)),
            Err(e) => {
                tracing::debug!(file = name, error = %e, "Cannot read identity file");
                missing.push(name);
            }
        }
    }

    (files, missing)
}

#[async_trait]
impl Skill for BackupSkill {
    fn name(&self) -> &'static str {
        "backup_brain"
    }

    fn description(&self) -> &'static str {
        "Uploads critical agent identity files (IDENTITY.md, etc.) to the cloud."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "trigger": {
                    "type": "string",
                    "enum": ["manual", "scheduled"],
                    "description": "Reason for backup"
                },
                "workspaceDir": {
                    "type": "string",
                    "minLength": 1,
                    "description": "Optional explicit OpenClaw workspace directory containing required identity files."
                }
            },
            "required": ["trigger"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let args: BackupArgs = parse_args(args)?;
        if args.workspace_dir.as_deref() == Some("") {
            return Err(Error::InvalidArguments(
                "workspaceDir must not be empty".to_string(),
            ));
        }

        let message = self.backup(args.trigger, args.workspace_dir.as_deref()).await?;
        Ok(Value::String(message))
    }
}
