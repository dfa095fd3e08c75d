//! Agent-facing skills.
//!
//! Each skill is a named tool the OpenClaw runtime can invoke with JSON
//! arguments. Skills are registered in a `SkillRegistry` and looked up by
//! name.

mod backup;
mod heartbeat;
mod memory;
mod registry;
mod search;
mod watermark;

pub use backup::{BackupSkill, BackupTrigger, REQUIRED_FILES};
pub use heartbeat::{
    Assessment, HeartbeatReport, HeartbeatSkill, StepOutcome, BACKUP_REQUIRED, GATEWAY_UNAVAILABLE,
    NEW_MEMORIES, NOMINAL, ONE_DAY_MS,
};
pub use memory::{MemorySource, SaveMemorySkill};
pub use registry::SkillRegistry;
pub use search::{SearchMemorySkill, SearchResults};
pub use watermark::WatermarkStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

/// A tool exposed to the agent runtime.
#[async_trait]
pub trait Skill: Send + Sync {
    /// Tool name the runtime invokes (e.g. "backup_brain").
    fn name(&self) -> &'static str;

    /// Natural-language description shown to the model.
    fn description(&self) -> &'static str;

    /// JSON schema of the accepted arguments.
    fn parameters(&self) -> Value;

    /// Run the skill. Missing arguments arrive as `Value::Null`.
    async fn execute(&self, args: Value) -> Result<Value>;
}

/// Deserialize skill arguments, treating `null` as an empty object.
pub(crate) fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T> {
    let args = match args {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(args).map_err(|e| Error::InvalidArguments(e.to_string()))
}
