//! Records returned by (and uploaded to) the Sentinel gateway.
//!
//! The gateway is loosely typed: fields may be missing, carry unexpected
//! types, or use the storage layer's native `_creationTime` name. Parsing here
//! is lenient so that one odd record never invalidates a whole response:
//! non-numeric timestamps read as absent, non-array lists read as empty, and
//! malformed list entries read as default records.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Timestamps are milliseconds since the Unix epoch and may be fractional.
pub type TimestampMs = f64;

/// Lifecycle status of a backup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupStatus {
    Completed,
    /// In progress, failed, or anything else the gateway reports.
    #[default]
    Other,
}

/// A single backup as listed by `backups:list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackupRecord {
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: BackupStatus,
    #[serde(
        rename = "createdAt",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<TimestampMs>,
    #[serde(
        rename = "creationTime",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub creation_time: Option<TimestampMs>,
    #[serde(
        rename = "_creationTime",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub system_creation_time: Option<TimestampMs>,
}

impl BackupRecord {
    pub fn is_completed(&self) -> bool {
        self.status == BackupStatus::Completed
    }

    /// `createdAt`, falling back to the creation time, then to the epoch.
    pub fn timestamp(&self) -> TimestampMs {
        self.created_at
            .or(self.creation_time)
            .or(self.system_creation_time)
            .unwrap_or(0.0)
    }
}

/// Response body of `backups:list`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackupList {
    #[serde(default, deserialize_with = "lenient_list")]
    pub backups: Vec<BackupRecord>,
}

impl BackupList {
    /// Timestamp of the most recent completed backup, if any completed.
    pub fn latest_completed(&self) -> Option<TimestampMs> {
        self.backups
            .iter()
            .filter(|b| b.is_completed())
            .map(BackupRecord::timestamp)
            .fold(None, |latest, ts| match latest {
                Some(current) if current >= ts => Some(current),
                _ => Some(ts),
            })
    }
}

/// A memory as returned by `memories:search`. Only the creation time matters
/// to this crate; callers needing the full payload keep the raw JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoryRecord {
    #[serde(rename = "creationTime", default, deserialize_with = "lenient_timestamp")]
    pub creation_time: Option<TimestampMs>,
    #[serde(rename = "_creationTime", default, deserialize_with = "lenient_timestamp")]
    pub system_creation_time: Option<TimestampMs>,
}

impl MemoryRecord {
    pub fn timestamp(&self) -> Option<TimestampMs> {
        self.creation_time.or(self.system_creation_time)
    }
}

/// Response body of `memories:search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemorySearchResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    pub results: Vec<MemoryRecord>,
}

impl MemorySearchResponse {
    /// Creation time of the first (most recent) result.
    pub fn latest_timestamp(&self) -> Option<TimestampMs> {
        self.results.first().and_then(MemoryRecord::timestamp)
    }
}

/// A workspace file uploaded by `backups:create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupFile {
    pub name: String,
    pub content: String,
    /// Human-readable UTF-8 byte size, e.g. `"42 B"`.
    pub size: String,
}

impl BackupFile {
    pub fn new(name: impl Into<String>, content: String) -> Self {
        let size = format!("{} B", content.len());
        Self {
            name: name.into(),
            content,
            size,
        }
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<TimestampMs>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_f64))
}

fn lenient_status<'de, D>(deserializer: D) -> Result<BackupStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value.as_ref().and_then(Value::as_str) {
        Some("completed") => BackupStatus::Completed,
        _ => BackupStatus::Other,
    })
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}
