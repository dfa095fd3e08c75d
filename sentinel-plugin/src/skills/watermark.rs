//! Per-agent memory watermarks.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use sentinel_common::records::TimestampMs;

/// Last memory timestamp already reported as new, keyed by agent id.
///
/// A watermark always holds the latest timestamp observed, so it can move
/// backwards when the newest memory is deleted. Entries are never removed;
/// the store lives as long as whoever owns it (normally the `Sentinel` facade).
#[derive(Debug, Default)]
pub struct WatermarkStore {
    watermarks: Mutex<HashMap<String, TimestampMs>>,
}

impl WatermarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current watermark for `agent_id`, or `None` before its first observation.
    pub fn get(&self, agent_id: &str) -> Option<TimestampMs> {
        self.lock().get(agent_id).copied()
    }

    /// Seed or overwrite a watermark.
    pub fn set(&self, agent_id: &str, timestamp: TimestampMs) {
        self.lock().insert(agent_id.to_string(), timestamp);
    }

    /// Record that `timestamp` was seen for `agent_id`.
    ///
    /// Returns true when it is strictly newer than the stored watermark
    /// (0 when none). The watermark is then set to `timestamp` whatever the
    /// comparison said. Compare and store happen under one lock, so
    /// concurrent heartbeats for the same agent report a given memory at
    /// most once.
    pub fn observe(&self, agent_id: &str, timestamp: TimestampMs) -> bool {
        let mut watermarks = self.lock();
        let watermark = watermarks.entry(agent_id.to_string()).or_insert(0.0);
        let is_new = timestamp > *watermark;
        *watermark = timestamp;
        is_new
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, TimestampMs>> {
        self.watermarks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
