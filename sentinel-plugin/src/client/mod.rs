//! Sentinel gateway access.
//!
//! This module defines the `Gateway` trait that the skills talk to, and the
//! HTTP implementation used against the real service.

mod http;

pub use http::{SentinelClient, REQUEST_TIMEOUT_SECS};

use async_trait::async_trait;
use sentinel_common::ApiOperation;
use serde_json::Value;

use crate::error::Result;

/// A connection to the Sentinel gateway, bound to one agent.
///
/// Results are loosely typed JSON; callers parse the shapes they need.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Identifier of the agent this connection acts for.
    fn agent_id(&self) -> &str;

    /// Read-only operation.
    async fn query(&self, operation: ApiOperation, args: Value) -> Result<Value>;

    /// Operation that changes remote state.
    async fn mutate(&self, operation: ApiOperation, args: Value) -> Result<Value>;
}
