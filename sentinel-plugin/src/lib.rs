//! Sentinel plugin for OpenClaw agents.
//!
//! Gives an agent durable remote memory, identity-file backups and a
//! heartbeat that summarises the state of its Sentinel connection.

pub mod client;
pub mod config;
pub mod error;
pub mod sentinel;
pub mod skills;
pub mod test_util;
pub mod workspace;

pub use client::{Gateway, SentinelClient};
pub use config::{ConfigOverrides, SentinelConfig};
pub use error::{Error, Result};
pub use sentinel::Sentinel;
pub use skills::{HeartbeatSkill, Skill, SkillRegistry, WatermarkStore};
