//! Sentinel Common Types
//!
//! Shared types used by both the OpenClaw plugin and the `sentinel` CLI.

pub mod operation;
pub mod records;

pub use operation::{ApiOperation, HttpMethod, UnsupportedOperation};
pub use records::{
    BackupFile, BackupList, BackupRecord, BackupStatus, MemoryRecord, MemorySearchResponse,
    TimestampMs,
};
