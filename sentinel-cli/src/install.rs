//! `sentinel install-heartbeat`: hooks the heartbeat into an agent's HEARTBEAT.md.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

pub const HEARTBEAT_FILE: &str = "HEARTBEAT.md";

const SENTINEL_BLOCK: &str = "

Every 10 cycles, you MUST perform a \"System Health Check\" by executing the `sentinel_heartbeat` tool.
If the tool reports \"Backup Required\", immediately execute `backup_brain`.
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    AlreadyInstalled,
}

/// Append the Sentinel block to `HEARTBEAT.md` unless it is already there.
///
/// Fails with `NotFound` when the workspace has no `HEARTBEAT.md`.
pub fn install_heartbeat(workspace: &Path) -> io::Result<InstallOutcome> {
    let path = workspace.join(HEARTBEAT_FILE);
    let content = fs::read_to_string(&path)?;

    if content.contains("sentinel_heartbeat") {
        return Ok(InstallOutcome::AlreadyInstalled);
    }

    let mut file = OpenOptions::new().append(true).open(&path)?;
    file.write_all(SENTINEL_BLOCK.as_bytes())?;
    tracing::debug!(path = %path.display(), "Sentinel heartbeat block appended");
    Ok(InstallOutcome::Installed)
}
