//! `sentinel env push|pull`: secret sync, not available over the HTTP gateway yet.

use std::path::Path;

pub const SECRETS_DEFERRED_MESSAGE: &str = "Secrets sync over Sentinel Gateway HTTP is deferred in this release. \
     Use local Convex secret sync workflow instead.";

/// Always fails; reports a missing file before the deferral.
pub fn push(file: &Path) -> Result<(), String> {
    if !file.exists() {
        return Err(format!("No file found at {}.", file.display()));
    }
    Err(SECRETS_DEFERRED_MESSAGE.to_string())
}

/// Always fails with the deferral message.
pub fn pull(_file: &Path, _force: bool) -> Result<(), String> {
    Err(SECRETS_DEFERRED_MESSAGE.to_string())
}

pub fn deprecation_warning(alias: &str, canonical: &str) -> String {
    format!(
        "[DEPRECATED] '{}' will be removed in v1.2.0. Use '{}'.",
        alias, canonical
    )
}
