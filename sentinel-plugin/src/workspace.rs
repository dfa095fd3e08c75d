//! OpenClaw workspace resolution.

use std::io;
use std::path::PathBuf;

/// Resolve the workspace directory holding the agent's identity files.
///
/// The first non-blank candidate wins, otherwise the current directory.
/// Relative paths are made absolute against the current directory.
/// `OPENCLAW_WORKSPACE_DIR` reaches this function through
/// [`SentinelConfig::workspace_dir`](crate::config::SentinelConfig), so
/// callers pass the configured value as their last candidate.
pub fn resolve_workspace_dir(candidates: &[Option<&str>]) -> io::Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    let chosen = candidates
        .iter()
        .copied()
        .flatten()
        .map(str::trim)
        .find(|dir| !dir.is_empty());

    Ok(match chosen {
        Some(dir) => cwd.join(dir),
        None => cwd,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_wins() {
        let dir = resolve_workspace_dir(&[Some("/explicit"), Some("/configured")]).unwrap();
        assert_eq!(dir, PathBuf::from("/explicit"));
    }

    #[test]
    fn test_blank_candidates_fall_through() {
        let dir = resolve_workspace_dir(&[Some("  "), None, Some(" /configured ")]).unwrap();
        assert_eq!(dir, PathBuf::from("/configured"));
    }

    #[test]
    fn test_defaults_to_current_dir() {
        let dir = resolve_workspace_dir(&[None, Some("")]).unwrap();
        assert_eq!(dir, std::env::current_dir().unwrap());
    }

    #[test]
    fn test_relative_paths_are_absolute() {
        let dir = resolve_workspace_dir(&[Some("agent")]).unwrap();
        assert!(dir.is_absolute());
        assert!(dir.ends_with("agent"));
    }
}
