//! `sentinel setup`: env file template.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use sentinel_plugin::config::{DEFAULT_AGENT_ID, DEFAULT_BASE_URL};
use serde::Serialize;

pub const REQUIRED_ENV: [&str; 1] = ["SENTINEL_API_KEY"];
pub const OPTIONAL_ENV: [&str; 3] = ["SENTINEL_API_BASE_URL", "SENTINEL_AGENT_ID", "AGENT_ID"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupOutcome {
    pub written: bool,
    pub detail: String,
}

fn desired_entries() -> [(&'static str, &'static str); 4] {
    [
        ("SENTINEL_API_KEY", ""),
        ("SENTINEL_API_BASE_URL", DEFAULT_BASE_URL),
        ("SENTINEL_AGENT_ID", DEFAULT_AGENT_ID),
        ("AGENT_ID", DEFAULT_AGENT_ID),
    ]
}

fn template() -> String {
    let lines = [
        "# Sentinel CLI / OpenClaw plugin configuration".to_string(),
        "SENTINEL_API_KEY=".to_string(),
        format!("SENTINEL_API_BASE_URL={}", DEFAULT_BASE_URL),
        format!("SENTINEL_AGENT_ID={}", DEFAULT_AGENT_ID),
        "# AGENT_ID is supported for legacy compatibility".to_string(),
        format!("AGENT_ID={}", DEFAULT_AGENT_ID),
    ];
    format!("{}\n", lines.join("\n"))
}

/// Keys assigned in an env file, ignoring comments and blank lines.
pub fn env_file_keys(content: &str) -> HashSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, _)| key.trim())
        .filter(|key| !key.is_empty())
        .map(String::from)
        .collect()
}

/// Create the env template, or append the Sentinel keys an existing file lacks.
pub fn write_setup_template(path: &Path, force: bool) -> io::Result<SetupOutcome> {
    let display = path.display();

    if force || !path.exists() {
        fs::write(path, template())?;
        let detail = if force {
            format!("Overwrote {} with Sentinel setup template.", display)
        } else {
            format!("Created {} with Sentinel setup template.", display)
        };
        return Ok(SetupOutcome {
            written: true,
            detail,
        });
    }

    let existing = fs::read_to_string(path)?;
    let keys = env_file_keys(&existing);
    let additions: Vec<String> = desired_entries()
        .iter()
        .filter(|(key, _)| !keys.contains(*key))
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();

    if additions.is_empty() {
        return Ok(SetupOutcome {
            written: false,
            detail: format!("{} already contains Sentinel keys.", display),
        });
    }

    let next = format!(
        "{}\n\n# Added by sentinel setup\n{}\n",
        existing.trim_end(),
        additions.join("\n")
    );
    fs::write(path, next)?;

    Ok(SetupOutcome {
        written: true,
        detail: format!(
            "Appended {} missing key(s) to {}.",
            additions.len(),
            display
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_template() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");

        let outcome = write_setup_template(&path, false).unwrap();

        assert!(outcome.written);
        assert!(outcome.detail.starts_with("Created "));
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("SENTINEL_API_KEY=\n"));
        assert!(content.contains("SENTINEL_AGENT_ID=default-agent\n"));
        assert_eq!(env_file_keys(&content).len(), 4);
    }

    #[test]
    fn test_appends_only_missing_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "OTHER=1\nSENTINEL_API_KEY=sk-live\n\n\n").unwrap();

        let outcome = write_setup_template(&path, false).unwrap();

        assert_eq!(
            outcome.detail,
            format!("Appended 3 missing key(s) to {}.", path.display())
        );
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("OTHER=1\nSENTINEL_API_KEY=sk-live\n\n# Added by sentinel setup\n"));
        assert!(content.ends_with("AGENT_ID=default-agent\n"));
        assert_eq!(content.matches("SENTINEL_API_KEY=").count(), 1);
    }

    #[test]
    fn test_complete_file_is_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        write_setup_template(&path, false).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let outcome = write_setup_template(&path, false).unwrap();

        assert!(!outcome.written);
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_force_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "SENTINEL_API_KEY=old\n").unwrap();

        let outcome = write_setup_template(&path, true).unwrap();

        assert!(outcome.detail.starts_with("Overwrote "));
        assert_eq!(fs::read_to_string(&path).unwrap(), template());
    }

    #[test]
    fn test_env_file_keys_skip_comments() {
        let keys = env_file_keys("# KEY=1\n  A = 2\nnot a pair\n=empty\nB=\n");
        let mut keys: Vec<String> = keys.into_iter().collect();
        keys.sort();
        assert_eq!(keys, vec!["A", "B"]);
    }
}
