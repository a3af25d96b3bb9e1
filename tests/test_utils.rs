//! Test utilities and fixtures for keyrelay
//!
//! The tests stand in for the real message client with small shell scripts.
//! Every script appends its arguments to `calls.log` next to itself, so a
//! test can count spawns and inspect the exact argument vectors.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Install a fake message client in `dir` running `body` after logging its args
#[cfg(unix)]
pub fn fake_client(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let exe = dir.join("MessageClient");
    let log = call_log_path(dir);
    let script = format!(
        "#!/bin/sh\necho \"$*\" >> \"{}\"\n{}\n",
        log.display(),
        body
    );

    fs::write(&exe, script).expect("Failed to write fake client");
    fs::set_permissions(&exe, fs::Permissions::from_mode(0o755))
        .expect("Failed to make fake client executable");

    exe
}

/// Path of the log the fake client appends to
pub fn call_log_path(dir: &Path) -> PathBuf {
    dir.join("calls.log")
}

/// Argument lines recorded by the fake client, one per spawn
pub fn recorded_calls(dir: &Path) -> Vec<String> {
    fs::read_to_string(call_log_path(dir))
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Script body answering each verb with a canned line
pub fn respond_by_verb(answers: &[(&str, &str)]) -> String {
    let mut body = String::from("case \"$3\" in\n");
    for (verb, answer) in answers {
        body.push_str(&format!("  {}) echo '{}' ;;\n", verb, answer));
    }
    body.push_str("  *) echo 'unexpected verb' ;;\nesac");
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_recorded_calls_empty_without_log() {
        let dir = temp_dir();
        assert!(recorded_calls(dir.path()).is_empty());
    }

    #[test]
    fn test_respond_by_verb_shape() {
        let body = respond_by_verb(&[("status", "status <<OK")]);
        assert!(body.starts_with("case \"$3\" in"));
        assert!(body.contains("status) echo 'status <<OK' ;;"));
        assert!(body.ends_with("esac"));
    }
}
