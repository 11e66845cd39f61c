#![allow(clippy::module_name_repetitions)]
//! Small utilities: shell quoting for previews, path helpers, command execution.

pub mod exec;
pub mod fs;

use std::ffi::OsString;

/// Join an argument vector into a single shell-quoted line for display.
pub fn shell_join(args: &[OsString]) -> String {
    args.iter()
        .map(|a| shell_escape(&a.to_string_lossy()))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn shell_escape(s: &str) -> String {
    if s.is_empty() {
        "''".to_string()
    } else if s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_=./:@".contains(c))
    {
        s.to_string()
    } else {
        let escaped = s.replace('\'', "'\"'\"'");
        format!("'{}'", escaped)
    }
}
