use std::env;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

/// Trimmed stdout of a successful command, if any.
fn command_stdout(program: &str, args: &[&str]) -> Option<String> {
    let out = Command::new(program).args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn stamp(key: &str, value: &str) {
    println!("cargo:rustc-env=AUTO_UV_BUILD_{key}={value}");
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // UTC ISO-8601; unix:<secs> when `date` is unavailable (Windows hosts).
    let date = command_stdout("date", &["-u", "+%Y-%m-%dT%H:%M:%SZ"]).unwrap_or_else(|| {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        format!("unix:{secs}")
    });
    stamp("DATE", &date);

    stamp(
        "TARGET",
        &env::var("TARGET").unwrap_or_else(|_| "unknown".to_string()),
    );
    stamp(
        "PROFILE",
        &env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string()),
    );

    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    stamp(
        "RUSTC",
        &command_stdout(&rustc, &["--version"]).unwrap_or_else(|| "unknown".to_string()),
    );
}
