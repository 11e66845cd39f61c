//! Opt-in tracing output.
//!
//! Nothing is printed unless `AUTO_UV_LOG` is set: an interception that does
//! not happen must leave no trace. `AUTO_UV_LOG=1` enables debug output for this
//! crate; any other value is used as an `EnvFilter` directive.

use std::env;

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::EnvKey;

static INIT: OnceCell<()> = OnceCell::new();

fn filter_directive() -> Option<String> {
    let raw = env::var(EnvKey::Log.name()).ok()?;
    let raw = raw.trim();
    if raw.is_empty() || raw == "0" {
        return None;
    }
    if matches!(raw.to_ascii_lowercase().as_str(), "1" | "true" | "yes") {
        return Some("auto_uv=debug".to_string());
    }
    Some(raw.to_string())
}

/// Install the stderr fmt layer when requested. Returns true when installed.
pub fn telemetry_init() -> bool {
    if INIT.get().is_some() {
        return false;
    }
    let Some(directive) = filter_directive() else {
        return false;
    };

    let env_filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("auto-uv: tracing init skipped (global subscriber already set)");
        return false;
    }

    let _ = INIT.set(());
    true
}
