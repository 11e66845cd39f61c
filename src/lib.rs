//! auto-uv: run Python scripts through `uv run` when they belong to a uv project.
//!
//! Architecture
//! - The shim binary (src/bin/auto-uv-shim.rs) is linked as `python`/`python3` ahead of the
//!   real interpreter on PATH. It snapshots the invocation and runs the decision pipeline.
//! - pipeline::decide chains guard -> locator -> launcher; only a full match replaces the
//!   process with `<uv> run <script> <args...>` and the loop marker set.
//! - Any other outcome returns silently and the real interpreter runs unchanged.
//!
//! Environment invariants
//! - AUTO_UV_DISABLE: truthy (1/true/yes, any case) turns interception off.
//! - UV_RUN_ACTIVE: set to "1" on the replacement; any non-empty value stops interception.
//! - AUTO_UV_MAX_DEPTH / AUTO_UV_LAUNCHER: tune ascent depth and launcher base name.
//! - AUTO_UV_PYTHON: real interpreter used by the shim for pass-through.
//! - AUTO_UV_LOG / AUTO_UV_COLOR / NO_COLOR: diagnostics only; never change decisions.

pub mod color;
pub mod config;
pub mod context;
pub mod errors;
pub mod guard;
pub mod install;
pub mod launcher;
pub mod locator;
pub mod pipeline;
pub mod replace;
pub mod shim;
mod telemetry;
pub mod util;

pub use color::{
    color_enabled_stderr, color_enabled_stdout, log_error_stderr, log_info_stderr,
    log_warn_stderr, paint, set_color_mode, ColorMode,
};
pub use config::{EnvKey, Policy};
pub use context::{ContextBuilder, InvocationContext};
pub use errors::{
    display_for_shim_error, exit_code_for_exec_error, exit_code_for_shim_error, ShimError,
    EXIT_NOT_EXECUTABLE, EXIT_NOT_FOUND, EXIT_REPLACE_FAILED,
};
pub use guard::{protected_kind, rejection, should_intercept, ProtectedKind, RejectReason};
pub use install::{default_shim_names, install_shims, shim_binary_path};
pub use launcher::{resolve_in, resolve_launcher, LauncherCandidate, Platform};
pub use locator::{find_project_root, locate_for, ProjectMarker, SearchDecision};
pub use pipeline::{auto_use_uv, auto_use_uv_with, decide, Outcome};
pub use replace::{exec_or_exit, exec_plan, replace_process, ReplacementPlan};
pub use telemetry::telemetry_init;
