#![allow(clippy::module_name_repetitions)]
//! Environment guard: cheap rejection before any filesystem probing.
//!
//! Pure over the [`InvocationContext`] snapshot. Every rule errs towards
//! "do not intercept".

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::instrument;

use crate::config::{
    EnvKey, Policy, ENV_BIN_DIR_NAMES, PACKAGE_DIR_NAMES, SYSTEM_BIN_DIRS,
    WINDOWS_SYSTEM_DIR_VARS,
};
use crate::context::InvocationContext;
use crate::util::fs::{has_parent_component, normalize_lexical};

/// Why the guard refused an invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// `AUTO_UV_DISABLE` is truthy.
    Disabled,
    /// `UV_RUN_ACTIVE` is set: this process already went through the launcher.
    AlreadyDelegated,
    /// Interactive, stdin, `-c`, `-m` or a script that does not exist.
    NoScript,
    /// Interpreter options precede the script and cannot be forwarded.
    InterpreterOptions,
    /// Script path is empty or not absolute after resolution.
    UnresolvedScript,
    /// Script lives under a protected directory.
    Protected(ProtectedKind),
}

/// Class of protected directory a script was found under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProtectedKind {
    RuntimePrefix(PathBuf),
    InstalledPackages,
    SystemBin(PathBuf),
    EnvironmentBin,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Disabled => write!(f, "{} is set", EnvKey::Disable.name()),
            RejectReason::AlreadyDelegated => {
                write!(f, "{} is set", EnvKey::LoopMarker.name())
            }
            RejectReason::NoScript => f.write_str("no script file"),
            RejectReason::InterpreterOptions => f.write_str("interpreter options present"),
            RejectReason::UnresolvedScript => f.write_str("script path not absolute"),
            RejectReason::Protected(kind) => match kind {
                ProtectedKind::RuntimePrefix(p) => {
                    write!(f, "script under runtime prefix {}", p.display())
                }
                ProtectedKind::InstalledPackages => {
                    f.write_str("script under an installed-packages directory")
                }
                ProtectedKind::SystemBin(p) => {
                    write!(f, "script under system directory {}", p.display())
                }
                ProtectedKind::EnvironmentBin => {
                    f.write_str("script under an environment bin directory")
                }
            },
        }
    }
}

/// Decide whether this invocation may be intercepted at all.
pub fn should_intercept(ctx: &InvocationContext, policy: &Policy) -> bool {
    rejection(ctx, policy).is_none()
}

/// The first guard rule that rejects `ctx`, or `None` when the guard passes.
#[instrument(level = "debug", skip_all, ret)]
pub fn rejection(ctx: &InvocationContext, policy: &Policy) -> Option<RejectReason> {
    if ctx.var(EnvKey::Disable).is_some_and(|v| policy.is_truthy(v)) {
        return Some(RejectReason::Disabled);
    }
    if ctx
        .var(EnvKey::LoopMarker)
        .is_some_and(|v| policy.marker_active(v))
    {
        return Some(RejectReason::AlreadyDelegated);
    }
    let Some(script) = ctx.script() else {
        return Some(RejectReason::NoScript);
    };
    if !ctx.interpreter_options().is_empty() {
        return Some(RejectReason::InterpreterOptions);
    }
    if script.as_os_str().is_empty() || !script.is_absolute() {
        return Some(RejectReason::UnresolvedScript);
    }
    let script = normalize_lexical(script);
    protected_kind(&script, ctx).map(RejectReason::Protected)
}

/// Classify `script` (normalized, absolute) against the protected directory tables.
pub fn protected_kind(script: &Path, ctx: &InvocationContext) -> Option<ProtectedKind> {
    for prefix in ctx.runtime_prefixes() {
        if script.starts_with(normalize_lexical(prefix)) {
            return Some(ProtectedKind::RuntimePrefix(prefix.clone()));
        }
    }
    if has_parent_component(script, PACKAGE_DIR_NAMES) {
        return Some(ProtectedKind::InstalledPackages);
    }
    for dir in system_dirs(ctx) {
        if starts_with_dir(script, &dir) {
            return Some(ProtectedKind::SystemBin(dir));
        }
    }
    // Any `bin`/`Scripts` ancestor counts, not only a venv's own: a script
    // anywhere below such a directory is left to the interpreter.
    if has_parent_component(script, ENV_BIN_DIR_NAMES) {
        return Some(ProtectedKind::EnvironmentBin);
    }
    None
}

fn system_dirs(ctx: &InvocationContext) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = if cfg!(windows) {
        Vec::new()
    } else {
        SYSTEM_BIN_DIRS.iter().map(PathBuf::from).collect()
    };
    for key in WINDOWS_SYSTEM_DIR_VARS {
        if let Some(v) = ctx.var(*key).filter(|v| !v.is_empty()) {
            let p = Path::new(v);
            if p.is_absolute() && p.parent().is_some() {
                dirs.push(normalize_lexical(p));
            }
        }
    }
    dirs
}

#[cfg(windows)]
fn starts_with_dir(script: &Path, dir: &Path) -> bool {
    let s = script.to_string_lossy().to_ascii_lowercase();
    let d = dir.to_string_lossy().to_ascii_lowercase();
    Path::new(&s).starts_with(Path::new(&d))
}

#[cfg(not(windows))]
fn starts_with_dir(script: &Path, dir: &Path) -> bool {
    script.starts_with(dir)
}
