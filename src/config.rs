#![allow(clippy::module_name_repetitions)]
//! Fixed configuration tables and overridable policy constants.
//!
//! Every environment variable auto-uv reads or writes is named in [`EnvKey`];
//! call sites go through [`EnvKey::name`] instead of spelling literals.

use std::ffi::OsStr;

use crate::context::InvocationContext;

/// Environment variables forming the public contract of auto-uv.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum EnvKey {
    /// Truthy value disables interception for this process.
    Disable,
    /// Loop-prevention marker set before every replacement.
    LoopMarker,
    /// Overrides the ancestor ascent ceiling.
    MaxDepth,
    /// Overrides the launcher base name.
    Launcher,
    /// Shim: explicit path of the real interpreter.
    Python,
    /// Filter for the stderr tracing layer; unset means no tracing output.
    Log,
    /// auto|always|never for stderr messages.
    Color,
    Path,
    VirtualEnv,
    PythonHome,
    SystemRoot,
    ProgramFiles,
    ProgramFilesX86,
}

impl EnvKey {
    pub fn name(self) -> &'static str {
        match self {
            EnvKey::Disable => "AUTO_UV_DISABLE",
            EnvKey::LoopMarker => "UV_RUN_ACTIVE",
            EnvKey::MaxDepth => "AUTO_UV_MAX_DEPTH",
            EnvKey::Launcher => "AUTO_UV_LAUNCHER",
            EnvKey::Python => "AUTO_UV_PYTHON",
            EnvKey::Log => "AUTO_UV_LOG",
            EnvKey::Color => "AUTO_UV_COLOR",
            EnvKey::Path => "PATH",
            EnvKey::VirtualEnv => "VIRTUAL_ENV",
            EnvKey::PythonHome => "PYTHONHOME",
            EnvKey::SystemRoot => "SystemRoot",
            EnvKey::ProgramFiles => "ProgramFiles",
            EnvKey::ProgramFilesX86 => "ProgramFiles(x86)",
        }
    }

    /// Keys reported by `auto-uv doctor`.
    pub fn contract() -> &'static [EnvKey] {
        &[
            EnvKey::Disable,
            EnvKey::LoopMarker,
            EnvKey::MaxDepth,
            EnvKey::Launcher,
            EnvKey::Python,
            EnvKey::Log,
            EnvKey::Color,
        ]
    }
}

/// Unix system binary directories. Scripts below these are never intercepted.
pub const SYSTEM_BIN_DIRS: &[&str] = &[
    "/usr/bin",
    "/usr/local/bin",
    "/bin",
    "/sbin",
    "/usr/sbin",
    "/usr/local/sbin",
    "/opt/bin",
];

/// Windows counterparts of [`SYSTEM_BIN_DIRS`], resolved from the environment snapshot.
pub const WINDOWS_SYSTEM_DIR_VARS: &[EnvKey] = &[
    EnvKey::SystemRoot,
    EnvKey::ProgramFiles,
    EnvKey::ProgramFilesX86,
];

/// Path components naming an installed-packages directory.
pub const PACKAGE_DIR_NAMES: &[&str] = &["site-packages", "dist-packages"];

/// Path components naming an environment's executable directory. Matched at any
/// ancestor level, so `/srv/bin/work/app.py` is protected too.
pub const ENV_BIN_DIR_NAMES: &[&str] = &["bin", "Scripts"];

pub const DEFAULT_TRUTHY_TOKENS: &[&str] = &["1", "true", "yes"];
pub const DEFAULT_MAX_ASCENT: usize = 10;
pub const DEFAULT_LAUNCHER: &str = "uv";
pub const RUN_SUBCOMMAND: &str = "run";
pub const LOOP_MARKER_ACTIVE: &str = "1";

/// Policy constants for one invocation.
///
/// `Policy::default()` carries the documented defaults; [`Policy::from_context`]
/// applies `AUTO_UV_MAX_DEPTH` and `AUTO_UV_LAUNCHER` from the snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Policy {
    pub truthy_tokens: Vec<String>,
    pub max_ascent: usize,
    pub launcher_name: String,
    pub run_subcommand: String,
    pub loop_marker_value: String,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            truthy_tokens: DEFAULT_TRUTHY_TOKENS.iter().map(|s| s.to_string()).collect(),
            max_ascent: DEFAULT_MAX_ASCENT,
            launcher_name: DEFAULT_LAUNCHER.to_string(),
            run_subcommand: RUN_SUBCOMMAND.to_string(),
            loop_marker_value: LOOP_MARKER_ACTIVE.to_string(),
        }
    }
}

impl Policy {
    pub fn from_context(ctx: &InvocationContext) -> Self {
        let mut policy = Self::default();
        if let Some(depth) = ctx
            .var(EnvKey::MaxDepth)
            .and_then(OsStr::to_str)
            .and_then(|s| s.trim().parse::<usize>().ok())
        {
            policy.max_ascent = depth;
        }
        if let Some(name) = ctx.var(EnvKey::Launcher).and_then(OsStr::to_str) {
            let name = name.trim();
            if !name.is_empty() && !name.contains(['/', '\\']) {
                policy.launcher_name = name.to_string();
            }
        }
        policy
    }

    /// Case-insensitive match against the truthy token set.
    pub fn is_truthy(&self, value: &OsStr) -> bool {
        let Some(v) = value.to_str() else {
            return false;
        };
        let v = v.trim();
        self.truthy_tokens
            .iter()
            .any(|t| t.eq_ignore_ascii_case(v))
    }

    /// The loop marker counts as active for any non-empty value.
    pub fn marker_active(&self, value: &OsStr) -> bool {
        !value.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn truthy_tokens_are_case_insensitive() {
        let p = Policy::default();
        for v in ["1", "true", "TRUE", "Yes", " yes "] {
            assert!(p.is_truthy(OsStr::new(v)), "expected truthy: {v:?}");
        }
        for v in ["", "0", "false", "no", "on", "y"] {
            assert!(!p.is_truthy(OsStr::new(v)), "expected falsy: {v:?}");
        }
    }

    #[test]
    fn overrides_apply_from_snapshot() {
        let ctx = InvocationContext::builder()
            .env(EnvKey::MaxDepth.name(), "3")
            .env(EnvKey::Launcher.name(), "uv-nightly")
            .build();
        let p = Policy::from_context(&ctx);
        assert_eq!(p.max_ascent, 3);
        assert_eq!(p.launcher_name, "uv-nightly");
    }

    #[test]
    fn invalid_overrides_are_ignored() {
        let ctx = InvocationContext::builder()
            .env(EnvKey::MaxDepth.name(), "-2")
            .env(EnvKey::Launcher.name(), "../evil/uv")
            .build();
        assert_eq!(Policy::from_context(&ctx), Policy::default());
    }

    #[test]
    fn marker_active_for_any_non_empty_value() {
        let p = Policy::default();
        assert!(p.marker_active(&OsString::from("1")));
        assert!(p.marker_active(&OsString::from("anything")));
        assert!(!p.marker_active(&OsString::new()));
    }
}
