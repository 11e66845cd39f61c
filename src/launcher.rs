#![allow(clippy::module_name_repetitions)]
//! Launcher resolution: find the `uv` executable on the search path.

use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::instrument;

use crate::config::{EnvKey, Policy};
use crate::context::InvocationContext;
use crate::util::fs::absolutize;

/// Executable naming convention to probe with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Platform {
    Unix,
    Windows,
}

/// Suffix variants probed after the bare name on Windows, in precedence order.
const WINDOWS_SUFFIXES: &[&str] = &[".exe", ".cmd", ".bat"];

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    /// Names probed in each search-path directory, in precedence order.
    pub fn executable_names(self, base: &str) -> Vec<String> {
        let mut names = vec![base.to_string()];
        if self == Platform::Windows {
            names.extend(WINDOWS_SUFFIXES.iter().map(|s| format!("{base}{s}")));
        }
        names
    }
}

/// A launcher executable confirmed to exist and be executable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LauncherCandidate {
    path: PathBuf,
    variant: String,
}

impl LauncherCandidate {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The executable name that matched (`uv`, `uv.exe`, ...).
    pub fn variant(&self) -> &str {
        &self.variant
    }
}

/// Resolve the launcher from the context's `PATH` snapshot.
pub fn resolve_launcher(
    platform: Platform,
    ctx: &InvocationContext,
    policy: &Policy,
) -> Option<LauncherCandidate> {
    let search_path = ctx.var(EnvKey::Path)?;
    resolve_in(platform, &policy.launcher_name, search_path, ctx.cwd())
}

/// Probe every `search_path` entry in order and, within an entry, every
/// platform name variant in order. Returns the first executable regular file.
///
/// Each variant is checked at its exact path: no `PATHEXT` expansion, so
/// `uv.cmd` always wins over `uv.bat` and other extensions are never picked.
#[instrument(level = "debug", skip(search_path, cwd), ret)]
pub fn resolve_in(
    platform: Platform,
    base: &str,
    search_path: &OsStr,
    cwd: &Path,
) -> Option<LauncherCandidate> {
    if base.is_empty() {
        return None;
    }
    let names = platform.executable_names(base);
    for entry in env::split_paths(search_path) {
        if entry.as_os_str().is_empty() {
            continue;
        }
        let dir = absolutize(&entry, cwd);
        if !dir.is_absolute() {
            continue;
        }
        for name in &names {
            let candidate = dir.join(name);
            if is_executable_file(&candidate) {
                return Some(LauncherCandidate {
                    path: candidate,
                    variant: name.clone(),
                });
            }
        }
    }
    None
}

/// Regular file (symlinks followed) that the current platform may execute.
fn is_executable_file(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) => meta.is_file() && has_exec_permission(&meta),
        Err(_) => false,
    }
}

#[cfg(unix)]
fn has_exec_permission(meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_exec_permission(_meta: &fs::Metadata) -> bool {
    true
}
