#![allow(clippy::module_name_repetitions)]
//! Process-image replacement.
//!
//! On Unix the current process becomes the target program via `execve`; nothing
//! after a successful call runs. Windows has no such primitive, so there the
//! target is spawned, awaited, and its exit code becomes ours.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};

use crate::color::{color_enabled_stderr, log_error_stderr};
use crate::config::{EnvKey, Policy};
use crate::context::InvocationContext;
use crate::errors::exit_code_for_exec_error;
use crate::launcher::LauncherCandidate;

/// Program, argument vector and environment of a process replacement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplacementPlan {
    program: PathBuf,
    argv: Vec<OsString>,
    env: BTreeMap<OsString, OsString>,
}

impl ReplacementPlan {
    /// `<launcher> run <script> <args...>` with the loop marker set.
    ///
    /// The script is forwarded as typed; the working directory survives the
    /// exec, so relative spellings stay valid. Returns `None` when the context
    /// has no script.
    pub fn for_launcher(
        candidate: &LauncherCandidate,
        ctx: &InvocationContext,
        policy: &Policy,
    ) -> Option<Self> {
        let script = ctx.script_token()?;
        let mut argv: Vec<OsString> = Vec::with_capacity(ctx.script_args().len() + 3);
        argv.push(candidate.path().as_os_str().to_os_string());
        argv.push(OsString::from(&policy.run_subcommand));
        argv.push(script.to_os_string());
        argv.extend(ctx.script_args().iter().cloned());

        let mut env = ctx.env().clone();
        env.insert(
            OsString::from(EnvKey::LoopMarker.name()),
            OsString::from(&policy.loop_marker_value),
        );

        Some(Self {
            program: candidate.path().to_path_buf(),
            argv,
            env,
        })
    }

    /// Hand the untouched command line to the real interpreter.
    ///
    /// `argv[0]` becomes the interpreter path: CPython derives its prefix from
    /// argv0, and the invoked name would resolve back to the shim. No variables
    /// are added.
    pub fn passthrough(
        interpreter: &Path,
        argv: &[OsString],
        env: &BTreeMap<OsString, OsString>,
    ) -> Self {
        let mut full: Vec<OsString> = Vec::with_capacity(argv.len().max(1));
        full.push(interpreter.as_os_str().to_os_string());
        full.extend(argv.iter().skip(1).cloned());
        Self {
            program: interpreter.to_path_buf(),
            argv: full,
            env: env.clone(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn argv(&self) -> &[OsString] {
        &self.argv
    }

    pub fn env(&self) -> &BTreeMap<OsString, OsString> {
        &self.env
    }

    pub fn env_var(&self, key: &str) -> Option<&OsStr> {
        self.env.get(OsStr::new(key)).map(OsString::as_os_str)
    }
}

/// Replace the current process with `plan`. Returns only the error on failure.
#[cfg(unix)]
pub fn exec_plan(plan: &ReplacementPlan) -> io::Error {
    use nix::unistd::execve;
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    fn c(s: &OsStr) -> io::Result<CString> {
        CString::new(s.as_bytes()).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
    }

    let converted = (|| -> io::Result<(CString, Vec<CString>, Vec<CString>)> {
        let path = c(plan.program.as_os_str())?;
        let argv = plan
            .argv
            .iter()
            .map(|a| c(a))
            .collect::<io::Result<Vec<_>>>()?;
        let envp = plan
            .env
            .iter()
            .map(|(k, v)| {
                let mut kv = k.clone();
                kv.push("=");
                kv.push(v);
                c(&kv)
            })
            .collect::<io::Result<Vec<_>>>()?;
        Ok((path, argv, envp))
    })();

    let (path, argv, envp) = match converted {
        Ok(v) => v,
        Err(e) => return e,
    };

    tracing::debug!(program = %plan.program.display(), "execve");
    match execve(&path, &argv, &envp) {
        Ok(never) => match never {},
        Err(errno) => io::Error::from(errno),
    }
}

/// Windows: run `plan` to completion and exit with its status.
#[cfg(not(unix))]
pub fn exec_plan(plan: &ReplacementPlan) -> io::Error {
    use std::process::Command;

    let mut cmd = Command::new(&plan.program);
    cmd.args(plan.argv.iter().skip(1));
    cmd.env_clear();
    cmd.envs(plan.env.iter());
    match cmd.status() {
        Ok(status) => std::process::exit(status.code().unwrap_or(1)),
        Err(e) => e,
    }
}

/// Replace the process or terminate with a distinguishable status.
pub fn exec_or_exit(plan: &ReplacementPlan) -> ! {
    let err = exec_plan(plan);
    tracing::warn!(program = %plan.program.display(), error = %err, "process replacement failed");
    log_error_stderr(
        color_enabled_stderr(),
        &format!("auto-uv: failed to exec {}: {err}", plan.program.display()),
    );
    std::process::exit(i32::from(exit_code_for_exec_error(&err)))
}

/// Become `<launcher> run <script> <args...>`. Never returns.
pub fn replace_process(
    candidate: &LauncherCandidate,
    ctx: &InvocationContext,
    policy: &Policy,
) -> ! {
    match ReplacementPlan::for_launcher(candidate, ctx, policy) {
        Some(plan) => exec_or_exit(&plan),
        None => {
            let err = io::Error::new(io::ErrorKind::InvalidInput, "no script to forward");
            log_error_stderr(
                color_enabled_stderr(),
                &format!(
                    "auto-uv: failed to exec {}: {err}",
                    candidate.path().display()
                ),
            );
            std::process::exit(i32::from(exit_code_for_exec_error(&err)))
        }
    }
}
