use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use auto_uv::{decide, EnvKey, InvocationContext, Outcome, Platform, Policy};

mod cli;
mod doctor;

use cli::{Cli, Command};

/// JSON shape of `auto-uv check --json`.
#[derive(Serialize, Debug)]
struct CheckReport {
    state: &'static str,
    detail: String,
    script: Option<String>,
    project_root: Option<String>,
    launcher: Option<String>,
    argv: Option<Vec<String>>,
}

impl CheckReport {
    fn new(ctx: &InvocationContext, outcome: &Outcome) -> Self {
        let lossy = |p: &Path| p.to_string_lossy().to_string();
        let (project_root, launcher, argv) = match outcome {
            Outcome::Replace {
                project_root,
                launcher,
                plan,
            } => (
                Some(lossy(project_root)),
                Some(lossy(launcher.path())),
                Some(
                    plan.argv()
                        .iter()
                        .map(|a| a.to_string_lossy().to_string())
                        .collect(),
                ),
            ),
            Outcome::LauncherNotFound { project_root } => (Some(lossy(project_root)), None, None),
            _ => (None, None, None),
        };
        Self {
            state: outcome.state(),
            detail: outcome.to_string(),
            script: ctx.script().map(lossy),
            project_root,
            launcher,
            argv,
        }
    }
}

fn run_check(json: bool, python: Option<PathBuf>, argv: Vec<OsString>) -> ExitCode {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
    let vars: BTreeMap<OsString, OsString> = env::vars_os().collect();
    let interpreter = python
        .or_else(|| env::var_os(EnvKey::Python.name()).map(PathBuf::from))
        .or_else(|| auto_uv::shim::find_real_interpreter("python3").ok());

    let mut full: Vec<OsString> = vec![OsString::from("python")];
    full.extend(argv);
    let ctx = InvocationContext::from_interpreter_argv(full, cwd, vars, interpreter.as_deref());
    let policy = Policy::from_context(&ctx);
    let outcome = decide(&ctx, &policy, Platform::current());
    let report = CheckReport::new(&ctx, &outcome);

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("auto-uv: failed to render JSON: {e}");
                return ExitCode::from(1);
            }
        }
        return ExitCode::SUCCESS;
    }

    println!("state:    {}", report.detail);
    if let Some(s) = &report.script {
        println!("script:   {s}");
    }
    if let Some(root) = &report.project_root {
        println!("project:  {root}");
    }
    if let Some(l) = &report.launcher {
        println!("launcher: {l}");
    }
    if let Outcome::Replace { plan, .. } = &outcome {
        println!("command:  {}", auto_uv::util::shell_join(plan.argv()));
    }
    ExitCode::SUCCESS
}

fn run_install_shims(dir: &Path, names: Vec<String>, force: bool) -> ExitCode {
    let use_err = auto_uv::color_enabled_stderr();
    let names = if names.is_empty() {
        auto_uv::default_shim_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    } else {
        names
    };
    let result = auto_uv::shim_binary_path()
        .and_then(|shim| auto_uv::install_shims(dir, &shim, &names, force));
    match result {
        Ok(links) => {
            for l in links {
                auto_uv::log_info_stderr(use_err, &format!("auto-uv: linked {}", l.display()));
            }
            auto_uv::log_info_stderr(
                use_err,
                &format!(
                    "auto-uv: put {} before your interpreter on PATH to enable interception",
                    dir.display()
                ),
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            auto_uv::log_error_stderr(use_err, &format!("auto-uv: {e}"));
            ExitCode::from(auto_uv::exit_code_for_exec_error(&e))
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Some(mode) = cli.color {
        auto_uv::set_color_mode(mode);
    }
    auto_uv::telemetry_init();

    match cli.command {
        Command::Check { json, python, argv } => run_check(json, python, argv),
        Command::Doctor { verbose } => {
            doctor::run_doctor(verbose);
            ExitCode::SUCCESS
        }
        Command::InstallShims { dir, names, force } => run_install_shims(&dir, names, force),
    }
}
