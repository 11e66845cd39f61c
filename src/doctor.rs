use std::env;
use std::path::PathBuf;
use std::time::Duration;

use auto_uv::util::exec::{ExecRequest, ExecService};
use auto_uv::{
    find_project_root, resolve_launcher, EnvKey, InvocationContext, Platform, Policy,
    SearchDecision,
};

pub fn run_doctor(verbose: bool) {
    let version = env!("CARGO_PKG_VERSION");
    let use_err = auto_uv::color_enabled_stderr();
    eprintln!("auto-uv doctor");
    eprintln!();
    eprintln!("  version: v{}", version);
    eprintln!(
        "  host:    {} / {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    if verbose {
        eprintln!("  build:   {}", env!("AUTO_UV_BUILD_DATE"));
        eprintln!("  target:  {}", env!("AUTO_UV_BUILD_TARGET"));
        eprintln!("  profile: {}", env!("AUTO_UV_BUILD_PROFILE"));
        eprintln!("  rustc:   {}", env!("AUTO_UV_BUILD_RUSTC"));
    }
    eprintln!();

    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
    let ctx = InvocationContext::builder()
        .cwd(cwd.clone())
        .envs(env::vars_os())
        .build();
    let policy = Policy::from_context(&ctx);

    eprintln!("  policy:");
    eprintln!("    max ascent:    {}", policy.max_ascent);
    eprintln!("    launcher name: {}", policy.launcher_name);
    eprintln!("    truthy tokens: {}", policy.truthy_tokens.join("/"));
    eprintln!();

    eprintln!("  environment:");
    for key in EnvKey::contract() {
        let value = ctx
            .var(*key)
            .map(|v| v.to_string_lossy().to_string())
            .unwrap_or_else(|| "(unset)".to_string());
        eprintln!("    {:<18} {}", key.name(), value);
    }
    if ctx
        .var(EnvKey::Disable)
        .is_some_and(|v| policy.is_truthy(v))
    {
        auto_uv::log_warn_stderr(use_err, "    interception is disabled for this shell");
    }
    eprintln!();

    match find_project_root(&cwd, policy.max_ascent) {
        SearchDecision::Found {
            root,
            depth,
            marker,
        } => eprintln!(
            "  project: {} ({} at depth {})",
            root.display(),
            marker.file_name(),
            depth
        ),
        SearchDecision::NotFound { levels } => {
            eprintln!("  project: none (checked {} directories)", levels)
        }
    }

    match resolve_launcher(Platform::current(), &ctx, &policy) {
        Some(candidate) => {
            eprintln!(
                "  launcher: {} ({})",
                candidate.path().display(),
                candidate.variant()
            );
            let probe = ExecService::new(Duration::from_secs(2)).run(
                ExecRequest::new(candidate.path())
                    .arg("--version")
                    .env("NO_COLOR", "1")
                    .capture_output(true),
            );
            match probe {
                Ok(out) if out.status.success() => {
                    eprintln!("  {} --version: {}", policy.launcher_name, out.stdout.trim());
                    if verbose {
                        eprintln!("    (probe took {:?})", out.duration);
                    }
                }
                Ok(out) => auto_uv::log_warn_stderr(
                    use_err,
                    &format!(
                        "  {} --version failed ({}): {}",
                        policy.launcher_name,
                        out.status,
                        out.stderr.trim()
                    ),
                ),
                Err(e) => auto_uv::log_warn_stderr(
                    use_err,
                    &format!("  {} --version failed: {e}", policy.launcher_name),
                ),
            }
        }
        None => auto_uv::log_warn_stderr(
            use_err,
            &format!("  launcher: '{}' not found in PATH", policy.launcher_name),
        ),
    }

    eprintln!();
    eprintln!("doctor: completed diagnostics.");
}
