#![cfg(unix)]

mod common;

use std::process::{Command, Output};

use common::Sandbox;

fn run_shim(
    sb: &Sandbox,
    name: &str,
    args: &[&str],
    with_uv: bool,
    extra: &[(&str, &str)],
) -> Output {
    let shim = sb.link_shim(name);
    let mut cmd = Command::new(&shim);
    cmd.args(args)
        .current_dir(sb.root())
        .env_clear()
        .env("PATH", sb.search_path(with_uv));
    for (k, v) in extra {
        cmd.env(k, v);
    }
    cmd.output().expect("failed to run auto-uv-shim")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).to_string()
}

#[test]
fn project_script_is_delegated_to_uv_run() {
    let sb = Sandbox::new();
    let out = run_shim(&sb, "python", &["proj/main.py", "a", "--b"], true, &[]);
    let text = stdout(&out);
    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert!(
        text.contains("uv:run proj/main.py a --b"),
        "unexpected stdout:\n{text}"
    );
    assert!(text.contains("marker:1"), "loop marker missing:\n{text}");
    assert!(!text.contains("python:"), "interpreter must not run:\n{text}");
}

#[test]
fn script_spelling_is_forwarded_verbatim() {
    let sb = Sandbox::new();
    let out = run_shim(&sb, "python", &["./proj/../proj/main.py", "a"], true, &[]);
    let text = stdout(&out);
    assert!(
        text.contains("uv:run ./proj/../proj/main.py a"),
        "unexpected stdout:\n{text}"
    );
}

#[test]
fn unexecutable_launcher_exits_with_distinct_status() {
    let sb = Sandbox::new();
    common::write_exec(
        &sb.path("tools/uv"),
        "#!/nonexistent/auto-uv-test/interp\n",
    );
    let out = run_shim(
        &sb,
        "python",
        &["proj/main.py"],
        true,
        &[("NO_COLOR", "1")],
    );
    let code = out.status.code();
    assert!(
        matches!(code, Some(127) | Some(126)),
        "unexpected status {code:?}"
    );
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("auto-uv: failed to exec"), "stderr:\n{err}");
    assert!(err.contains("tools/uv"), "stderr:\n{err}");
    assert!(!stdout(&out).contains("python:"), "interpreter must not run");
}

#[test]
fn disabled_runs_real_interpreter() {
    let sb = Sandbox::new();
    let out = run_shim(
        &sb,
        "python3",
        &["proj/main.py", "x"],
        true,
        &[("AUTO_UV_DISABLE", "TRUE")],
    );
    let text = stdout(&out);
    assert!(text.contains("python:proj/main.py x"), "stdout:\n{text}");
    assert!(!text.contains("uv:"), "stdout:\n{text}");
}

#[test]
fn loop_marker_prevents_redelegation() {
    let sb = Sandbox::new();
    let out = run_shim(
        &sb,
        "python",
        &["proj/main.py"],
        true,
        &[("UV_RUN_ACTIVE", "1")],
    );
    assert!(stdout(&out).contains("python:proj/main.py"));
}

#[test]
fn script_outside_project_passes_through() {
    let sb = Sandbox::new();
    // Depth 0 keeps the search inside the sandbox: only `loose/` and the cwd.
    let out = run_shim(
        &sb,
        "python",
        &["loose/tool.py"],
        true,
        &[("AUTO_UV_MAX_DEPTH", "0")],
    );
    let text = stdout(&out);
    assert!(text.contains("python:loose/tool.py"), "stdout:\n{text}");
    assert!(!text.contains("uv:"), "stdout:\n{text}");
}

#[test]
fn missing_launcher_passes_through() {
    let sb = Sandbox::new();
    let out = run_shim(&sb, "python", &["proj/main.py"], false, &[]);
    assert!(stdout(&out).contains("python:proj/main.py"));
}

#[test]
fn module_invocation_passes_through() {
    let sb = Sandbox::new();
    let out = run_shim(&sb, "python", &["-m", "http.server"], true, &[]);
    assert!(stdout(&out).contains("python:-m http.server"));
}

#[test]
fn interpreter_exit_status_is_preserved() {
    let sb = Sandbox::new();
    let out = run_shim(
        &sb,
        "python",
        &["-c", "pass"],
        true,
        &[("FAKE_PY_EXIT", "3")],
    );
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn explicit_interpreter_override_is_used() {
    let sb = Sandbox::new();
    common::write_exec(
        &sb.path("other/python-dev"),
        "#!/bin/sh\necho \"override:$*\"\n",
    );
    let other = sb.path("other/python-dev");
    let out = run_shim(
        &sb,
        "python",
        &["-V"],
        true,
        &[("AUTO_UV_PYTHON", other.to_str().expect("utf8"))],
    );
    assert!(stdout(&out).contains("override:-V"));
}

#[test]
fn direct_invocation_is_refused() {
    let out = Command::new(env!("CARGO_BIN_EXE_auto-uv-shim"))
        .arg("script.py")
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run auto-uv-shim");
    assert_eq!(out.status.code(), Some(1));
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("auto-uv-shim:"), "stderr:\n{err}");
}
