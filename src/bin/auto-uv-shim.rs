use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use auto_uv::shim::{find_real_interpreter, tool_name_from_argv0};
use auto_uv::{
    auto_use_uv_with, exec_or_exit, exit_code_for_shim_error, InvocationContext,
    ReplacementPlan, ShimError,
};

const SHIM_NAME: &str = "auto-uv-shim";

fn real_interpreter(argv: &[OsString]) -> Result<PathBuf, ShimError> {
    let tool = tool_name_from_argv0(argv).ok_or(ShimError::NoToolName)?;
    let stem = tool.strip_suffix(env::consts::EXE_SUFFIX).unwrap_or(&tool);
    if stem == SHIM_NAME {
        return Err(ShimError::DirectInvocation);
    }
    Ok(find_real_interpreter(&tool)?)
}

fn main() -> ExitCode {
    auto_uv::telemetry_init();
    let argv: Vec<OsString> = env::args_os().collect();
    let interpreter = match real_interpreter(&argv) {
        Ok(p) => p,
        Err(e) => {
            auto_uv::log_error_stderr(
                auto_uv::color_enabled_stderr(),
                &format!("{SHIM_NAME}: {e}"),
            );
            return ExitCode::from(exit_code_for_shim_error(&e));
        }
    };

    let ctx = InvocationContext::capture(Some(&interpreter));
    let outcome = auto_use_uv_with(&ctx);
    tracing::debug!(state = outcome.state(), interpreter = %interpreter.display(), "pass-through");
    exec_or_exit(&ReplacementPlan::passthrough(
        &interpreter,
        ctx.argv(),
        ctx.env(),
    ))
}
