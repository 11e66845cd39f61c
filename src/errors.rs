//! Error mapping guide:
//! - A failed process replacement is the only hard error in the decision pipeline.
//! - Map io::ErrorKind::NotFound to 127, PermissionDenied to 126, everything else to 86.
//! - Keep user-visible strings stable; tests match on them.
use std::fmt;
use std::io;

/// Exit status when the replacement target vanished.
pub const EXIT_NOT_FOUND: u8 = 127;
/// Exit status when the replacement target cannot be executed.
pub const EXIT_NOT_EXECUTABLE: u8 = 126;
/// Exit status for any other replacement failure.
pub const EXIT_REPLACE_FAILED: u8 = 86;

/// Map an exec failure to a process exit code distinguishable from ordinary script failures.
pub fn exit_code_for_exec_error(e: &io::Error) -> u8 {
    match e.kind() {
        io::ErrorKind::NotFound => EXIT_NOT_FOUND,
        io::ErrorKind::PermissionDenied => EXIT_NOT_EXECUTABLE,
        _ => EXIT_REPLACE_FAILED,
    }
}

/// Failures of the shim binary outside the decision pipeline.
#[derive(Debug)]
pub enum ShimError {
    /// argv0 carried no usable tool name.
    NoToolName,
    /// Run as `auto-uv-shim` instead of through an interpreter-named link.
    DirectInvocation,
    /// No real interpreter to hand the invocation to.
    Interpreter(io::Error),
}

impl From<io::Error> for ShimError {
    fn from(e: io::Error) -> Self {
        ShimError::Interpreter(e)
    }
}

impl fmt::Display for ShimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&display_for_shim_error(self))
    }
}

impl std::error::Error for ShimError {}

/// Convert ShimError to exit code (parity with io::Error mapping).
pub fn exit_code_for_shim_error(e: &ShimError) -> u8 {
    match e {
        ShimError::NoToolName | ShimError::DirectInvocation => 1,
        ShimError::Interpreter(ioe) => exit_code_for_exec_error(ioe),
    }
}

/// Render a user-facing string for ShimError.
pub fn display_for_shim_error(e: &ShimError) -> String {
    match e {
        ShimError::NoToolName => "could not determine tool name".to_string(),
        ShimError::DirectInvocation => {
            "invoke through a link named after the interpreter (see `auto-uv install-shims`)"
                .to_string()
        }
        ShimError::Interpreter(ioe) => ioe.to_string(),
    }
}
