use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "auto-uv",
    version,
    about = "Run Python scripts through `uv run` automatically when they belong to a uv project."
)]
pub(crate) struct Cli {
    /// Colorize stderr output: auto|always|never
    #[arg(long = "color", value_enum, global = true)]
    pub(crate) color: Option<auto_uv::ColorMode>,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Command {
    /// Show what the shim would do for an interpreter command line (never executes)
    Check {
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
        /// Interpreter whose install prefix is protected (defaults to AUTO_UV_PYTHON or python3 on PATH)
        #[arg(long)]
        python: Option<PathBuf>,
        /// Interpreter arguments, e.g. `-- script.py --flag`
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        argv: Vec<OsString>,
    },
    /// Run diagnostics: policy, environment, project detection, launcher
    Doctor {
        /// Include build information and probe timings
        #[arg(long)]
        verbose: bool,
    },
    /// Link interpreter names to auto-uv-shim in a directory to put first on PATH
    InstallShims {
        /// Target directory (created if missing)
        #[arg(long)]
        dir: PathBuf,
        /// Interpreter name to link (repeatable; default: python, python3)
        #[arg(long = "name")]
        names: Vec<String>,
        /// Replace existing entries
        #[arg(long)]
        force: bool,
    },
}
