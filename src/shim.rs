#![allow(clippy::module_name_repetitions)]
//! Interpreter shim support: argv classification and real-interpreter lookup.
//!
//! `auto-uv-shim` is installed under interpreter names (`python`, `python3`).
//! It needs to know which file the interpreter would run and where the
//! interpreter it stands in for actually lives.

use std::env;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::instrument;

use crate::config::EnvKey;

/// What the interpreter would execute for a given command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptMode {
    /// `python [opts] script.py args...`
    Script { path: OsString, args: Vec<OsString> },
    /// `-m module`
    Module,
    /// `-c command`
    Command,
    /// `-` reads the program from stdin
    Stdin,
    /// `-h` / `-V` style informational runs
    Info,
    /// no program argument: REPL
    Interactive,
}

/// Parsed interpreter command line (argv0 excluded).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterpreterArgs {
    pub options: Vec<OsString>,
    pub mode: ScriptMode,
}

impl InterpreterArgs {
    pub fn script(&self) -> Option<&OsStr> {
        match &self.mode {
            ScriptMode::Script { path, .. } => Some(path.as_os_str()),
            _ => None,
        }
    }
}

/// Long options that consume the following argument.
const LONG_WITH_VALUE: &[&str] = &["--check-hash-based-pycs"];

/// Short options that take a value, either inline (`-Wdefault`) or as the next argument.
const SHORT_WITH_VALUE: &[char] = &['W', 'X'];

/// Classify a CPython-style command line.
///
/// - honors `--` (next argument is the script)
/// - `-m` / `-c` end option processing without naming a script file
/// - combined short flags (`-uB`) and inline values (`-Xdev`) are understood
pub fn parse_interpreter_argv(argv: &[OsString]) -> InterpreterArgs {
    let mut options: Vec<OsString> = Vec::new();
    let mut i = 1usize;
    while i < argv.len() {
        let raw = &argv[i];
        let Some(a) = raw.to_str() else {
            // Non-UTF-8 arguments cannot be options.
            return script_at(argv, i, options);
        };

        if a == "--" {
            if i + 1 < argv.len() {
                return script_at(argv, i + 1, options);
            }
            return InterpreterArgs {
                options,
                mode: ScriptMode::Interactive,
            };
        }

        if a == "-" {
            return InterpreterArgs {
                options,
                mode: ScriptMode::Stdin,
            };
        }

        if let Some(long) = a.strip_prefix("--") {
            if long == "help" || long == "version" || long.starts_with("help-") {
                return InterpreterArgs {
                    options,
                    mode: ScriptMode::Info,
                };
            }
            options.push(raw.clone());
            if LONG_WITH_VALUE.contains(&a) && i + 1 < argv.len() {
                options.push(argv[i + 1].clone());
                i += 2;
            } else {
                i += 1;
            }
            continue;
        }

        if let Some(flags) = a.strip_prefix('-') {
            let mut consumed_next = false;
            for (pos, ch) in flags.char_indices() {
                match ch {
                    'c' => {
                        return InterpreterArgs {
                            options,
                            mode: ScriptMode::Command,
                        }
                    }
                    'm' => {
                        return InterpreterArgs {
                            options,
                            mode: ScriptMode::Module,
                        }
                    }
                    'h' | '?' | 'V' => {
                        return InterpreterArgs {
                            options,
                            mode: ScriptMode::Info,
                        }
                    }
                    c if SHORT_WITH_VALUE.contains(&c) => {
                        // Value is the rest of this token, or the next argument.
                        consumed_next = flags[pos + c.len_utf8()..].is_empty();
                        break;
                    }
                    _ => {}
                }
            }
            options.push(raw.clone());
            if consumed_next && i + 1 < argv.len() {
                options.push(argv[i + 1].clone());
                i += 2;
            } else {
                i += 1;
            }
            continue;
        }

        return script_at(argv, i, options);
    }

    InterpreterArgs {
        options,
        mode: ScriptMode::Interactive,
    }
}

fn script_at(argv: &[OsString], i: usize, options: Vec<OsString>) -> InterpreterArgs {
    InterpreterArgs {
        options,
        mode: ScriptMode::Script {
            path: argv[i].clone(),
            args: argv[i + 1..].to_vec(),
        },
    }
}

/// Tool name the shim was invoked as (basename of argv0).
pub fn tool_name_from_argv0(argv: &[OsString]) -> Option<String> {
    argv.first()
        .and_then(|p| Path::new(p).file_name())
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
}

/// Install prefix of an interpreter binary: `<prefix>/bin/python` → `<prefix>`,
/// `C:\Python312\python.exe` → `C:\Python312`. A bare filesystem root is never a prefix.
pub fn interpreter_prefix(interpreter: &Path) -> Option<PathBuf> {
    let dir = interpreter.parent()?;
    let is_bin = dir
        .file_name()
        .and_then(OsStr::to_str)
        .is_some_and(|n| crate::config::ENV_BIN_DIR_NAMES.contains(&n));
    let prefix = if is_bin { dir.parent()? } else { dir };
    prefix.parent()?;
    Some(prefix.to_path_buf())
}

/// Locate the interpreter the shim stands in for.
///
/// `AUTO_UV_PYTHON` wins when set. Otherwise `PATH` is searched for `tool`,
/// skipping any entry that resolves to the shim binary itself.
#[instrument(level = "debug")]
pub fn find_real_interpreter(tool: &str) -> io::Result<PathBuf> {
    let me = env::current_exe().and_then(fs::canonicalize).ok();
    if let Some(p) = env::var_os(EnvKey::Python.name()).filter(|v| !v.is_empty()) {
        let p = PathBuf::from(p);
        if me.is_some() && fs::canonicalize(&p).ok() == me {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} points back at auto-uv-shim", EnvKey::Python.name()),
            ));
        }
        return Ok(p);
    }
    let path = env::var_os(EnvKey::Path.name()).unwrap_or_default();
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_interpreter_in(tool, &path, &cwd, me.as_deref()).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no '{tool}' interpreter found in PATH besides auto-uv-shim"),
        )
    })
}

/// Deterministic lookup for tests: first executable `tool` in `search_path`
/// whose canonical path differs from `exclude`.
pub fn find_interpreter_in(
    tool: &str,
    search_path: &OsStr,
    cwd: &Path,
    exclude: Option<&Path>,
) -> Option<PathBuf> {
    let candidates = which::which_in_all(tool, Some(search_path), cwd).ok()?;
    for candidate in candidates {
        let canonical = fs::canonicalize(&candidate).unwrap_or_else(|_| candidate.clone());
        if exclude.is_some_and(|me| me == canonical) {
            tracing::debug!(candidate = %candidate.display(), "skipping shim on PATH");
            continue;
        }
        return Some(candidate);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os_vec(parts: &[&str]) -> Vec<OsString> {
        parts.iter().map(OsString::from).collect()
    }

    #[test]
    fn plain_script_with_args() {
        let a = parse_interpreter_argv(&os_vec(&["python", "run.py", "-v", "--x=1"]));
        assert!(a.options.is_empty());
        assert_eq!(
            a.mode,
            ScriptMode::Script {
                path: "run.py".into(),
                args: os_vec(&["-v", "--x=1"]),
            }
        );
    }

    #[test]
    fn module_and_command_modes() {
        assert_eq!(
            parse_interpreter_argv(&os_vec(&["python3", "-m", "pip"])).mode,
            ScriptMode::Module
        );
        assert_eq!(
            parse_interpreter_argv(&os_vec(&["python3", "-mpip"])).mode,
            ScriptMode::Module
        );
        assert_eq!(
            parse_interpreter_argv(&os_vec(&["python3", "-c", "print(1)"])).mode,
            ScriptMode::Command
        );
        assert_eq!(
            parse_interpreter_argv(&os_vec(&["python3", "-uc", "print(1)"])).mode,
            ScriptMode::Command
        );
    }

    #[test]
    fn stdin_interactive_and_info() {
        assert_eq!(
            parse_interpreter_argv(&os_vec(&["python", "-"])).mode,
            ScriptMode::Stdin
        );
        assert_eq!(
            parse_interpreter_argv(&os_vec(&["python"])).mode,
            ScriptMode::Interactive
        );
        assert_eq!(
            parse_interpreter_argv(&os_vec(&["python", "-V"])).mode,
            ScriptMode::Info
        );
        assert_eq!(
            parse_interpreter_argv(&os_vec(&["python", "--version"])).mode,
            ScriptMode::Info
        );
    }

    #[test]
    fn options_with_values_are_skipped() {
        let a = parse_interpreter_argv(&os_vec(&["python", "-W", "error", "-Xdev", "s.py"]));
        assert_eq!(a.options, os_vec(&["-W", "error", "-Xdev"]));
        assert_eq!(a.script(), Some(OsStr::new("s.py")));

        let a = parse_interpreter_argv(&os_vec(&[
            "python",
            "--check-hash-based-pycs",
            "always",
            "s.py",
        ]));
        assert_eq!(a.script(), Some(OsStr::new("s.py")));
    }

    #[test]
    fn double_dash_names_script() {
        let a = parse_interpreter_argv(&os_vec(&["python", "--", "-weird.py", "a"]));
        assert_eq!(a.script(), Some(OsStr::new("-weird.py")));
        assert_eq!(
            parse_interpreter_argv(&os_vec(&["python", "--"])).mode,
            ScriptMode::Interactive
        );
    }

    #[test]
    fn tool_name_is_basename() {
        assert_eq!(
            tool_name_from_argv0(&os_vec(&["/opt/shims/python3"])).as_deref(),
            Some("python3")
        );
        assert_eq!(tool_name_from_argv0(&[]), None);
    }

    #[cfg(unix)]
    #[test]
    fn prefix_from_bin_layout() {
        assert_eq!(
            interpreter_prefix(Path::new("/usr/local/bin/python3")),
            Some(PathBuf::from("/usr/local"))
        );
        assert_eq!(
            interpreter_prefix(Path::new("/opt/py/python")),
            Some(PathBuf::from("/opt/py"))
        );
        // /bin/python would make "/" the prefix; never protect the whole filesystem.
        assert_eq!(interpreter_prefix(Path::new("/bin/python")), None);
    }
}
