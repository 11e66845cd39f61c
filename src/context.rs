#![allow(clippy::module_name_repetitions)]
//! Immutable snapshot of the facts one invocation is decided on.

use std::collections::BTreeMap;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::config::EnvKey;
use crate::shim::{interpreter_prefix, parse_interpreter_argv, ScriptMode};
use crate::util::fs::absolutize;

/// Observed facts about the current process. Built once, never mutated.
#[derive(Clone, Debug, Default)]
pub struct InvocationContext {
    script: Option<PathBuf>,
    script_token: Option<OsString>,
    script_args: Vec<OsString>,
    interpreter_options: Vec<OsString>,
    argv: Vec<OsString>,
    cwd: PathBuf,
    env: BTreeMap<OsString, OsString>,
    runtime_prefixes: Vec<PathBuf>,
}

impl InvocationContext {
    /// Snapshot the running process, treating its argv as an interpreter command line.
    pub fn capture(interpreter: Option<&Path>) -> Self {
        let argv: Vec<OsString> = env::args_os().collect();
        let cwd = env::current_dir().unwrap_or_default();
        let vars: BTreeMap<OsString, OsString> = env::vars_os().collect();
        Self::from_interpreter_argv(argv, cwd, vars, interpreter)
    }

    /// Build a context from an interpreter command line (`argv[0]` is the interpreter).
    ///
    /// The script is only recorded when it names an existing regular file;
    /// `-m`, `-c`, stdin and REPL invocations have no script.
    pub fn from_interpreter_argv(
        argv: Vec<OsString>,
        cwd: PathBuf,
        env: BTreeMap<OsString, OsString>,
        interpreter: Option<&Path>,
    ) -> Self {
        let parsed = parse_interpreter_argv(&argv);
        let (script, script_token, script_args) = match parsed.mode {
            ScriptMode::Script { path, args } => {
                let script = if path.is_empty() || !cwd.is_absolute() {
                    None
                } else {
                    Some(absolutize(Path::new(&path), &cwd)).filter(|p| p.is_file())
                };
                let token = script.as_ref().map(|_| path);
                (script, token, args)
            }
            _ => (None, None, Vec::new()),
        };

        let mut ctx = Self {
            script,
            script_token,
            script_args,
            interpreter_options: parsed.options,
            argv,
            cwd,
            env,
            runtime_prefixes: Vec::new(),
        };
        ctx.runtime_prefixes = ctx.collect_runtime_prefixes(interpreter);
        ctx
    }

    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    fn collect_runtime_prefixes(&self, interpreter: Option<&Path>) -> Vec<PathBuf> {
        let mut out = Vec::new();
        if let Some(prefix) = interpreter
            .map(|p| absolutize(p, &self.cwd))
            .and_then(|p| interpreter_prefix(&p))
        {
            out.push(prefix);
        }
        for key in [EnvKey::VirtualEnv, EnvKey::PythonHome] {
            if let Some(v) = self.var(key).filter(|v| !v.is_empty()) {
                let p = Path::new(v);
                // A root prefix would protect every path.
                if p.is_absolute() && p.parent().is_some() {
                    out.push(absolutize(p, &self.cwd));
                }
            }
        }
        out
    }

    /// Resolved absolute script path, if this is a script invocation.
    pub fn script(&self) -> Option<&Path> {
        self.script.as_deref()
    }

    /// The script argument exactly as it appeared on the command line.
    ///
    /// Forwarded to the launcher so the script sees the same `sys.argv[0]`;
    /// the resolved [`script`](Self::script) drives every decision.
    pub fn script_token(&self) -> Option<&OsStr> {
        self.script_token
            .as_deref()
            .or_else(|| self.script.as_deref().map(Path::as_os_str))
    }

    /// Arguments following the script, verbatim.
    pub fn script_args(&self) -> &[OsString] {
        &self.script_args
    }

    /// Interpreter options that preceded the script.
    pub fn interpreter_options(&self) -> &[OsString] {
        &self.interpreter_options
    }

    /// The raw interpreter command line including argv0.
    pub fn argv(&self) -> &[OsString] {
        &self.argv
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn env(&self) -> &BTreeMap<OsString, OsString> {
        &self.env
    }

    pub fn runtime_prefixes(&self) -> &[PathBuf] {
        &self.runtime_prefixes
    }

    /// Look up a contract variable in the snapshot.
    pub fn var(&self, key: EnvKey) -> Option<&OsStr> {
        self.var_named(key.name())
    }

    #[cfg(windows)]
    fn var_named(&self, name: &str) -> Option<&OsStr> {
        self.env
            .iter()
            .find(|(k, _)| k.to_str().is_some_and(|k| k.eq_ignore_ascii_case(name)))
            .map(|(_, v)| v.as_os_str())
    }

    #[cfg(not(windows))]
    fn var_named(&self, name: &str) -> Option<&OsStr> {
        self.env.get(OsStr::new(name)).map(OsString::as_os_str)
    }
}

/// Assemble a context field by field.
#[derive(Default)]
pub struct ContextBuilder {
    script: Option<PathBuf>,
    script_args: Vec<OsString>,
    interpreter_options: Vec<OsString>,
    cwd: Option<PathBuf>,
    env: BTreeMap<OsString, OsString>,
    runtime_prefixes: Vec<PathBuf>,
}

impl ContextBuilder {
    /// Script path taken as-is; relative paths are joined onto the working directory.
    pub fn script(mut self, path: impl Into<PathBuf>) -> Self {
        self.script = Some(path.into());
        self
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.script_args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.script_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn interpreter_option(mut self, opt: impl Into<OsString>) -> Self {
        self.interpreter_options.push(opt.into());
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn runtime_prefix(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.runtime_prefixes.push(prefix.into());
        self
    }

    pub fn build(self) -> InvocationContext {
        let cwd = self.cwd.unwrap_or_else(|| PathBuf::from("/"));
        let script_token = self
            .script
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::into_os_string);
        let script = script_token
            .as_ref()
            .map(|t| absolutize(Path::new(t), &cwd));
        let mut argv: Vec<OsString> = vec![OsString::from("python")];
        argv.extend(self.interpreter_options.iter().cloned());
        if let Some(t) = &script_token {
            argv.push(t.clone());
        }
        argv.extend(self.script_args.iter().cloned());
        InvocationContext {
            script,
            script_token,
            script_args: self.script_args,
            interpreter_options: self.interpreter_options,
            argv,
            cwd,
            env: self.env,
            runtime_prefixes: self.runtime_prefixes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os_vec(parts: &[&str]) -> Vec<OsString> {
        parts.iter().map(OsString::from).collect()
    }

    #[test]
    fn existing_script_is_resolved_against_cwd() {
        let td = tempfile::tempdir().expect("tmpdir");
        std::fs::write(td.path().join("main.py"), "print('hi')\n").expect("write");
        let ctx = InvocationContext::from_interpreter_argv(
            os_vec(&["python", "./main.py", "a", "b"]),
            td.path().to_path_buf(),
            BTreeMap::new(),
            None,
        );
        assert_eq!(ctx.script(), Some(td.path().join("main.py").as_path()));
        assert_eq!(ctx.script_token(), Some(OsStr::new("./main.py")));
        assert_eq!(ctx.script_args(), os_vec(&["a", "b"]).as_slice());
    }

    #[test]
    fn builder_keeps_script_spelling() {
        let ctx = InvocationContext::builder()
            .cwd("/home/u/proj")
            .script("./main.py")
            .build();
        assert_eq!(ctx.script(), Some(Path::new("/home/u/proj/main.py")));
        assert_eq!(ctx.script_token(), Some(OsStr::new("./main.py")));
    }

    #[test]
    fn missing_script_yields_no_script() {
        let td = tempfile::tempdir().expect("tmpdir");
        let ctx = InvocationContext::from_interpreter_argv(
            os_vec(&["python", "nope.py"]),
            td.path().to_path_buf(),
            BTreeMap::new(),
            None,
        );
        assert!(ctx.script().is_none());
    }

    #[test]
    fn module_mode_has_no_script() {
        let td = tempfile::tempdir().expect("tmpdir");
        let ctx = InvocationContext::from_interpreter_argv(
            os_vec(&["python", "-m", "http.server"]),
            td.path().to_path_buf(),
            BTreeMap::new(),
            None,
        );
        assert!(ctx.script().is_none());
        assert!(ctx.script_args().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn runtime_prefixes_come_from_interpreter_and_env() {
        let mut vars = BTreeMap::new();
        vars.insert(OsString::from("VIRTUAL_ENV"), OsString::from("/home/u/.venv"));
        vars.insert(OsString::from("PYTHONHOME"), OsString::from("/"));
        let ctx = InvocationContext::from_interpreter_argv(
            os_vec(&["python"]),
            PathBuf::from("/home/u"),
            vars,
            Some(Path::new("/opt/python3.12/bin/python3")),
        );
        assert_eq!(
            ctx.runtime_prefixes(),
            &[
                PathBuf::from("/opt/python3.12"),
                PathBuf::from("/home/u/.venv")
            ]
        );
    }
}
