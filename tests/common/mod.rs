#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

#[cfg(unix)]
pub fn write_exec(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(path, body).expect("write script");
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod");
}

/// Scratch layout shared by the end-to-end tests:
///
/// - `proj/` uv project with `pyproject.toml` and `main.py`
/// - `loose/` directory with a script and no markers
/// - `tools/uv` fake launcher echoing its argv and the loop marker
/// - `pyhome/bin/python{,3}` fake interpreter echoing its argv
pub struct Sandbox {
    pub td: tempfile::TempDir,
}

impl Sandbox {
    #[cfg(unix)]
    pub fn new() -> Self {
        let td = tempfile::tempdir().expect("tmpdir");
        let root = td.path();
        fs::create_dir_all(root.join("proj")).expect("mkdir");
        fs::write(root.join("proj/pyproject.toml"), "[project]\nname = \"demo\"\n")
            .expect("write");
        fs::write(root.join("proj/main.py"), "print('hi')\n").expect("write");
        fs::create_dir_all(root.join("loose")).expect("mkdir");
        fs::write(root.join("loose/tool.py"), "print('hi')\n").expect("write");
        write_exec(
            &root.join("tools/uv"),
            "#!/bin/sh\necho \"uv:$*\"\necho \"marker:${UV_RUN_ACTIVE}\"\n",
        );
        for name in ["python", "python3"] {
            write_exec(
                &root.join("pyhome/bin").join(name),
                "#!/bin/sh\necho \"python:$*\"\nexit ${FAKE_PY_EXIT:-0}\n",
            );
        }
        Self { td }
    }

    pub fn root(&self) -> &Path {
        self.td.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.td.path().join(rel)
    }

    pub fn fake_python(&self) -> PathBuf {
        self.path("pyhome/bin/python3")
    }

    /// Link `shims/<name>` to the real shim binary.
    #[cfg(unix)]
    pub fn link_shim(&self, name: &str) -> PathBuf {
        let dir = self.path("shims");
        fs::create_dir_all(&dir).expect("mkdir");
        let link = dir.join(name);
        std::os::unix::fs::symlink(env!("CARGO_BIN_EXE_auto-uv-shim"), &link)
            .expect("symlink");
        link
    }

    /// PATH with the shim first, then the fake interpreter, then (optionally) uv.
    pub fn search_path(&self, with_uv: bool) -> String {
        let mut dirs = vec![self.path("shims"), self.path("pyhome/bin")];
        if with_uv {
            dirs.push(self.path("tools"));
        }
        dirs.iter()
            .map(|d| d.display().to_string())
            .collect::<Vec<_>>()
            .join(":")
    }
}
