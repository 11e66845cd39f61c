/*!
Shim installer: links interpreter names to the `auto-uv-shim` binary.

Putting the target directory ahead of the real interpreter on `PATH` makes
every `python script.py` pass through the decision pipeline first.
*/
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Interpreter names linked when none are given.
const DEFAULT_SHIM_NAMES: &[&str] = &["python", "python3"];

pub fn default_shim_names() -> &'static [&'static str] {
    DEFAULT_SHIM_NAMES
}

/// The shim binary shipped next to the running `auto-uv` executable.
pub fn shim_binary_path() -> io::Result<PathBuf> {
    let exe = env::current_exe()?;
    let dir = exe.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "cannot locate auto-uv install directory")
    })?;
    let shim = dir.join(format!("auto-uv-shim{}", env::consts::EXE_SUFFIX));
    if !shim.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("auto-uv-shim not found next to auto-uv ({})", shim.display()),
        ));
    }
    Ok(shim)
}

/// Create `dir` and symlink each name in `names` to `shim`.
///
/// Existing entries are only replaced when `force` is set.
pub fn install_shims(
    dir: &Path,
    shim: &Path,
    names: &[String],
    force: bool,
) -> io::Result<Vec<PathBuf>> {
    for name in names {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid shim name '{name}'"),
            ));
        }
    }
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(names.len());
    for name in names {
        let link = dir.join(name);
        if fs::symlink_metadata(&link).is_ok() {
            if !force {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} already exists (use --force to replace)", link.display()),
                ));
            }
            fs::remove_file(&link)?;
        }
        link_shim(shim, &link)?;
        written.push(link);
    }
    Ok(written)
}

#[cfg(unix)]
fn link_shim(shim: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(shim, link)
}

#[cfg(not(unix))]
fn link_shim(_shim: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "shim installation requires symlinks (Unix only)",
    ))
}
