use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding normal component. Symlinks are not resolved, so the result names
/// the logical location the user asked for.
pub fn normalize_lexical(p: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in p.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root; on a relative path with
                // nothing left to pop it is kept.
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Join a relative path onto `cwd` and normalize; absolute paths are only normalized.
pub fn absolutize(p: &Path, cwd: &Path) -> PathBuf {
    if p.is_absolute() {
        normalize_lexical(p)
    } else {
        normalize_lexical(&cwd.join(p))
    }
}

/// True when `path` has a parent directory whose last component equals one of `names`.
/// The final component (the file itself) is not considered.
pub fn has_parent_component(path: &Path, names: &[&str]) -> bool {
    let Some(parent) = path.parent() else {
        return false;
    };
    parent.components().any(|c| match c {
        Component::Normal(seg) => names.iter().any(|n| component_eq(seg, n)),
        _ => false,
    })
}

#[cfg(windows)]
fn component_eq(seg: &std::ffi::OsStr, name: &str) -> bool {
    seg.to_str().is_some_and(|s| s.eq_ignore_ascii_case(name))
}

#[cfg(not(windows))]
fn component_eq(seg: &std::ffi::OsStr, name: &str) -> bool {
    seg == name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_dots() {
        assert_eq!(
            normalize_lexical(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
        assert_eq!(normalize_lexical(Path::new("/../x")), PathBuf::from("/x"));
        assert_eq!(normalize_lexical(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize_lexical(Path::new("./")), PathBuf::from("."));
    }

    #[test]
    fn absolutize_joins_cwd() {
        assert_eq!(
            absolutize(Path::new("tools/run.py"), Path::new("/home/u/proj")),
            PathBuf::from("/home/u/proj/tools/run.py")
        );
        assert_eq!(
            absolutize(Path::new("../x.py"), Path::new("/home/u/proj")),
            PathBuf::from("/home/u/x.py")
        );
    }

    #[test]
    fn parent_component_is_whole_segment() {
        assert!(has_parent_component(
            Path::new("/home/u/.venv/bin/tool"),
            &["bin"]
        ));
        assert!(!has_parent_component(
            Path::new("/home/usr/bin-tools/foo"),
            &["bin"]
        ));
        assert!(!has_parent_component(Path::new("/home/u/bin"), &["bin"]));
    }
}
