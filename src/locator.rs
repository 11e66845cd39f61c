#![allow(clippy::module_name_repetitions)]
//! Project locator: bounded walk up the directory ancestry looking for uv project markers.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::instrument;

use crate::config::Policy;
use crate::context::InvocationContext;
use crate::util::fs::absolutize;

/// Files and directories whose presence marks a project root, in probe order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProjectMarker {
    Manifest,
    LockFile,
    EnvironmentDir,
}

pub const PROJECT_MARKERS: &[ProjectMarker] = &[
    ProjectMarker::Manifest,
    ProjectMarker::LockFile,
    ProjectMarker::EnvironmentDir,
];

impl ProjectMarker {
    pub fn file_name(self) -> &'static str {
        match self {
            ProjectMarker::Manifest => "pyproject.toml",
            ProjectMarker::LockFile => "uv.lock",
            ProjectMarker::EnvironmentDir => ".venv",
        }
    }

    /// Follows symlinks. Any metadata error counts as absent.
    pub fn present_in(self, dir: &Path) -> bool {
        match fs::metadata(dir.join(self.file_name())) {
            Ok(meta) => match self {
                ProjectMarker::Manifest | ProjectMarker::LockFile => meta.is_file(),
                ProjectMarker::EnvironmentDir => meta.is_dir(),
            },
            Err(_) => false,
        }
    }
}

/// Outcome of one ancestry walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchDecision {
    Found {
        root: PathBuf,
        depth: usize,
        marker: ProjectMarker,
    },
    /// `levels` directories were checked without a match.
    NotFound { levels: usize },
}

impl SearchDecision {
    pub fn root(&self) -> Option<&Path> {
        match self {
            SearchDecision::Found { root, .. } => Some(root),
            SearchDecision::NotFound { .. } => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SearchDecision::Found { .. })
    }
}

/// Walk from `start_dir` towards the filesystem root.
///
/// Depth 0 is `start_dir` itself; at most `max_ascent` ascents are made, so at
/// most `max_ascent + 1` directories are checked. Parents are taken lexically
/// from the (absolute) start path, never from resolved symlinks.
#[instrument(level = "debug", skip(start_dir), fields(start = %start_dir.display()), ret)]
pub fn find_project_root(start_dir: &Path, max_ascent: usize) -> SearchDecision {
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut current: Option<&Path> = Some(start_dir);
    let mut levels = 0usize;

    while let Some(dir) = current {
        if levels > max_ascent || !visited.insert(dir.to_path_buf()) {
            break;
        }
        levels += 1;
        if let Some(marker) = PROJECT_MARKERS.iter().copied().find(|m| m.present_in(dir)) {
            return SearchDecision::Found {
                root: dir.to_path_buf(),
                depth: levels - 1,
                marker,
            };
        }
        current = dir.parent().filter(|p| !p.as_os_str().is_empty());
    }

    SearchDecision::NotFound { levels }
}

/// Search from the script's directory first, then from the working directory.
pub fn locate_for(ctx: &InvocationContext, policy: &Policy) -> SearchDecision {
    let mut last = SearchDecision::NotFound { levels: 0 };
    let mut origins: Vec<PathBuf> = Vec::new();
    if let Some(dir) = ctx.script().and_then(Path::parent) {
        origins.push(dir.to_path_buf());
    }
    if ctx.cwd().is_absolute() {
        let cwd = absolutize(ctx.cwd(), ctx.cwd());
        if !origins.contains(&cwd) {
            origins.push(cwd);
        }
    }
    for origin in origins {
        let decision = find_project_root(&origin, policy.max_ascent);
        if decision.is_found() {
            return decision;
        }
        last = decision;
    }
    last
}
