#![allow(clippy::module_name_repetitions)]
//! Decision pipeline: guard → locator → launcher → replacement.

use std::fmt;
use std::path::PathBuf;

use tracing::instrument;

use crate::config::Policy;
use crate::context::InvocationContext;
use crate::guard::{rejection, RejectReason};
use crate::launcher::{resolve_launcher, LauncherCandidate, Platform};
use crate::locator::{locate_for, SearchDecision};
use crate::replace::{replace_process, ReplacementPlan};

/// Terminal state reached for one invocation (REPLACE_FAILED is only observable
/// as the exit status of [`replace_process`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    GuardRejected(RejectReason),
    ProjectNotFound { levels: usize },
    LauncherNotFound { project_root: PathBuf },
    Replace {
        project_root: PathBuf,
        launcher: LauncherCandidate,
        plan: ReplacementPlan,
    },
}

impl Outcome {
    /// Stable, machine-readable state name.
    pub fn state(&self) -> &'static str {
        match self {
            Outcome::GuardRejected(_) => "guard-rejected",
            Outcome::ProjectNotFound { .. } => "project-not-found",
            Outcome::LauncherNotFound { .. } => "launcher-not-found",
            Outcome::Replace { .. } => "replace",
        }
    }

    pub fn will_replace(&self) -> bool {
        matches!(self, Outcome::Replace { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::GuardRejected(reason) => write!(f, "{} ({reason})", self.state()),
            Outcome::ProjectNotFound { levels } => {
                write!(f, "{} (checked {levels} directories)", self.state())
            }
            Outcome::LauncherNotFound { project_root } => {
                write!(f, "{} (project {})", self.state(), project_root.display())
            }
            Outcome::Replace { launcher, .. } => {
                write!(f, "{} (via {})", self.state(), launcher.path().display())
            }
        }
    }
}

/// Evaluate the state machine for `ctx`. Only read-only filesystem probing.
#[instrument(level = "debug", skip_all, fields(state))]
pub fn decide(ctx: &InvocationContext, policy: &Policy, platform: Platform) -> Outcome {
    let outcome = evaluate(ctx, policy, platform);
    tracing::Span::current().record("state", outcome.state());
    outcome
}

fn evaluate(ctx: &InvocationContext, policy: &Policy, platform: Platform) -> Outcome {
    if let Some(reason) = rejection(ctx, policy) {
        return Outcome::GuardRejected(reason);
    }
    let project_root = match locate_for(ctx, policy) {
        SearchDecision::Found { root, .. } => root,
        SearchDecision::NotFound { levels } => return Outcome::ProjectNotFound { levels },
    };
    let Some(launcher) = resolve_launcher(platform, ctx, policy) else {
        return Outcome::LauncherNotFound { project_root };
    };
    match ReplacementPlan::for_launcher(&launcher, ctx, policy) {
        Some(plan) => Outcome::Replace {
            project_root,
            launcher,
            plan,
        },
        // The guard already required a script; stay a no-op if that ever changes.
        None => Outcome::GuardRejected(RejectReason::NoScript),
    }
}

/// Run the pipeline for `ctx`. Returns when the original program should run;
/// otherwise the process becomes the launcher and this never returns.
pub fn auto_use_uv_with(ctx: &InvocationContext) -> Outcome {
    let policy = Policy::from_context(ctx);
    let outcome = decide(ctx, &policy, Platform::current());
    if let Outcome::Replace { launcher, .. } = &outcome {
        replace_process(launcher, ctx, &policy);
    }
    outcome
}

/// Zero-argument startup hook for hosts embedding auto-uv: snapshots the
/// running process and runs [`auto_use_uv_with`].
pub fn auto_use_uv() {
    let ctx = InvocationContext::capture(None);
    let _ = auto_use_uv_with(&ctx);
}
