use std::path::PathBuf;

use serde::Serialize;

use super::PullRequest;
use crate::git::Worktree;
use crate::naming::PrNameGenerator;

/// Whether a pull request already has a local worktree, and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorktreeMatch {
    pub pr: PullRequest,
    pub has_worktree: bool,
    /// Empty when `has_worktree` is false
    pub worktree_path: PathBuf,
}

/// Finds the worktree that belongs to a pull request.
///
/// A worktree on a branch matches when its branch equals either the name the
/// template would give the PR or the PR's head branch as-is. Bare, tag and
/// detached worktrees never match.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a> {
    generator: &'a PrNameGenerator,
}

impl<'a> Matcher<'a> {
    pub fn new(generator: &'a PrNameGenerator) -> Self {
        Self { generator }
    }

    /// First worktree, in the given order, that matches `pr`.
    pub fn find_worktree_for_pr<'w>(
        &self,
        pr: &PullRequest,
        worktrees: &'w [Worktree],
    ) -> Option<&'w Worktree> {
        // A PR whose name does not render only loses the template comparison
        let expected = match self.generator.branch_name(pr) {
            Ok(name) => Some(name),
            Err(e) => {
                log::debug!("No template branch name for PR #{}: {e:?}", pr.number);
                None
            }
        };

        worktrees.iter().find(|wt| {
            let Some(branch) = wt.branch_name() else {
                return false;
            };
            expected.as_deref() == Some(branch) || branch == pr.branch_name
        })
    }

    /// Annotate each pull request with its worktree, if one exists.
    pub fn match_prs(&self, prs: &[PullRequest], worktrees: &[Worktree]) -> Vec<WorktreeMatch> {
        prs.iter()
            .map(|pr| {
                let found = self.find_worktree_for_pr(pr, worktrees);
                WorktreeMatch {
                    pr: pr.clone(),
                    has_worktree: found.is_some(),
                    worktree_path: found.map(|wt| wt.path.clone()).unwrap_or_default(),
                }
            })
            .collect()
    }
}
