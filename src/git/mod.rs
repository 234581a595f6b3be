//! Git repository state: commits, branches, tags and worktrees
//!
//! Every query re-reads the repository through the `git` binary; nothing is
//! cached between calls.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};

// Submodules
mod error;
mod parse;
mod repository;


// Re-exports from submodules
pub use error::GitError;
pub use parse::{parse_timestamp, parse_track_info, split_blocks};
pub use repository::{
    BRANCH_FORMAT, COMMIT_FORMAT, REMOTE_BRANCH_FORMAT, Repository, TAG_FORMAT, resolve_worktrees,
    sort_by_path,
};

/// A commit as seen through a branch tip, tag target or detached HEAD.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Commit {
    /// Short or full object name, as reported by git
    pub sha: String,
    /// First line of the message
    pub subject: String,
    pub committed_by: String,
    /// `None` when git reported nothing parseable
    pub committed_on: Option<DateTime<FixedOffset>>,
}

/// A local branch together with its tip commit and upstream tracking state.
///
/// `ahead`/`behind` are both zero when there is no upstream or the upstream is gone.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct LocalBranch {
    pub name: String,
    /// Short remote-tracking name (`origin/main`), empty when unset
    pub upstream_name: String,
    /// Absolute path of the worktree that has this branch checked out, empty if none
    pub worktree_path: String,
    pub is_checked_out: bool,
    pub ahead: usize,
    pub behind: usize,
    pub commit: Commit,
}

impl LocalBranch {
    pub fn has_upstream(&self) -> bool {
        !self.upstream_name.is_empty()
    }
}

/// A remote-tracking branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct RemoteBranch {
    /// Name without the remote prefix; may itself contain `/`
    pub name: String,
    pub remote_name: String,
    pub commit: Commit,
}

impl RemoteBranch {
    /// `remote/name`, e.g. `origin/feature/x`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.remote_name, self.name)
    }
}

/// A tag; `commit` is always the dereferenced target commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Tag {
    pub name: String,
    /// Empty for lightweight tags
    pub message: String,
    pub tagger_name: String,
    pub tagger_email: String,
    pub tagged_on: Option<DateTime<FixedOffset>>,
    pub commit: Commit,
}

impl Tag {
    pub fn is_annotated(&self) -> bool {
        !self.tagger_name.is_empty()
            || !self.tagger_email.is_empty()
            || self.tagged_on.is_some()
            || !self.message.is_empty()
    }

    /// When the tag was made, falling back to the target commit's date.
    pub fn date(&self) -> Option<DateTime<FixedOffset>> {
        self.tagged_on.or(self.commit.committed_on)
    }
}

/// The three things a worktree's HEAD can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum RefType {
    Commit,
    Branch,
    Tag,
}

/// What a non-bare worktree has checked out.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorktreeRef {
    /// Detached at a commit that no tag points to
    Commit(Commit),
    /// On a branch
    Branch(LocalBranch),
    /// Detached at the target commit of a known tag
    Tag(Tag),
}

impl WorktreeRef {
    pub fn ref_type(&self) -> RefType {
        match self {
            WorktreeRef::Commit(_) => RefType::Commit,
            WorktreeRef::Branch(_) => RefType::Branch,
            WorktreeRef::Tag(_) => RefType::Tag,
        }
    }

    /// The commit HEAD points at, whichever variant this is.
    pub fn commit(&self) -> &Commit {
        match self {
            WorktreeRef::Commit(commit) => commit,
            WorktreeRef::Branch(branch) => &branch.commit,
            WorktreeRef::Tag(tag) => &tag.commit,
        }
    }

    pub fn branch(&self) -> Option<&LocalBranch> {
        match self {
            WorktreeRef::Branch(branch) => Some(branch),
            _ => None,
        }
    }

    pub fn tag(&self) -> Option<&Tag> {
        match self {
            WorktreeRef::Tag(tag) => Some(tag),
            _ => None,
        }
    }
}

/// A worktree of the repository.
///
/// Bare entries carry only a path (`reference` is `None`).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Worktree {
    pub path: PathBuf,
    #[serde(rename = "ref")]
    pub reference: Option<WorktreeRef>,
}

impl Worktree {
    pub fn is_bare(&self) -> bool {
        self.reference.is_none()
    }

    /// Branch name when the worktree is on a branch.
    pub fn branch_name(&self) -> Option<&str> {
        self.reference
            .as_ref()
            .and_then(WorktreeRef::branch)
            .map(|b| b.name.as_str())
    }
}
