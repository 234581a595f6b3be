use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::parse::{
    parse_branch_block, parse_commit_block, parse_remote_branch_block, parse_tag_block,
    parse_worktree_block, split_blocks, targets_tag,
};
use super::{Commit, GitError, LocalBranch, RemoteBranch, Tag, Worktree, WorktreeRef};
use crate::shell_exec::{Cmd, DEFAULT_TIMEOUT};

/// `for-each-ref` format for local branches; one record per branch.
pub const BRANCH_FORMAT: &str = "branch %(refname:short)
checkedOut %(if)%(worktreepath)%(then)true%(else)false%(end)
commit %(objectname)
upstream %(upstream:short)
track %(upstream:track)
committedOn %(committerdate:iso-strict)
committedBy %(committername)
subject %(contents:subject)
worktreepath %(worktreepath)
";

/// `for-each-ref` format for remote-tracking branches.
///
/// `lstrip=2` keeps `origin/HEAD` as-is so the alias can be recognised and dropped.
pub const REMOTE_BRANCH_FORMAT: &str = "ref %(refname:lstrip=2)
commit %(objectname)
committedOn %(committerdate:iso-strict)
committedBy %(committername)
subject %(contents:subject)
";

/// `for-each-ref` format for tags.
///
/// Commit fields pair each direct atom with its `*` dereferenced twin: for a
/// lightweight tag only the direct atom is filled, for an annotated tag only
/// the dereferenced one, so concatenation yields the target commit either way.
/// `*` peels a single level; `derefobjecttype tag` marks a tag of a tag, whose
/// commit has to be looked up separately.
pub const TAG_FORMAT: &str = "name %(refname:short)
objecttype %(objecttype)
objectsha %(objectname)
derefsha %(*objectname)
derefobjecttype %(*objecttype)
taggername %(taggername)
taggeremail %(taggeremail)
taggedon %(taggerdate:iso-strict)
message %(if)%(*objectname)%(then)%(contents:subject)%(end)
committedby %(committername)%(*committername)
committedon %(committerdate:iso-strict)%(*committerdate:iso-strict)
commitsubject %(if)%(*objectname)%(then)%(*contents:subject)%(else)%(contents:subject)%(end)
";

/// `git log` format for a single commit lookup.
pub const COMMIT_FORMAT: &str = "commit %H
committedOn %cI
committedBy %cn
subject %s
";

/// Handle on a repository (or any of its worktrees) driven through the `git` binary.
///
/// Cheap to construct; holds no state besides the working directory and the
/// per-invocation timeout.
#[derive(Debug, Clone)]
pub struct Repository {
    path: PathBuf,
    timeout: Duration,
}

impl Repository {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Repository containing the process's current directory.
    pub fn current() -> Self {
        Self::at(".")
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run git with `args` in this repository and return stdout.
    ///
    /// A nonzero exit becomes [`GitError::CommandFailed`] carrying the command
    /// line and stderr.
    pub fn run_command(&self, args: &[&str]) -> Result<String, GitError> {
        let cmd = Cmd::new("git")
            .args(args)
            .current_dir(&self.path)
            .timeout(self.timeout);
        let command = cmd.display();
        let output = cmd.run()?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command,
                error: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    pub fn list_local_branches(&self) -> Result<Vec<LocalBranch>, GitError> {
        let output = self.for_each_ref(BRANCH_FORMAT, "refs/heads")?;
        Ok(split_blocks(&output)
            .iter()
            .map(|block| parse_branch_block(block))
            .collect())
    }

    /// Remote-tracking branches, without the `<remote>/HEAD` aliases.
    pub fn list_remote_branches(&self) -> Result<Vec<RemoteBranch>, GitError> {
        let output = self.for_each_ref(REMOTE_BRANCH_FORMAT, "refs/remotes")?;
        Ok(split_blocks(&output)
            .iter()
            .map(|block| parse_remote_branch_block(block))
            .filter(|remote| remote.name != "HEAD")
            .collect())
    }

    pub fn list_tags(&self) -> Result<Vec<Tag>, GitError> {
        let output = self.for_each_ref(TAG_FORMAT, "refs/tags")?;
        split_blocks(&output)
            .iter()
            .map(|block| {
                let mut tag = parse_tag_block(block);
                if targets_tag(block) {
                    log::debug!("Tag {} points at another tag; peeling to its commit", tag.name);
                    tag.commit = self.commit(&format!("refs/tags/{}^{{commit}}", tag.name))?;
                }
                Ok(tag)
            })
            .collect()
    }

    /// Look up a single commit by object name.
    pub fn commit(&self, sha: &str) -> Result<Commit, GitError> {
        let format = format!("--format={COMMIT_FORMAT}");
        let output = self.run_command(&["log", "-1", &format, sha, "--"])?;
        let blocks = split_blocks(&output);
        let block = blocks.first().ok_or_else(|| GitError::ParseError {
            message: format!("No commit information returned for {sha}"),
        })?;
        Ok(parse_commit_block(block))
    }

    /// All worktrees, with each HEAD resolved to a branch, tag or bare commit.
    ///
    /// Branches and tags are listed first; the worktree listing is then resolved
    /// against them. Order follows git's listing; use [`sort_by_path`] for a
    /// canonical order.
    pub fn list_worktrees(&self) -> Result<Vec<Worktree>, GitError> {
        let branches = self.list_local_branches()?;
        let tags = self.list_tags()?;
        let porcelain = self.run_command(&["worktree", "list", "--porcelain"])?;
        resolve_worktrees(branches, tags, &porcelain, |sha| self.commit(sha))
    }

    /// Path of the worktree that has `branch` checked out, if any.
    pub fn worktree_for_branch(&self, branch: &str) -> Result<Option<PathBuf>, GitError> {
        Ok(self
            .list_worktrees()?
            .into_iter()
            .find(|wt| wt.branch_name() == Some(branch))
            .map(|wt| wt.path))
    }

    fn for_each_ref(&self, format: &str, pattern: &str) -> Result<String, GitError> {
        let format = format!("--format={format}");
        self.run_command(&["for-each-ref", &format, pattern])
    }
}

/// Resolve porcelain worktree output against branch and tag listings.
///
/// `lookup_commit` is consulted only for detached worktrees whose HEAD is not
/// the target of any tag. A worktree naming a branch missing from `branches`
/// is a [`GitError::WorktreeBranchNotFound`]: the two listings were not a
/// consistent snapshot.
pub fn resolve_worktrees<F>(
    branches: Vec<LocalBranch>,
    tags: Vec<Tag>,
    porcelain: &str,
    mut lookup_commit: F,
) -> Result<Vec<Worktree>, GitError>
where
    F: FnMut(&str) -> Result<Commit, GitError>,
{
    let branch_map: HashMap<String, LocalBranch> = branches
        .into_iter()
        .map(|branch| (branch.name.clone(), branch))
        .collect();

    // Several tags can share a target; the first listed (lowest refname) wins
    let mut tag_map: HashMap<String, Tag> = HashMap::new();
    for tag in tags {
        tag_map.entry(tag.commit.sha.clone()).or_insert(tag);
    }

    let mut worktrees = Vec::new();
    for block in split_blocks(porcelain) {
        let entry = parse_worktree_block(&block);

        if entry.bare {
            worktrees.push(Worktree {
                path: entry.path,
                reference: None,
            });
            continue;
        }

        let reference = if let Some(name) = &entry.branch {
            let branch = branch_map
                .get(name)
                .cloned()
                .ok_or_else(|| GitError::WorktreeBranchNotFound {
                    branch: name.clone(),
                    path: entry.path.clone(),
                })?;
            WorktreeRef::Branch(branch)
        } else if let Some(sha) = &entry.head {
            match tag_map.get(sha) {
                Some(tag) => {
                    log::debug!("Worktree {} is at tag {}", entry.path.display(), tag.name);
                    WorktreeRef::Tag(tag.clone())
                }
                None => WorktreeRef::Commit(lookup_commit(sha)?),
            }
        } else {
            return Err(GitError::ParseError {
                message: format!(
                    "Worktree {} has neither a branch nor a HEAD",
                    entry.path.display()
                ),
            });
        };

        worktrees.push(Worktree {
            path: entry.path,
            reference: Some(reference),
        });
    }

    Ok(worktrees)
}

/// Sort worktrees by path in place.
pub fn sort_by_path(worktrees: &mut [Worktree]) {
    worktrees.sort_by(|a, b| a.path.cmp(&b.path));
}
