//! Decoders for git's block-structured listings.
//!
//! All listings share one shape: one `key value` pair per line, records
//! separated by blank lines. Decoding is lenient. Missing lines leave the
//! field at its default, unknown keys are skipped, and malformed timestamps
//! or track info degrade to `None` / `(0, 0)` instead of failing the record.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use once_cell::sync::Lazy;
use regex::Regex;

use super::{Commit, LocalBranch, RemoteBranch, Tag};

static TRACK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(?:ahead (\d+))?(?:, )?(?:behind (\d+))?\]$").expect("valid track regex")
});

/// Split raw output into blank-line separated blocks of non-empty lines.
///
/// Leading, trailing and repeated blank lines never produce empty blocks, so
/// empty or all-blank input yields no blocks at all.
pub fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }

    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

/// Decode `%(upstream:track)` into `(ahead, behind)`.
///
/// `[gone]`, an empty string and anything unrecognised all read as `(0, 0)`.
pub fn parse_track_info(track: &str) -> (usize, usize) {
    let Some(caps) = TRACK_RE.captures(track.trim()) else {
        return (0, 0);
    };

    let count = |i: usize| {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    (count(1), count(2))
}

/// Parse a strict ISO 8601 timestamp with offset (`%(committerdate:iso-strict)`).
///
/// Returns `None` when the value is missing or malformed; `None` means
/// "unknown", never the epoch.
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(value).ok()
}

/// Split a line into key and value at the first space.
///
/// Flag lines such as `detached` have an empty value.
fn key_value(line: &str) -> (&str, &str) {
    line.split_once(' ').unwrap_or((line, ""))
}

pub(crate) fn parse_branch_block(lines: &[&str]) -> LocalBranch {
    let mut branch = LocalBranch::default();
    let mut track = "";

    for line in lines {
        match key_value(line) {
            ("branch", v) => branch.name = v.to_string(),
            ("checkedOut", v) => branch.is_checked_out = v == "true",
            ("commit", v) => branch.commit.sha = v.to_string(),
            ("upstream", v) => branch.upstream_name = v.to_string(),
            ("track", v) => track = v,
            ("committedOn", v) => branch.commit.committed_on = parse_timestamp(v),
            ("committedBy", v) => branch.commit.committed_by = v.to_string(),
            ("subject", v) => branch.commit.subject = v.to_string(),
            ("worktreepath", v) => branch.worktree_path = v.to_string(),
            _ => {}
        }
    }

    if branch.has_upstream() {
        (branch.ahead, branch.behind) = parse_track_info(track);
    }

    branch
}

pub(crate) fn parse_remote_branch_block(lines: &[&str]) -> RemoteBranch {
    let mut remote = RemoteBranch::default();

    for line in lines {
        match key_value(line) {
            ("ref", v) => {
                // Only the first slash separates the remote; branch names may contain more
                let (remote_name, name) = v.split_once('/').unwrap_or((v, ""));
                remote.remote_name = remote_name.to_string();
                remote.name = name.to_string();
            }
            ("commit", v) => remote.commit.sha = v.to_string(),
            ("committedOn", v) => remote.commit.committed_on = parse_timestamp(v),
            ("committedBy", v) => remote.commit.committed_by = v.to_string(),
            ("subject", v) => remote.commit.subject = v.to_string(),
            _ => {}
        }
    }

    remote
}

pub(crate) fn parse_tag_block(lines: &[&str]) -> Tag {
    let mut name = "";
    let mut object_type = "";
    let mut object_sha = "";
    let mut deref_sha = "";
    let mut tagger_name = "";
    let mut tagger_email = "";
    let mut tagged_on = "";
    let mut message = "";
    let mut committed_by = "";
    let mut committed_on = "";
    let mut commit_subject = "";

    for line in lines {
        match key_value(line) {
            ("name", v) => name = v,
            ("objecttype", v) => object_type = v,
            ("objectsha", v) => object_sha = v,
            ("derefsha", v) => deref_sha = v,
            ("taggername", v) => tagger_name = v,
            ("taggeremail", v) => tagger_email = v,
            ("taggedon", v) => tagged_on = v,
            ("message", v) => message = v,
            ("committedby", v) => committed_by = v,
            ("committedon", v) => committed_on = v,
            ("commitsubject", v) => commit_subject = v,
            _ => {}
        }
    }

    let mut tag = Tag {
        name: name.to_string(),
        commit: Commit {
            sha: object_sha.to_string(),
            subject: commit_subject.to_string(),
            committed_by: committed_by.to_string(),
            committed_on: parse_timestamp(committed_on),
        },
        ..Tag::default()
    };

    // An annotated tag points at a tag object; the commit lives behind it
    if object_type == "tag" {
        tag.commit.sha = deref_sha.to_string();
        tag.message = message.to_string();
        tag.tagger_name = tagger_name.to_string();
        tag.tagger_email = tagger_email.to_string();
        tag.tagged_on = parse_timestamp(tagged_on);
    }

    tag
}

/// Whether a tag record's one-level dereference is itself a tag object.
pub(crate) fn targets_tag(lines: &[&str]) -> bool {
    lines
        .iter()
        .any(|line| key_value(line) == ("derefobjecttype", "tag"))
}

pub(crate) fn parse_commit_block(lines: &[&str]) -> Commit {
    let mut commit = Commit::default();

    for line in lines {
        match key_value(line) {
            ("commit", v) => commit.sha = v.to_string(),
            ("committedOn", v) => commit.committed_on = parse_timestamp(v),
            ("committedBy", v) => commit.committed_by = v.to_string(),
            ("subject", v) => commit.subject = v.to_string(),
            _ => {}
        }
    }

    commit
}

/// One record of `git worktree list --porcelain`, before references are resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct WorktreeEntry {
    pub path: PathBuf,
    pub branch: Option<String>,
    pub head: Option<String>,
    pub detached: bool,
    pub bare: bool,
}

pub(crate) fn parse_worktree_block(lines: &[&str]) -> WorktreeEntry {
    let mut entry = WorktreeEntry::default();

    for line in lines {
        match key_value(line) {
            ("worktree", v) => entry.path = PathBuf::from(v),
            ("HEAD", v) => entry.head = Some(v.to_string()).filter(|s| !s.is_empty()),
            ("branch", v) => {
                let name = v.strip_prefix("refs/heads/").unwrap_or(v);
                entry.branch = Some(name.to_string()).filter(|s| !s.is_empty());
            }
            ("detached", _) => entry.detached = true,
            ("bare", _) => entry.bare = true,
            _ => {}
        }
    }

    entry
}
