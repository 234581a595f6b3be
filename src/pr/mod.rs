//! Pull-request records and their correlation with local worktrees
//!
//! Records come from the code host's CLI (`gh pr list --json ...`); this
//! module only decodes and matches them, it never talks to the host.

mod matcher;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use matcher::{Matcher, WorktreeMatch};

/// Fields to request from `gh pr list --json` so [`parse_pr_list`] can decode them.
pub const PR_JSON_FIELDS: &str = "number,headRefName,author,state,createdAt,updatedAt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "lowercase")]
pub enum PrState {
    Open,
    Closed,
    Merged,
}

/// A pull request as reported by the code host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    /// Head branch on the remote
    #[serde(rename = "headRefName")]
    pub branch_name: String,
    #[serde(deserialize_with = "author_login", default)]
    pub author: String,
    pub state: PrState,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The values a branch-name template can see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrTemplateData {
    #[serde(rename = "BranchName")]
    pub branch_name: String,
    #[serde(rename = "Number")]
    pub number: u64,
}

impl From<&PullRequest> for PrTemplateData {
    fn from(pr: &PullRequest) -> Self {
        Self {
            branch_name: pr.branch_name.clone(),
            number: pr.number,
        }
    }
}

/// `gh` reports the author as `{"login": "..."}`; older tooling as a bare string.
fn author_login<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Author {
        Login { login: String },
        Name(String),
    }

    Ok(match Author::deserialize(deserializer)? {
        Author::Login { login } => login,
        Author::Name(name) => name,
    })
}

/// Decode a JSON array of pull requests (see [`PR_JSON_FIELDS`]).
pub fn parse_pr_list(json: &[u8]) -> anyhow::Result<Vec<PullRequest>> {
    serde_json::from_slice(json).context("Failed to parse pull request list")
}
