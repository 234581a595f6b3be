pub mod config;
pub mod git;
pub mod naming;
pub mod path;
pub mod pr;
pub mod shell_exec;
pub mod styling;

// Re-export the types most callers reach for
pub use git::{GitError, Repository, Worktree, WorktreeRef};
pub use naming::{NameGenerator, PrNameGenerator, SlugifyOptions, slugify};
pub use pr::{Matcher, PullRequest, WorktreeMatch};
