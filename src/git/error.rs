//! Error types for git invocation and repository-state assembly
//!
//! **`GitError`** is a typed enum that can be pattern-matched and tested. Use
//! `.into()` to convert to `anyhow::Error` while preserving the type for
//! downcasting. Display produces styled output for users.
//!
//! Lenient-decode conditions (bad timestamps, malformed track info, unknown
//! lines) are deliberately absent: the parsers degrade those to defaults and
//! never raise.

use std::path::PathBuf;
use std::time::Duration;

use color_print::{cformat, cwrite};

use crate::path::format_path_for_display;
use crate::styling::{ERROR_EMOJI, HINT_EMOJI, INFO_EMOJI, format_with_gutter};

/// Domain errors for external tool invocation and worktree resolution.
///
/// # Usage
///
/// ```ignore
/// // Pattern match on errors
/// if let Some(GitError::CommandTimedOut { command, .. }) = err.downcast_ref() {
///     println!("{command} took too long");
/// }
/// ```
#[derive(Debug, Clone)]
pub enum GitError {
    // Invocation errors
    ToolNotFound {
        tool: String,
    },
    CommandFailed {
        command: String,
        error: String,
    },
    CommandTimedOut {
        command: String,
        timeout: Duration,
    },

    // Structural inconsistency between branch and worktree listings
    WorktreeBranchNotFound {
        branch: String,
        path: PathBuf,
    },

    ParseError {
        message: String,
    },
}

impl std::error::Error for GitError {}

impl std::fmt::Display for GitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitError::ToolNotFound { tool } => {
                cwrite!(
                    f,
                    "{ERROR_EMOJI} <red>Could not run <bold>{tool}</>: executable not found</>\n\n{HINT_EMOJI} <dim>Make sure {tool} is installed and on PATH</>"
                )
            }

            GitError::CommandFailed { command, error } => {
                let header = cformat!("{ERROR_EMOJI} <red>Command failed</>");
                let error_block = format_error_block(header, error);
                write!(
                    f,
                    "{}\n\n{INFO_EMOJI} Ran command:\n{}",
                    error_block.trim_end(),
                    format_with_gutter(command).trim_end()
                )
            }

            GitError::CommandTimedOut { command, timeout } => {
                let secs = format!("{:.1}", timeout.as_secs_f64());
                cwrite!(
                    f,
                    "{ERROR_EMOJI} <red>Command timed out after {secs}s: <bold>{command}</></>"
                )
            }

            GitError::WorktreeBranchNotFound { branch, path } => {
                let path_display = format_path_for_display(path);
                cwrite!(
                    f,
                    "{ERROR_EMOJI} <red>Branch <bold>{branch}</> referenced by the worktree at <bold>{path_display}</> was not found among local branches</>\n\n{HINT_EMOJI} <dim>If <bold>{branch}</> has no commits yet, commit to it first; otherwise the repository changed while it was being read and the command can be run again</>"
                )
            }

            GitError::ParseError { message } => {
                cwrite!(f, "{ERROR_EMOJI} <red>{message}</>")
            }
        }
    }
}

/// Format an error with header and gutter content
fn format_error_block(header: String, error: &str) -> String {
    let trimmed = error.trim();
    if trimmed.is_empty() {
        header
    } else {
        format!("{header}\n{}", format_with_gutter(trimmed))
    }
}
