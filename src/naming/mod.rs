//! Deterministic branch and worktree naming
//!
//! Names are built from a slug of free text (or of an existing branch) plus a
//! configured prefix. An empty return value means the input slugged to
//! nothing and is not a usable name; callers must check for it.

mod slug;
mod template;

pub use slug::{SlugifyOptions, slugify};
pub use template::{DEFAULT_BRANCH_TEMPLATE, PrNameGenerator, TemplateError, validate_branch_name};

/// Branch name for a free-text phrase: `prefix + slug(phrase)`.
///
/// Returns an empty string when the phrase slugs to nothing.
///
/// # Examples
/// ```
/// use treeline::naming::{SlugifyOptions, branch_name};
///
/// let opts = SlugifyOptions::default();
/// assert_eq!(branch_name("feature/", "Add OAuth login", &opts), "feature/add-oauth-login");
/// assert_eq!(branch_name("feature/", "???", &opts), "");
/// ```
pub fn branch_name(prefix: &str, phrase: &str, opts: &SlugifyOptions) -> String {
    let slug = slugify(phrase, opts);
    if slug.is_empty() {
        return String::new();
    }
    format!("{prefix}{slug}")
}

/// Worktree name for an existing branch.
///
/// The first of `strip_prefixes` (in list order, not the longest) that the
/// branch starts with is removed, the rest is slugged and `prefix` prepended.
/// A branch equal to a strip prefix leaves nothing and yields an empty string.
pub fn worktree_name_from_branch(
    branch: &str,
    strip_prefixes: &[String],
    prefix: &str,
    opts: &SlugifyOptions,
) -> String {
    let remainder = strip_prefixes
        .iter()
        .find_map(|p| branch.strip_prefix(p.as_str()))
        .unwrap_or(branch);

    let slug = slugify(remainder, opts);
    if slug.is_empty() {
        return String::new();
    }
    format!("{prefix}{slug}")
}

/// Prefix and slug settings bundled for phrase- and branch-driven names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameGenerator {
    pub branch_prefix: String,
    pub worktree_prefix: String,
    pub strip_prefixes: Vec<String>,
    pub slug: SlugifyOptions,
}

impl NameGenerator {
    pub fn branch_name(&self, phrase: &str) -> String {
        branch_name(&self.branch_prefix, phrase, &self.slug)
    }

    pub fn worktree_name(&self, branch: &str) -> String {
        worktree_name_from_branch(branch, &self.strip_prefixes, &self.worktree_prefix, &self.slug)
    }
}
