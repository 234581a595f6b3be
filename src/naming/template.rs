//! Branch and worktree names for pull requests, rendered from a user template.
//!
//! Templates use Jinja syntax via minijinja and see exactly two variables,
//! `BranchName` and `Number`. Go-style references with a leading dot
//! (`{{.Number}}`) are accepted and normalised before parsing. Undefined
//! variables are errors, so a typo fails when the generator is built rather
//! than rendering an empty string for every pull request.

use minijinja::{Environment, UndefinedBehavior};
use once_cell::sync::Lazy;
use regex::Regex;

use color_print::cwrite;

use super::slug::{SlugifyOptions, slugify};
use crate::pr::{PrTemplateData, PullRequest};
use crate::styling::{ERROR_EMOJI, HINT_EMOJI};

/// Template used when none is configured: check out the PR under its own branch name.
pub const DEFAULT_BRANCH_TEMPLATE: &str = "{{ BranchName }}";

/// The only names a branch template may reference.
const TEMPLATE_VARIABLES: [&str; 2] = ["BranchName", "Number"];

static LEADING_DOT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\{\{-?|\{%-?)\s*\.([A-Za-z_])").expect("valid regex"));

/// Why a pull-request template was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    Syntax {
        template: String,
        error: String,
    },
    Render {
        template: String,
        error: String,
    },
    InvalidBranchName {
        template: String,
        rendered: String,
        reason: &'static str,
    },
}

impl std::error::Error for TemplateError {}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::Syntax { template, error } => {
                cwrite!(
                    f,
                    "{ERROR_EMOJI} <red>Invalid branch template <bold>{template}</>: {error}</>"
                )
            }
            TemplateError::Render { template, error } => {
                cwrite!(
                    f,
                    "{ERROR_EMOJI} <red>Branch template <bold>{template}</> failed to render: {error}</>\n\n{HINT_EMOJI} <dim>Available variables: BranchName, Number</>"
                )
            }
            TemplateError::InvalidBranchName {
                template,
                rendered,
                reason,
            } => {
                cwrite!(
                    f,
                    "{ERROR_EMOJI} <red>Branch template <bold>{template}</> produced an invalid branch name <bold>{rendered}</>: {reason}</>"
                )
            }
        }
    }
}

/// Conservative check that `name` could be a git branch name.
///
/// Rejects the empty string, a leading `-`, any `..` and control characters.
/// Everything else is left for git to judge when the branch is created.
pub fn validate_branch_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("branch name is empty");
    }
    if name.starts_with('-') {
        return Err("branch name starts with '-'");
    }
    if name.contains("..") {
        return Err("branch name contains '..'");
    }
    if name.chars().any(char::is_control) {
        return Err("branch name contains control characters");
    }
    Ok(())
}

/// Derives branch and worktree names for pull requests from a template.
///
/// Only constructible from a template that parses, renders against sample
/// data, and yields a plausible branch name.
#[derive(Debug, Clone)]
pub struct PrNameGenerator {
    template: String,
    source: String,
    worktree_prefix: String,
    slug: SlugifyOptions,
}

impl PrNameGenerator {
    /// Validate `template` and build a generator.
    ///
    /// # Examples
    /// ```
    /// use treeline::naming::{PrNameGenerator, SlugifyOptions};
    /// use treeline::pr::PrTemplateData;
    ///
    /// let generator = PrNameGenerator::new("pr/{{.Number}}", "pr-", SlugifyOptions::default()).unwrap();
    /// let data = PrTemplateData { branch_name: "feature/add-auth".into(), number: 123 };
    /// assert_eq!(generator.render(&data).unwrap(), "pr/123");
    /// assert_eq!(generator.worktree_name_for(&data).unwrap(), "pr-123");
    ///
    /// assert!(PrNameGenerator::new("{{ Title }}", "pr-", SlugifyOptions::default()).is_err());
    /// ```
    pub fn new(
        template: &str,
        worktree_prefix: impl Into<String>,
        slug: SlugifyOptions,
    ) -> Result<Self, TemplateError> {
        let generator = Self {
            template: template.to_string(),
            source: normalize_template(template),
            worktree_prefix: worktree_prefix.into(),
            slug,
        };

        let sample = PrTemplateData {
            branch_name: "feature/sample-branch".to_string(),
            number: 123,
        };
        let rendered = generator.render(&sample)?;
        log::debug!("Branch template {template:?} renders sample as {rendered:?}");

        Ok(generator)
    }

    /// The template as configured, before normalisation.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn worktree_prefix(&self) -> &str {
        &self.worktree_prefix
    }

    /// Render the branch name for `data`, rejecting implausible results.
    pub fn render(&self, data: &PrTemplateData) -> Result<String, TemplateError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        let tmpl = env
            .template_from_str(&self.source)
            .map_err(|e| TemplateError::Syntax {
                template: self.template.clone(),
                error: e.to_string(),
            })?;

        // Strict undefined does not cover builtin globals such as `range` or `dict`
        let mut unknown: Vec<String> = tmpl
            .undeclared_variables(false)
            .into_iter()
            .filter(|name| !TEMPLATE_VARIABLES.contains(&name.as_str()))
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            return Err(TemplateError::Render {
                template: self.template.clone(),
                error: format!("unknown variable(s): {}", unknown.join(", ")),
            });
        }

        let rendered = tmpl.render(data).map_err(|e| TemplateError::Render {
            template: self.template.clone(),
            error: e.to_string(),
        })?;

        validate_branch_name(&rendered).map_err(|reason| TemplateError::InvalidBranchName {
            template: self.template.clone(),
            rendered: rendered.clone(),
            reason,
        })?;

        Ok(rendered)
    }

    pub fn branch_name(&self, pr: &PullRequest) -> Result<String, TemplateError> {
        self.render(&PrTemplateData::from(pr))
    }

    /// Worktree name for a pull request.
    ///
    /// The rendered branch is slugged; the worktree prefix is only prepended
    /// when the slug does not already start with it, so `pr/123` under a `pr-`
    /// prefix gives `pr-123`, not `pr-pr-123`. An empty slug gives an empty name.
    pub fn worktree_name(&self, pr: &PullRequest) -> Result<String, TemplateError> {
        self.worktree_name_for(&PrTemplateData::from(pr))
    }

    pub fn worktree_name_for(&self, data: &PrTemplateData) -> Result<String, TemplateError> {
        let branch = self.render(data)?;
        let slug = slugify(&branch, &self.slug);
        if slug.is_empty() {
            return Ok(String::new());
        }
        if slug.starts_with(&self.worktree_prefix) {
            return Ok(slug);
        }
        Ok(format!("{}{}", self.worktree_prefix, slug))
    }
}

/// Rewrite `{{.Field}}` as `{{ Field}}` so Go-style templates parse as Jinja.
fn normalize_template(template: &str) -> String {
    LEADING_DOT_RE.replace_all(template, "$1 $2").into_owned()
}
