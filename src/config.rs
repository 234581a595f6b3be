use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::git::Repository;
use crate::naming::{DEFAULT_BRANCH_TEMPLATE, NameGenerator, PrNameGenerator, SlugifyOptions, TemplateError};

/// Naming and invocation settings.
///
/// # Examples
///
/// ```toml
/// branch-prefix = "alex/"
/// worktree-prefix = "wt-"
/// strip-prefixes = ["alex/", "feature/"]
/// command-timeout = 30
///
/// [slug]
/// max-length = 40
/// hash-length = 6
///
/// [pr]
/// branch-template = "pr/{{.Number}}"
/// worktree-prefix = "pr-"
/// ```
///
/// Config file location:
/// - Linux: `~/.config/treeline/config.toml`
/// - macOS: `~/Library/Application Support/treeline/config.toml`
/// - Windows: `%APPDATA%\treeline\config.toml`
///
/// Environment variables: `TREELINE_COMMAND_TIMEOUT`, `TREELINE_PR__BRANCH_TEMPLATE`, ...
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TreelineConfig {
    pub branch_prefix: String,
    pub worktree_prefix: String,
    pub strip_prefixes: Vec<String>,
    /// Seconds before a git invocation is killed
    pub command_timeout: u64,
    pub slug: SlugifyOptions,
    pub pr: PrConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PrConfig {
    pub branch_template: String,
    pub worktree_prefix: String,
}

impl Default for TreelineConfig {
    fn default() -> Self {
        Self {
            branch_prefix: String::new(),
            worktree_prefix: String::new(),
            strip_prefixes: Vec::new(),
            command_timeout: crate::shell_exec::DEFAULT_TIMEOUT.as_secs(),
            slug: SlugifyOptions::default(),
            pr: PrConfig::default(),
        }
    }
}

impl Default for PrConfig {
    fn default() -> Self {
        Self {
            branch_template: DEFAULT_BRANCH_TEMPLATE.to_string(),
            worktree_prefix: "pr-".to_string(),
        }
    }
}

impl TreelineConfig {
    /// Load configuration from the user config file and environment variables.
    ///
    /// Later sources override earlier ones:
    /// 1. Default values
    /// 2. User config file (`<config dir>/treeline/config.toml`)
    /// 3. Environment variables (`TREELINE_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Like [`load`](Self::load), with `path` layered between the user file and the environment.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut files = Vec::new();
        if let Some(user_path) = get_config_path()
            && user_path.exists()
        {
            files.push(user_path);
        }
        if let Some(path) = path {
            files.push(path.to_path_buf());
        }

        Self::build(&files, env_source())
    }

    fn build(files: &[PathBuf], env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        for file in files {
            log::debug!("Reading config from {}", file.display());
            builder = builder.add_source(File::from(file.as_path()));
        }
        builder = builder.add_source(env);

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.command_timeout == 0 {
            return Err(ConfigError::Message(
                "command-timeout must be greater than 0".to_string(),
            ));
        }
        self.pr_name_generator()
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(())
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout)
    }

    pub fn name_generator(&self) -> NameGenerator {
        NameGenerator {
            branch_prefix: self.branch_prefix.clone(),
            worktree_prefix: self.worktree_prefix.clone(),
            strip_prefixes: self.strip_prefixes.clone(),
            slug: self.slug.clone(),
        }
    }

    pub fn pr_name_generator(&self) -> Result<PrNameGenerator, TemplateError> {
        PrNameGenerator::new(
            &self.pr.branch_template,
            self.pr.worktree_prefix.clone(),
            self.slug.clone(),
        )
    }

    /// A repository handle at `path` using the configured timeout.
    pub fn repository(&self, path: impl Into<PathBuf>) -> Repository {
        Repository::at(path).with_timeout(self.command_timeout())
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("TREELINE")
        .prefix_separator("_")
        .separator("__")
        .convert_case(config::Case::Kebab)
        .try_parsing(true)
}

fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("treeline").join("config.toml"))
}
