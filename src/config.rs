//! Project configuration
//!
//! Groups, ignore conditions and advisories are read from a TOML file
//! (`depgroup.toml` by default). Command line flags override file values.

use crate::cli::{parse_duration, CliArgs};
use crate::domain::{normalize_directory, DependencyGroup, PackageManager, UpdateType};
use crate::error::ConfigError;
use crate::update::{IgnoreCondition, SecurityAdvisory};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name, looked up in the project directory
pub const CONFIG_FILE_NAME: &str = "depgroup.toml";

/// Contents of the configuration file
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RunConfig {
    pub package_manager: PackageManager,
    #[serde(default = "default_directory")]
    pub directory: String,
    /// Minimum release age (e.g. `7d`)
    #[serde(default)]
    pub cooldown: Option<String>,
    #[serde(default)]
    pub validate_provenance: bool,
    #[serde(default)]
    pub use_workspace: bool,
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
    #[serde(default)]
    pub ignore: Vec<IgnoreCondition>,
    #[serde(default)]
    pub security_advisories: Vec<SecurityAdvisory>,
}

/// One `[[groups]]` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct GroupConfig {
    pub name: String,
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub update_types: Option<Vec<UpdateType>>,
}

impl GroupConfig {
    fn to_group(&self) -> DependencyGroup {
        let group = DependencyGroup::new(self.name.clone(), self.dependencies.clone());
        match self.update_types {
            Some(ref types) => group.with_update_types(types.clone()),
            None => group,
        }
    }
}

fn default_directory() -> String {
    "/".to_string()
}

impl RunConfig {
    /// Read and validate the configuration file at `path`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse configuration text; `path` is used in error messages
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for group in &self.groups {
            if !seen.insert(group.name.as_str()) {
                return Err(ConfigError::DuplicateGroup {
                    name: group.name.clone(),
                });
            }
        }
        self.cooldown_duration()?;
        Ok(())
    }

    /// Cooldown parsed into a duration
    pub fn cooldown_duration(&self) -> Result<Option<Duration>, ConfigError> {
        self.cooldown
            .as_deref()
            .map(|value| {
                parse_duration(value).map_err(|_| ConfigError::InvalidDuration {
                    value: value.to_string(),
                })
            })
            .transpose()
    }

    /// Every configured group, in file order
    pub fn groups(&self) -> Vec<DependencyGroup> {
        self.groups.iter().map(GroupConfig::to_group).collect()
    }

    /// Configured groups restricted to `names`; all groups when empty
    pub fn select_groups(&self, names: &[String]) -> Result<Vec<DependencyGroup>, ConfigError> {
        if names.is_empty() {
            return Ok(self.groups());
        }
        if let Some(unknown) = names
            .iter()
            .find(|name| !self.groups.iter().any(|g| &g.name == *name))
        {
            return Err(ConfigError::UnknownGroup {
                name: unknown.clone(),
            });
        }
        Ok(self
            .groups
            .iter()
            .filter(|g| names.contains(&g.name))
            .map(GroupConfig::to_group)
            .collect())
    }
}

/// Effective settings for one run: configuration file plus CLI overrides
#[derive(Debug, Clone)]
pub struct Settings {
    /// Project root on disk
    pub root: PathBuf,
    pub package_manager: PackageManager,
    /// Directory within the project, rooted at `/`
    pub directory: String,
    pub groups: Vec<DependencyGroup>,
    pub ignore_conditions: Vec<IgnoreCondition>,
    pub security_advisories: Vec<SecurityAdvisory>,
    pub cooldown: Option<Duration>,
    pub timeout: Option<Duration>,
    pub validate_provenance: bool,
    pub use_workspace: bool,
    pub dry_run: bool,
}

impl Settings {
    /// Combine `config` with command line overrides
    pub fn resolve(args: &CliArgs, config: RunConfig) -> Result<Self, ConfigError> {
        if args.quiet && args.verbose {
            return Err(ConfigError::ConflictingOptions {
                message: "--quiet and --verbose cannot be used together".to_string(),
            });
        }
        if !args.path.is_dir() {
            return Err(ConfigError::InvalidPath {
                path: args.path.clone(),
                message: "not a directory".to_string(),
            });
        }

        let cooldown = match args.cooldown {
            Some(cooldown) => Some(cooldown),
            None => config.cooldown_duration()?,
        };

        Ok(Self {
            root: args.path.clone(),
            package_manager: config.package_manager,
            directory: normalize_directory(&config.directory),
            groups: config.select_groups(&args.groups)?,
            ignore_conditions: config.ignore,
            security_advisories: config.security_advisories,
            cooldown,
            timeout: args.timeout,
            validate_provenance: args.validate_provenance || config.validate_provenance,
            use_workspace: args.workspace || config.use_workspace,
            dry_run: args.dry_run,
        })
    }

    /// Cooldown as a chrono duration for release-age comparisons
    pub fn cooldown_chrono(&self) -> Option<chrono::Duration> {
        self.cooldown
            .and_then(|cooldown| chrono::Duration::from_std(cooldown).ok())
    }
}
