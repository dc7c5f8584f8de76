//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: Issues with manifest file parsing and rewriting
//! - RegistryError: Issues with package registry communication
//! - ConfigError: Issues with CLI and project configuration
//! - GroupError: Failures that stop a whole group pass
//!
//! Per-dependency failures (`CheckError`, `BuildError`, `DependencyError`)
//! never leave the group loop; they are routed to an error handler.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::PackageManager;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Package registry related errors
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Group compilation errors
    #[error(transparent)]
    Group(#[from] GroupError),
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("manifest file not found: {path}")]
    NotFound { path: PathBuf },

    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write manifest file
    #[error("failed to write manifest file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error (for package.json)
    #[error("failed to parse JSON in {path}: {message}")]
    JsonParseError { path: PathBuf, message: String },

    /// TOML parsing error (for Cargo.toml)
    #[error("failed to parse TOML in {path}: {message}")]
    TomlParseError { path: PathBuf, message: String },

    /// Invalid requirement specification
    #[error("invalid requirement '{spec}' in {path}: {message}")]
    InvalidVersionSpec {
        path: PathBuf,
        spec: String,
        message: String,
    },

    /// Package is not declared with a rewritable requirement
    #[error("package '{package}' has no rewritable requirement in {path}")]
    PackageNotFound { path: PathBuf, package: String },
}

/// Errors related to package registry communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Package not found in registry
    #[error("package '{package}' not found in {registry} registry")]
    PackageNotFound { package: String, registry: String },

    /// Network request failed
    #[error("failed to fetch package '{package}' from {registry}: {message}")]
    NetworkError {
        package: String,
        registry: String,
        message: String,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {registry} registry")]
    RateLimitExceeded { registry: String },

    /// Invalid response from registry
    #[error("invalid response from {registry} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        registry: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching '{package}' from {registry}")]
    Timeout { package: String, registry: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid duration format
    #[error("invalid duration format '{value}': expected format like '2w', '10d', '1m'")]
    InvalidDuration { value: String },

    /// Configuration file could not be read
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for the expected schema
    #[error("invalid config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    /// Group requested on the command line is not configured
    #[error("unknown group '{name}'")]
    UnknownGroup { name: String },

    /// Two groups share a name
    #[error("duplicate group name '{name}'")]
    DuplicateGroup { name: String },

    /// Invalid path
    #[error("invalid path '{path}': {message}")]
    InvalidPath { path: PathBuf, message: String },

    /// Conflicting options
    #[error("conflicting options: {message}")]
    ConflictingOptions { message: String },
}

/// Errors raised by an update checker for one dependency
#[derive(Error, Debug)]
pub enum CheckError {
    /// Upstream registry data is ambiguous or inconsistent
    #[error("registry inconsistency for '{package}': {message}")]
    RegistryInconsistency { package: String, message: String },

    /// Registry communication failed
    #[error(transparent)]
    Registry(RegistryError),

    /// Any other checker failure
    #[error("{0}")]
    Other(String),
}

/// Errors raised while turning updated dependencies into file changes
#[derive(Error, Debug)]
pub enum BuildError {
    /// No file content changed
    #[error("no file changed for '{package}'")]
    NoChanges { package: String },

    /// A manifest edit failed
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// The updated dependency refers to a file outside the current set
    #[error("file '{file}' is not part of the current file set")]
    MissingFile { file: String },
}

/// Rejected merge into a change batch
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BatchError {
    /// The incoming change lists the same file twice
    #[error("change contains duplicate file {directory}/{name}")]
    DuplicateFile { directory: String, name: String },
}

/// Classified failure of a single dependency inside a group pass
#[derive(Error, Debug)]
pub enum DependencyError {
    /// Transient or ambiguous registry data
    #[error("registry inconsistency: {0}")]
    RegistryInconsistency(String),

    /// The change builder could not produce a diff
    #[error("build failure: {0}")]
    BuildFailure(String),

    /// Anything else
    #[error("{0}")]
    Generic(String),
}

/// Errors that stop a whole group pass
#[derive(Error, Debug)]
pub enum GroupError {
    /// Workspace could not be prepared
    #[error("failed to set up workspace at {path}: {message}")]
    WorkspaceSetup { path: PathBuf, message: String },

    /// Capability missing for a package manager
    #[error(transparent)]
    Ecosystem(#[from] EcosystemError),

    /// A finished group change could not be carried into the run
    #[error("failed to apply change of group '{group}': {source}")]
    Batch {
        group: String,
        #[source]
        source: BatchError,
    },
}

/// Errors from the package manager capability registry
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EcosystemError {
    /// No implementation registered for the package manager
    #[error("no {capability} registered for package manager '{package_manager}'")]
    NotRegistered {
        package_manager: PackageManager,
        capability: &'static str,
    },
}

impl ManifestError {
    /// Creates a new NotFound error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        ManifestError::NotFound { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::WriteError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new JsonParseError
    pub fn json_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::JsonParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new TomlParseError
    pub fn toml_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::TomlParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidVersionSpec error
    pub fn invalid_version_spec(
        path: impl Into<PathBuf>,
        spec: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ManifestError::InvalidVersionSpec {
            path: path.into(),
            spec: spec.into(),
            message: message.into(),
        }
    }

    /// Creates a new PackageNotFound error
    pub fn package_not_found(path: impl Into<PathBuf>, package: impl Into<String>) -> Self {
        ManifestError::PackageNotFound {
            path: path.into(),
            package: package.into(),
        }
    }
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new NetworkError
    pub fn network_error(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::NetworkError {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::InvalidResponse {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new RateLimitExceeded error
    pub fn rate_limit_exceeded(registry: impl Into<String>) -> Self {
        RegistryError::RateLimitExceeded {
            registry: registry.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
            registry: registry.into(),
        }
    }
}

impl CheckError {
    /// Creates a new RegistryInconsistency error
    pub fn registry_inconsistency(package: impl Into<String>, message: impl Into<String>) -> Self {
        CheckError::RegistryInconsistency {
            package: package.into(),
            message: message.into(),
        }
    }

    /// Creates a new Other error
    pub fn other(message: impl Into<String>) -> Self {
        CheckError::Other(message.into())
    }
}

impl From<RegistryError> for CheckError {
    /// Malformed registry payloads are inconsistencies, not hard failures
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::InvalidResponse {
                package, message, ..
            } => CheckError::RegistryInconsistency { package, message },
            other => CheckError::Registry(other),
        }
    }
}

impl From<CheckError> for DependencyError {
    fn from(err: CheckError) -> Self {
        match err {
            CheckError::RegistryInconsistency { .. } => {
                DependencyError::RegistryInconsistency(err.to_string())
            }
            other => DependencyError::Generic(other.to_string()),
        }
    }
}

impl From<BuildError> for DependencyError {
    fn from(err: BuildError) -> Self {
        DependencyError::BuildFailure(err.to_string())
    }
}

impl DependencyError {
    /// Short classification label used in logs and reports
    pub fn kind(&self) -> &'static str {
        match self {
            DependencyError::RegistryInconsistency(_) => "registry_inconsistency",
            DependencyError::BuildFailure(_) => "build_failure",
            DependencyError::Generic(_) => "unknown_error",
        }
    }

    /// Returns true for errors that are logged rather than reported
    pub fn is_classified(&self) -> bool {
        matches!(self, DependencyError::RegistryInconsistency(_))
    }
}
