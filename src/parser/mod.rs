//! Requirement parsers for the supported package managers
//!
//! Each parser turns the requirement text declared in a manifest into a
//! [`RequirementSpec`] so it can be rewritten for a new version while
//! keeping its operator.

mod cargo;
mod npm;

pub use cargo::CargoRequirementParser;
pub use npm::NpmRequirementParser;

use crate::domain::{PackageManager, RequirementKind, RequirementSpec};

/// Trait for parsing requirement strings
pub trait RequirementParser: Send + Sync {
    /// Parse a requirement string
    fn parse(&self, requirement: &str) -> Option<RequirementSpec>;

    /// Returns the package manager this parser handles
    fn package_manager(&self) -> PackageManager;
}

/// Get a requirement parser for the specified package manager
pub fn get_requirement_parser(package_manager: PackageManager) -> Box<dyn RequirementParser> {
    match package_manager {
        PackageManager::Npm => Box::new(NpmRequirementParser),
        PackageManager::Cargo => Box::new(CargoRequirementParser),
    }
}

/// Single-operator requirement forms shared by both ecosystems, longest
/// operator first so `>=` wins over `>`
const OPERATORS: &[(&str, RequirementKind)] = &[
    (">=", RequirementKind::GreaterOrEqual),
    ("<=", RequirementKind::LessOrEqual),
    (">", RequirementKind::Greater),
    ("<", RequirementKind::Less),
    ("^", RequirementKind::Caret),
    ("~", RequirementKind::Tilde),
];

/// Matches `requirement` against the shared operator table, accepting the
/// remaining text only if `is_version` agrees
fn parse_operator(requirement: &str, is_version: impl Fn(&str) -> bool) -> Option<RequirementSpec> {
    OPERATORS.iter().find_map(|(op, kind)| {
        let version = requirement.strip_prefix(op)?.trim_start();
        is_version(version)
            .then(|| RequirementSpec::new(*kind, requirement, version).with_prefix(*op))
    })
}
