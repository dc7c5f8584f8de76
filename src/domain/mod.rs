//! Core domain models for depgroup
//!
//! This module contains the fundamental types used throughout the crate:
//! - Package manager identifiers and their version grammar
//! - Dependencies, requirements and dependency files
//! - Dependency groups and their admission rules
//! - Requirement specifications
//! - File changes, notices and the final group change

mod change;
mod dependency;
mod dependency_file;
mod group;
mod package_manager;
mod requirement_spec;
mod update_result;
mod version;

pub use change::{ChangeSource, FileChange, GroupChange, Notice, NoticeMode};
pub use dependency::{Dependency, Requirement};
pub use dependency_file::{normalize_directory, DependencyFile};
pub use group::{DependencyGroup, GroupRules, UpdateType};
pub use package_manager::PackageManager;
pub use requirement_spec::{RequirementKind, RequirementSpec};
pub use update_result::SkipReason;
pub use version::{compare_versions, is_prerelease_version, Segment, Version};
