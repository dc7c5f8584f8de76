//! Requirement specifications as declared in manifests
//!
//! Handles requirement forms like:
//! - npm: `^1.2.3`, `~1.2.3`, `>=1.0.0`, `1.2.3`
//! - Cargo: `1.2.3`, `^1.2.3`, `~1.2.3`, `=1.2.3`

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    /// Exact/pinned version (`1.2.3` for npm, `=1.2.3` for Cargo)
    Exact,
    /// Caret range (`^1.2.3`, bare `1.2.3` in Cargo)
    Caret,
    /// Tilde range (`~1.2.3`)
    Tilde,
    /// Greater than or equal (`>=1.2.3`)
    GreaterOrEqual,
    /// Greater than (`>1.2.3`)
    Greater,
    /// Less than or equal (`<=1.2.3`)
    LessOrEqual,
    /// Less than (`<1.2.3`)
    Less,
    /// Wildcard (`1.2.*`, `*`)
    Wildcard,
    /// Compound range (`>=1.0.0 <2.0.0`)
    Range,
}

impl RequirementKind {
    /// Returns true if this kind pins a single version
    pub fn is_pinned(&self) -> bool {
        matches!(self, RequirementKind::Exact)
    }

    /// Returns true if the requirement text can be moved to a new version
    /// by substituting the version while keeping the operator
    pub fn is_rewritable(&self) -> bool {
        !matches!(
            self,
            RequirementKind::Wildcard | RequirementKind::Range | RequirementKind::Less
        )
    }
}

/// A parsed requirement with its original string representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementSpec {
    /// The kind of requirement
    pub kind: RequirementKind,
    /// Requirement text as it appears in the manifest
    pub raw: String,
    /// Version number without operator
    pub version: String,
    /// Operator prefix kept on rewrite (`^`, `~`, `>=`, `=`)
    pub prefix: Option<String>,
}

impl RequirementSpec {
    /// Creates a new requirement spec
    pub fn new(kind: RequirementKind, raw: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
            version: version.into(),
            prefix: None,
        }
    }

    /// Sets the operator prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Returns true if this requirement pins a single version
    pub fn is_pinned(&self) -> bool {
        self.kind.is_pinned()
    }

    /// Formats the requirement for `new_version`, keeping the operator
    pub fn format_updated(&self, new_version: &str) -> String {
        match self.prefix {
            Some(ref prefix) => format!("{}{}", prefix, new_version),
            None => new_version.to_string(),
        }
    }

    /// Returns the requirement rewritten for `new_version`, keeping the
    /// precision of the original (`1.0` stays two segments in Cargo)
    pub fn bump_to(&self, new_version: &str) -> String {
        let precision = self.version.split('.').count();
        let target: Vec<&str> = new_version.split('.').collect();
        let keep_precision = precision < 3
            && target.len() >= precision
            && !new_version.contains('-')
            && self.kind != RequirementKind::Exact;

        if keep_precision {
            self.format_updated(&target[..precision].join("."))
        } else {
            self.format_updated(new_version)
        }
    }
}

impl fmt::Display for RequirementSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_pinned() {
        assert!(RequirementKind::Exact.is_pinned());
        assert!(!RequirementKind::Caret.is_pinned());
        assert!(!RequirementKind::Range.is_pinned());
    }

    #[test]
    fn test_kind_is_rewritable() {
        assert!(RequirementKind::Caret.is_rewritable());
        assert!(RequirementKind::GreaterOrEqual.is_rewritable());
        assert!(!RequirementKind::Wildcard.is_rewritable());
        assert!(!RequirementKind::Range.is_rewritable());
    }

    #[test]
    fn test_format_updated_with_prefix() {
        let spec = RequirementSpec::new(RequirementKind::Caret, "^1.2.3", "1.2.3").with_prefix("^");
        assert_eq!(spec.format_updated("2.0.0"), "^2.0.0");
    }

    #[test]
    fn test_format_updated_bare() {
        let spec = RequirementSpec::new(RequirementKind::Exact, "1.2.3", "1.2.3");
        assert_eq!(spec.format_updated("2.0.0"), "2.0.0");
    }

    #[test]
    fn test_bump_to_keeps_precision() {
        let spec = RequirementSpec::new(RequirementKind::Caret, "1.0", "1.0");
        assert_eq!(spec.bump_to("1.4.2"), "1.4");

        let tilde = RequirementSpec::new(RequirementKind::Tilde, "~0.5", "0.5").with_prefix("~");
        assert_eq!(tilde.bump_to("0.6.1"), "~0.6");
    }

    #[test]
    fn test_bump_to_full_precision() {
        let spec = RequirementSpec::new(RequirementKind::Caret, "^1.2.3", "1.2.3").with_prefix("^");
        assert_eq!(spec.bump_to("1.4.0"), "^1.4.0");

        let pre = RequirementSpec::new(RequirementKind::Caret, "1.0", "1.0");
        assert_eq!(pre.bump_to("2.0.0-rc.1"), "2.0.0-rc.1");
    }

    #[test]
    fn test_display_trait() {
        let spec = RequirementSpec::new(RequirementKind::Caret, "^1.2.3", "1.2.3");
        assert_eq!(format!("{}", spec), "^1.2.3");
    }
}
