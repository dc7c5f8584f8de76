//! npm requirement parser
//!
//! Handles requirement formats:
//! - Exact: `1.2.3`
//! - Caret / tilde: `^1.2.3`, `~1.2.3`
//! - Comparison: `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3`
//! - Wildcard: `*`, `1.x`, `1.2.*`
//! - Range: `>=1.0.0 <2.0.0`, `1.0.0 - 2.0.0`

use super::{parse_operator, RequirementParser};
use crate::domain::{PackageManager, RequirementKind, RequirementSpec};
use regex::Regex;
use std::sync::LazyLock;

/// npm requirement parser
pub struct NpmRequirementParser;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+(?:-[\w.]+)?$").unwrap());
static WILDCARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?\.)?[x*]$|^\*$").unwrap());
static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[<>=]+\d+\.\d+\.\d+\s+[<>=]+\d+\.\d+\.\d+$|^\d+\.\d+\.\d+\s*-\s*\d+\.\d+\.\d+$")
        .unwrap()
});

impl RequirementParser for NpmRequirementParser {
    fn parse(&self, requirement: &str) -> Option<RequirementSpec> {
        let trimmed = requirement.trim();
        if trimmed.is_empty() {
            return None;
        }

        if RANGE_RE.is_match(trimmed) {
            let lower = trimmed
                .split_whitespace()
                .next()
                .map(|s| s.trim_start_matches(|c: char| !c.is_ascii_digit()))
                .unwrap_or_default();
            return Some(RequirementSpec::new(RequirementKind::Range, trimmed, lower));
        }

        if let Some(spec) = parse_operator(trimmed, |v| VERSION_RE.is_match(v)) {
            return Some(spec);
        }

        if WILDCARD_RE.is_match(trimmed) {
            return Some(RequirementSpec::new(
                RequirementKind::Wildcard,
                trimmed,
                trimmed,
            ));
        }

        VERSION_RE
            .is_match(trimmed)
            .then(|| RequirementSpec::new(RequirementKind::Exact, trimmed, trimmed))
    }

    fn package_manager(&self) -> PackageManager {
        PackageManager::Npm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(requirement: &str) -> Option<RequirementSpec> {
        NpmRequirementParser.parse(requirement)
    }

    #[test]
    fn test_parse_exact() {
        let spec = parse("1.2.3").unwrap();
        assert_eq!(spec.kind, RequirementKind::Exact);
        assert_eq!(spec.version, "1.2.3");
        assert!(spec.prefix.is_none());
        assert!(spec.is_pinned());
    }

    #[test]
    fn test_parse_exact_with_prerelease() {
        let spec = parse("1.2.3-beta.1").unwrap();
        assert_eq!(spec.kind, RequirementKind::Exact);
        assert_eq!(spec.version, "1.2.3-beta.1");
    }

    #[test]
    fn test_parse_caret() {
        let spec = parse("^1.2.3").unwrap();
        assert_eq!(spec.kind, RequirementKind::Caret);
        assert_eq!(spec.version, "1.2.3");
        assert_eq!(spec.prefix, Some("^".to_string()));
    }

    #[test]
    fn test_parse_tilde() {
        let spec = parse("~1.2.3").unwrap();
        assert_eq!(spec.kind, RequirementKind::Tilde);
        assert_eq!(spec.prefix, Some("~".to_string()));
    }

    #[test]
    fn test_parse_comparisons() {
        assert_eq!(parse(">=1.2.3").unwrap().kind, RequirementKind::GreaterOrEqual);
        assert_eq!(parse(">1.2.3").unwrap().kind, RequirementKind::Greater);
        assert_eq!(parse("<=1.2.3").unwrap().kind, RequirementKind::LessOrEqual);
        assert_eq!(parse("<1.2.3").unwrap().kind, RequirementKind::Less);
    }

    #[test]
    fn test_parse_ranges() {
        let spec = parse(">=1.0.0 <2.0.0").unwrap();
        assert_eq!(spec.kind, RequirementKind::Range);
        assert_eq!(spec.version, "1.0.0");

        let hyphen = parse("1.0.0 - 2.0.0").unwrap();
        assert_eq!(hyphen.kind, RequirementKind::Range);
    }

    #[test]
    fn test_parse_wildcards() {
        assert_eq!(parse("*").unwrap().kind, RequirementKind::Wildcard);
        assert_eq!(parse("1.x").unwrap().kind, RequirementKind::Wildcard);
        assert_eq!(parse("1.2.*").unwrap().kind, RequirementKind::Wildcard);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse("").is_none());
        assert!(parse("   ").is_none());
        assert!(parse("not-a-version").is_none());
        assert!(parse("github:user/repo").is_none());
    }

    #[test]
    fn test_format_updated_keeps_operator() {
        assert_eq!(parse("^1.2.3").unwrap().format_updated("2.0.0"), "^2.0.0");
        assert_eq!(parse("~1.2.3").unwrap().format_updated("1.3.0"), "~1.3.0");
        assert_eq!(parse("1.2.3").unwrap().format_updated("2.0.0"), "2.0.0");
    }
}
