//! Cargo requirement parser
//!
//! Handles requirement formats:
//! - Exact pinned: `=1.2.3`
//! - Caret (default): `1.2.3` or `^1.2.3`
//! - Tilde: `~1.2.3`
//! - Comparison: `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3`
//! - Wildcard: `*`, `1.*`
//! - Range: `>=1.0, <2.0`

use super::{parse_operator, RequirementParser};
use crate::domain::{PackageManager, RequirementKind, RequirementSpec};
use regex::Regex;
use std::sync::LazyLock;

/// Cargo requirement parser
pub struct CargoRequirementParser;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)*(?:-[\w.]+)?$").unwrap());
static RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[<>=]+\d+(?:\.\d+)*,\s*[<>=]+\d+(?:\.\d+)*$").unwrap());
static WILDCARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*$|^\d+(?:\.\d+)*\.\*$").unwrap());

impl RequirementParser for CargoRequirementParser {
    fn parse(&self, requirement: &str) -> Option<RequirementSpec> {
        let trimmed = requirement.trim();
        if trimmed.is_empty() {
            return None;
        }

        if RANGE_RE.is_match(trimmed) {
            let lower = trimmed
                .split(',')
                .next()
                .map(|s| s.trim_start_matches(|c: char| !c.is_ascii_digit()))
                .unwrap_or_default();
            return Some(RequirementSpec::new(RequirementKind::Range, trimmed, lower));
        }

        if let Some(version) = trimmed.strip_prefix('=') {
            let version = version.trim_start();
            return VERSION_RE.is_match(version).then(|| {
                RequirementSpec::new(RequirementKind::Exact, trimmed, version).with_prefix("=")
            });
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

        // A bare version is an implicit caret requirement in Cargo
        VERSION_RE
            .is_match(trimmed)
            .then(|| RequirementSpec::new(RequirementKind::Caret, trimmed, trimmed))
    }

    fn package_manager(&self) -> PackageManager {
        PackageManager::Cargo
    }
}
