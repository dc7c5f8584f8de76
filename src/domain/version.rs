//! Version segment model and comparison helpers
//!
//! Versions are decomposed into dotted release segments plus optional
//! pre-release and build suffixes:
//! - `1.2.3` → `[1, 2, 3]`
//! - `1.2.3-beta.1` → `[1, 2, 3]`, pre-release `beta.1`
//! - `1.2.x` → `[1, 2, "x"]`

use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

const VERSION_PATTERN: &str =
    r"^(\d[0-9A-Za-z]*(?:\.[0-9A-Za-z]+)*)(?:-([0-9A-Za-z.-]+))?(?:\+([0-9A-Za-z.-]+))?$";

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(VERSION_PATTERN).unwrap());

/// A single release segment of a version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Purely numeric segment (`3`)
    Numeric(u64),
    /// Segment containing non-digit characters (`x`, `0beta`)
    Alpha(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        match raw.parse::<u64>() {
            Ok(n) => Segment::Numeric(n),
            Err(_) => Segment::Alpha(raw.to_string()),
        }
    }

    /// Returns true if both segments are of the same kind
    pub fn same_kind(&self, other: &Segment) -> bool {
        matches!(
            (self, other),
            (Segment::Numeric(_), Segment::Numeric(_)) | (Segment::Alpha(_), Segment::Alpha(_))
        )
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Segment::Numeric(a), Segment::Numeric(b)) => Some(a.cmp(b)),
            (Segment::Alpha(a), Segment::Alpha(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Numeric(n) => write!(f, "{}", n),
            Segment::Alpha(s) => write!(f, "{}", s),
        }
    }
}

/// A parsed version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    /// Dotted release segments
    pub release: Vec<Segment>,
    /// Pre-release suffix after `-`
    pub pre_release: Option<String>,
    /// Build metadata after `+`
    pub build: Option<String>,
}

impl Version {
    /// Parses a version string; returns None when it does not start with a
    /// numeric release (content hashes, tags, empty strings)
    pub fn parse(version: &str) -> Option<Self> {
        let caps = VERSION_RE.captures(version.trim())?;
        let release = caps
            .get(1)?
            .as_str()
            .split('.')
            .map(Segment::parse)
            .collect();

        Some(Self {
            release,
            pre_release: caps.get(2).map(|m| m.as_str().to_string()),
            build: caps.get(3).map(|m| m.as_str().to_string()),
        })
    }

    /// Returns the release segment at `index`, defaulting missing ones to 0
    pub fn segment(&self, index: usize) -> Segment {
        self.release
            .get(index)
            .cloned()
            .unwrap_or(Segment::Numeric(0))
    }

    /// Returns the (major, minor, patch) segments
    pub fn semver_segments(&self) -> [Segment; 3] {
        [self.segment(0), self.segment(1), self.segment(2)]
    }

    /// Returns true if this version carries a pre-release suffix
    pub fn is_prerelease(&self) -> bool {
        self.pre_release.is_some()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let release: Vec<String> = self.release.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", release.join("."))?;
        if let Some(ref pre) = self.pre_release {
            write!(f, "-{}", pre)?;
        }
        if let Some(ref build) = self.build {
            write!(f, "+{}", build)?;
        }
        Ok(())
    }
}

/// Compare two version strings using semver-like rules
///
/// Only numeric release parts take part in the comparison; missing parts
/// count as zero. When those are equal, a pre-release sorts before the
/// corresponding release.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let split = |s: &str| -> (Vec<u64>, bool) {
        let s = s.trim();
        let s = s.strip_prefix('v').unwrap_or(s);
        let s = s.split('+').next().unwrap_or(s);
        let (release, pre) = match s.split_once('-') {
            Some((release, _)) => (release, true),
            None => (s, false),
        };
        (release.split('.').filter_map(|p| p.parse().ok()).collect(), pre)
    };

    let (parts_a, pre_a) = split(a);
    let (parts_b, pre_b) = split(b);

    let len = parts_a.len().max(parts_b.len());
    for i in 0..len {
        let pa = parts_a.get(i).copied().unwrap_or(0);
        let pb = parts_b.get(i).copied().unwrap_or(0);
        match pa.cmp(&pb) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    match (pre_a, pre_b) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Returns true if the version string carries a pre-release suffix
pub fn is_prerelease_version(version: &str) -> bool {
    let version = version.trim();
    let version = version.strip_prefix('v').unwrap_or(version);
    let release = version.split('+').next().unwrap_or(version);
    release.contains('-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let v = Version::parse("1.2.3").unwrap();
        assert_eq!(
            v.release,
            vec![
                Segment::Numeric(1),
                Segment::Numeric(2),
                Segment::Numeric(3)
            ]
        );
        assert!(v.pre_release.is_none());
        assert!(v.build.is_none());
    }

    #[test]
    fn test_parse_prerelease_and_build() {
        let v = Version::parse("1.2.3-beta.1+exp.sha").unwrap();
        assert_eq!(v.pre_release.as_deref(), Some("beta.1"));
        assert_eq!(v.build.as_deref(), Some("exp.sha"));
        assert!(v.is_prerelease());
        assert_eq!(v.to_string(), "1.2.3-beta.1+exp.sha");
    }

    #[test]
    fn test_parse_alpha_segment() {
        let v = Version::parse("1.2.x").unwrap();
        assert_eq!(v.segment(2), Segment::Alpha("x".to_string()));
    }

    #[test]
    fn test_parse_rejects_hashes_and_empty() {
        assert!(Version::parse("").is_none());
        assert!(Version::parse("a1b2c3d4").is_none());
        assert!(Version::parse("latest").is_none());
    }

    #[test]
    fn test_missing_segments_default_to_zero() {
        let v = Version::parse("2").unwrap();
        assert_eq!(
            v.semver_segments(),
            [Segment::Numeric(2), Segment::Numeric(0), Segment::Numeric(0)]
        );
    }

    #[test]
    fn test_segment_ordering() {
        assert!(Segment::Numeric(2) > Segment::Numeric(1));
        assert!(Segment::Alpha("b".into()) > Segment::Alpha("a".into()));
        assert_eq!(
            Segment::Numeric(1).partial_cmp(&Segment::Alpha("x".into())),
            None
        );
    }

    #[test]
    fn test_compare_versions_basic() {
        assert_eq!(compare_versions("1.0.0", "1.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("1.0.0", "2.0.0"), Ordering::Less);
        assert_eq!(compare_versions("2.0.0", "1.0.0"), Ordering::Greater);
    }

    #[test]
    fn test_compare_versions_multi_digit() {
        assert_eq!(compare_versions("1.9.0", "1.10.0"), Ordering::Less);
        assert_eq!(compare_versions("10.0.0", "9.0.0"), Ordering::Greater);
    }

    #[test]
    fn test_compare_versions_prerelease_sorts_first() {
        assert_eq!(compare_versions("1.0.0-beta", "1.0.0"), Ordering::Less);
        assert_eq!(compare_versions("1.0.0", "1.0.0-rc.1"), Ordering::Greater);
    }

    #[test]
    fn test_compare_versions_missing_parts() {
        assert_eq!(compare_versions("1.0", "1.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("1", "1.0.1"), Ordering::Less);
    }

    #[test]
    fn test_compare_versions_with_v_prefix() {
        assert_eq!(compare_versions("v1.0.0", "1.0.0"), Ordering::Equal);
    }

    #[test]
    fn test_is_prerelease_version() {
        assert!(is_prerelease_version("19.3.0-canary-52684925-20251110"));
        assert!(is_prerelease_version("6.0.0-beta.1"));
        assert!(!is_prerelease_version("1.2.3"));
        assert!(!is_prerelease_version("1.2.3+build-5"));
    }
}
