//! Semver admission of version jumps into update-type restricted groups
//!
//! A jump is classified by the highest-order release segment that
//! increases. Versions the ecosystem grammar cannot parse, or whose
//! segments are of mixed kinds, are never admitted.

use crate::domain::{GroupRules, PackageManager, UpdateType};
use std::cmp::Ordering;

/// Classify the jump from `current` to `latest`
///
/// Returns `None` when either version does not parse, when segments are
/// not comparable, or when no major/minor/patch segment increases (for
/// example a pre-release-only change).
pub fn classify(
    package_manager: PackageManager,
    current: &str,
    latest: &str,
) -> Option<UpdateType> {
    let current = package_manager.parse_version(current)?;
    let latest = package_manager.parse_version(latest)?;

    let from = current.semver_segments();
    let to = latest.semver_segments();
    if from.iter().zip(to.iter()).any(|(a, b)| !a.same_kind(b)) {
        return None;
    }

    [UpdateType::Major, UpdateType::Minor, UpdateType::Patch]
        .into_iter()
        .zip(from.iter().zip(to.iter()))
        .find(|(_, (a, b))| b.partial_cmp(a) == Some(Ordering::Greater))
        .map(|(update_type, _)| update_type)
}

/// Decide whether the jump from `current` to `latest` may join a group
///
/// Groups without update-type rules admit everything, including versions
/// that cannot be classified.
pub fn admits(
    rules: &GroupRules,
    package_manager: PackageManager,
    current: &str,
    latest: &str,
) -> bool {
    if !rules.restricts_update_types() {
        return true;
    }
    classify(package_manager, current, latest).is_some_and(|t| rules.allows(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(types: &[UpdateType]) -> GroupRules {
        GroupRules {
            update_types: Some(types.to_vec()),
        }
    }

    #[test]
    fn test_minor_only_boundary() {
        let minor = rules(&[UpdateType::Minor]);
        let pm = PackageManager::Npm;
        assert!(admits(&minor, pm, "1.2.3", "1.3.0"));
        assert!(!admits(&minor, pm, "1.2.3", "2.0.0"));
        assert!(!admits(&minor, pm, "1.2.3", "1.2.4"));
        assert!(!admits(&minor, pm, "1.2.3", "1.2.3-beta"));
    }

    #[test]
    fn test_no_rules_admits_everything() {
        let open = GroupRules::default();
        assert!(admits(&open, PackageManager::Cargo, "1.0.0", "9.0.0"));
        assert!(admits(&open, PackageManager::Cargo, "abc123", "def456"));

        let empty = rules(&[]);
        assert!(admits(&empty, PackageManager::Cargo, "1.0.0", "2.0.0"));
    }

    #[test]
    fn test_unparseable_versions_rejected() {
        let all = rules(&[UpdateType::Major, UpdateType::Minor, UpdateType::Patch]);
        assert!(!admits(&all, PackageManager::Npm, "a1b2c3d", "1.0.0"));
        assert!(!admits(&all, PackageManager::Npm, "1.0.0", ""));
    }

    #[test]
    fn test_mixed_segment_kinds_rejected() {
        let all = rules(&[UpdateType::Major, UpdateType::Minor, UpdateType::Patch]);
        assert!(!admits(&all, PackageManager::Cargo, "1.2.x", "1.3.0"));
        assert_eq!(classify(PackageManager::Cargo, "1.2.x", "1.3.0"), None);
    }

    #[test]
    fn test_missing_segments_default_to_zero() {
        assert_eq!(
            classify(PackageManager::Cargo, "1.0", "1.0.1"),
            Some(UpdateType::Patch)
        );
        assert_eq!(
            classify(PackageManager::Cargo, "1", "1.1"),
            Some(UpdateType::Minor)
        );
    }

    #[test]
    fn test_classify_highest_order_wins() {
        let pm = PackageManager::Npm;
        assert_eq!(classify(pm, "1.2.3", "2.3.4"), Some(UpdateType::Major));
        assert_eq!(classify(pm, "1.2.3", "1.3.4"), Some(UpdateType::Minor));
        assert_eq!(classify(pm, "v1.2.3", "v1.2.9"), Some(UpdateType::Patch));
        assert_eq!(classify(pm, "1.2.3", "1.2.3"), None);
    }

    #[test]
    fn test_cargo_grammar_rejects_v_prefix() {
        assert_eq!(classify(PackageManager::Cargo, "v1.0.0", "v2.0.0"), None);
    }

    #[test]
    fn test_major_and_patch_allowed_skips_minor() {
        let r = rules(&[UpdateType::Major, UpdateType::Patch]);
        assert!(admits(&r, PackageManager::Npm, "1.0.0", "2.0.0"));
        assert!(admits(&r, PackageManager::Npm, "1.0.0", "1.0.1"));
        assert!(!admits(&r, PackageManager::Npm, "1.0.0", "1.1.0"));
    }
}
