//! package.json parser for npm projects
//!
//! Handles:
//! - dependencies
//! - devDependencies
//! - peerDependencies
//! - optionalDependencies

use crate::domain::{Dependency, PackageManager, Requirement, RequirementKind};
use crate::error::ManifestError;
use crate::manifest::ManifestParser;
use crate::parser::{NpmRequirementParser, RequirementParser};
use regex::Regex;
use serde_json::{Map, Value};

const SECTIONS: &[&str] = &[
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
];

/// Parser for package.json files
pub struct PackageJsonParser;

impl ManifestParser for PackageJsonParser {
    fn parse(&self, content: &str, file_name: &str) -> Result<Vec<Dependency>, ManifestError> {
        let json: Value = serde_json::from_str(content)
            .map_err(|e| ManifestError::json_parse_error(file_name, e.to_string()))?;

        let mut dependencies = Vec::new();
        for section in SECTIONS {
            if let Some(deps) = json.get(*section).and_then(|v| v.as_object()) {
                parse_dependency_object(deps, section, file_name, &mut dependencies);
            }
        }

        Ok(dependencies)
    }

    fn package_manager(&self) -> PackageManager {
        PackageManager::Npm
    }

    fn update_requirement(
        &self,
        content: &str,
        package: &str,
        previous: &str,
        updated: &str,
    ) -> Result<String, ManifestError> {
        // Text replacement keeps key order and whitespace intact
        let pattern = format!(
            r#"("{}"\s*:\s*)"{}""#,
            regex::escape(package),
            regex::escape(previous)
        );
        let re = Regex::new(&pattern).map_err(|e| {
            ManifestError::invalid_version_spec(
                "package.json",
                package,
                format!("invalid regex pattern: {}", e),
            )
        })?;

        if !re.is_match(content) {
            return Err(ManifestError::package_not_found("package.json", package));
        }

        let result = re.replace_all(content, |caps: &regex::Captures| {
            format!(r#"{}"{}""#, &caps[1], updated)
        });
        Ok(result.into_owned())
    }
}

fn parse_dependency_object(
    deps: &Map<String, Value>,
    section: &str,
    file_name: &str,
    output: &mut Vec<Dependency>,
) {
    for (name, value) in deps {
        let Some(text) = value.as_str() else {
            continue;
        };
        // Git URLs, tags and file: links have no version to move
        let Some(spec) = NpmRequirementParser.parse(text) else {
            continue;
        };

        let requirement = Requirement::new(Some(text.to_string()), file_name).with_group(section);
        let version = (spec.kind != RequirementKind::Wildcard).then(|| spec.version);
        output.push(Dependency::new(
            name.clone(),
            version,
            vec![requirement],
            PackageManager::Npm,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<Vec<Dependency>, ManifestError> {
        PackageJsonParser.parse(content, "package.json")
    }

    #[test]
    fn test_parse_simple_dependencies() {
        let content = r#"{
            "dependencies": {
                "lodash": "^4.17.21",
                "express": "~4.18.2"
            }
        }"#;

        let deps = parse(content).unwrap();
        assert_eq!(deps.len(), 2);

        let lodash = deps.iter().find(|d| d.name == "lodash").unwrap();
        assert_eq!(lodash.version(), "4.17.21");
        assert_eq!(lodash.requirements[0].text(), "^4.17.21");
        assert_eq!(lodash.requirements[0].file, "package.json");
        assert_eq!(lodash.requirements[0].groups, vec!["dependencies"]);
        assert!(!lodash.is_dev());
    }

    #[test]
    fn test_parse_dev_dependencies() {
        let content = r#"{
            "devDependencies": {
                "typescript": "^5.0.0",
                "jest": "^29.0.0"
            }
        }"#;

        let deps = parse(content).unwrap();
        assert_eq!(deps.len(), 2);
        assert!(deps.iter().all(|d| d.is_dev()));
    }

    #[test]
    fn test_parse_same_package_in_two_sections() {
        let content = r#"{
            "dependencies": { "react": "^18.2.0" },
            "peerDependencies": { "react": "^18.0.0" }
        }"#;

        let deps = parse(content).unwrap();
        assert_eq!(deps.len(), 2);
        assert!(deps.iter().all(|d| d.name == "react"));
    }

    #[test]
    fn test_parse_wildcard_has_no_version() {
        let content = r#"{ "dependencies": { "pkg": "*" } }"#;
        let deps = parse(content).unwrap();
        assert_eq!(deps.len(), 1);
        assert!(deps[0].version.is_none());
    }

    #[test]
    fn test_parse_skips_git_sources() {
        let content = r#"{ "dependencies": { "mine": "github:user/repo" } }"#;
        assert!(parse(content).unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse("not json").unwrap_err();
        assert!(err.to_string().contains("failed to parse JSON"));
    }

    #[test]
    fn test_update_requirement_preserves_key_order() {
        let content = r#"{
  "name": "test-package",
  "dependencies": {
    "zod": "^3.0.0",
    "axios": "^1.0.0",
    "lodash": "^4.17.21"
  }
}"#;

        let result = PackageJsonParser
            .update_requirement(content, "axios", "^1.0.0", "^1.5.0")
            .unwrap();
        assert_eq!(result, content.replace("^1.0.0", "^1.5.0"));
    }

    #[test]
    fn test_update_requirement_scoped_package() {
        let content = r#"{ "dependencies": { "@types/node" : "^20.0.0" } }"#;
        let result = PackageJsonParser
            .update_requirement(content, "@types/node", "^20.0.0", "^20.10.0")
            .unwrap();
        assert!(result.contains(r#""@types/node" : "^20.10.0""#));
    }

    #[test]
    fn test_update_requirement_only_matching_previous() {
        let content = r#"{
  "dependencies": { "react": "^18.2.0" },
  "peerDependencies": { "react": ">=16.0.0" }
}"#;
        let result = PackageJsonParser
            .update_requirement(content, "react", "^18.2.0", "^18.3.1")
            .unwrap();
        assert!(result.contains(r#""react": "^18.3.1""#));
        assert!(result.contains(r#""react": ">=16.0.0""#));
    }

    #[test]
    fn test_update_requirement_not_found() {
        let content = r#"{ "dependencies": {} }"#;
        let result = PackageJsonParser.update_requirement(content, "missing", "1.0.0", "2.0.0");
        assert!(matches!(result, Err(ManifestError::PackageNotFound { .. })));
    }
}
