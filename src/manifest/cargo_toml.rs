//! Cargo.toml parser for Rust projects
//!
//! Handles:
//! - dependencies, dev-dependencies, build-dependencies
//! - Target-specific dependency tables
//! - Inline table format: { version = "1.0" }
//! - Workspace dependencies (`[workspace.dependencies]`)

use crate::domain::{Dependency, PackageManager, Requirement, RequirementKind};
use crate::error::ManifestError;
use crate::manifest::ManifestParser;
use crate::parser::{CargoRequirementParser, RequirementParser};
use regex::Regex;
use toml::Value;

const SECTIONS: &[&str] = &["dependencies", "dev-dependencies", "build-dependencies"];

/// Parser for Cargo.toml files
pub struct CargoTomlParser;

impl ManifestParser for CargoTomlParser {
    fn parse(&self, content: &str, file_name: &str) -> Result<Vec<Dependency>, ManifestError> {
        let toml: Value = content
            .parse()
            .map_err(|e: toml::de::Error| {
                ManifestError::toml_parse_error(file_name, e.to_string())
            })?;

        let mut dependencies = Vec::new();
        let mut collect = |table: Option<&Value>, section: &str| {
            if let Some(deps) = table.and_then(|d| d.as_table()) {
                parse_cargo_dependencies(deps, section, file_name, &mut dependencies);
            }
        };

        for section in SECTIONS {
            collect(toml.get(*section), section);
        }

        if let Some(target) = toml.get("target").and_then(|t| t.as_table()) {
            for target_config in target.values() {
                for section in SECTIONS {
                    collect(target_config.get(*section), section);
                }
            }
        }

        collect(
            toml.get("workspace").and_then(|w| w.get("dependencies")),
            "workspace.dependencies",
        );

        Ok(dependencies)
    }

    fn package_manager(&self) -> PackageManager {
        PackageManager::Cargo
    }

    fn update_requirement(
        &self,
        content: &str,
        package: &str,
        previous: &str,
        updated: &str,
    ) -> Result<String, ManifestError> {
        let name_re = regex::escape(package);
        let previous_re = regex::escape(previous);

        // package = "1.0", package = { version = "1.0", ... } and the
        // [dependencies.package] table form
        let patterns = [
            format!(r#"(?m)^(\s*{}\s*=\s*)"{}""#, name_re, previous_re),
            format!(
                r#"(?m)^(\s*{}\s*=\s*\{{[^}}\n]*?\bversion\s*=\s*)"{}""#,
                name_re, previous_re
            ),
            format!(
                r#"(?m)(^\[(?:[^\]]*\.)?(?:dependencies|dev-dependencies|build-dependencies)\.{}\][^\[]*?^\s*version\s*=\s*)"{}""#,
                name_re, previous_re
            ),
        ];

        let mut result = content.to_string();
        let mut updated_any = false;
        for pattern in &patterns {
            let re = Regex::new(pattern).map_err(|e| {
                ManifestError::invalid_version_spec(
                    "Cargo.toml",
                    package,
                    format!("invalid regex pattern: {}", e),
                )
            })?;
            if re.is_match(&result) {
                result = re
                    .replace_all(&result, |caps: &regex::Captures| {
                        format!(r#"{}"{}""#, &caps[1], updated)
                    })
                    .into_owned();
                updated_any = true;
            }
        }

        if updated_any {
            Ok(result)
        } else {
            Err(ManifestError::package_not_found("Cargo.toml", package))
        }
    }
}

fn parse_cargo_dependencies(
    deps: &toml::map::Map<String, Value>,
    section: &str,
    file_name: &str,
    output: &mut Vec<Dependency>,
) {
    for (name, value) in deps {
        let text = match value {
            Value::String(s) => Some(s.as_str()),
            // git, path and `workspace = true` entries carry no version
            Value::Table(t) => t.get("version").and_then(|v| v.as_str()),
            _ => None,
        };

        let Some(text) = text else {
            continue;
        };
        let Some(spec) = CargoRequirementParser.parse(text) else {
            continue;
        };

        let mut requirement =
            Requirement::new(Some(text.to_string()), file_name).with_group(section);
        if section.starts_with("workspace") {
            requirement = requirement.with_property("workspace.dependencies");
        }
        let version = (spec.kind != RequirementKind::Wildcard).then(|| spec.version);
        output.push(Dependency::new(
            name.clone(),
            version,
            vec![requirement],
            PackageManager::Cargo,
        ));
    }
}
