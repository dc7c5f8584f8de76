//! Integration tests for depgroup
//!
//! These tests drive the group compiler through the public API with an
//! in-test ecosystem: a line-based `deps.txt` format (`name = version`),
//! a scripted update checker and a line-rewriting change builder.
//!
//! They verify:
//! - Idempotent re-entry and at-most-once handling across groups
//! - Merge consistency of the accumulated file state
//! - The update-type admission boundary
//! - Lock-step detection, failure isolation and the validation gate
//! - Cancellation and workspace release

use async_trait::async_trait;
use depgroup::domain::{
    ChangeSource, Dependency, DependencyFile, DependencyGroup, FileChange, Notice, PackageManager,
    Requirement, UpdateType,
};
use depgroup::error::{BuildError, CheckError, ManifestError};
use depgroup::error_handler::RecordingErrorHandler;
use depgroup::group::{CompilerOptions, GroupCompiler, HandledDependencies, Snapshot};
use depgroup::manifest::{ChangeBuilder, FileParser};
use depgroup::update::{
    CheckerContext, RequirementsUnlock, UpdateChecker, UpdateCheckerFactory, UpdateDecisionEngine,
};
use depgroup::workspace::Workspace;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

const DEPS_FILE: &str = "deps.txt";

/// Parses `name = version` lines
struct LineParser;

impl FileParser for LineParser {
    fn parse(&self, files: &[DependencyFile]) -> Result<Vec<Dependency>, ManifestError> {
        let mut dependencies = Vec::new();
        for file in files.iter().filter(|f| f.name == DEPS_FILE) {
            for line in file.content.lines().filter(|l| !l.trim().is_empty()) {
                let (name, version) = line
                    .split_once(" = ")
                    .ok_or_else(|| ManifestError::toml_parse_error(DEPS_FILE, line))?;
                dependencies.push(Dependency::new(
                    name,
                    Some(version.to_string()),
                    vec![Requirement::new(Some(version.to_string()), DEPS_FILE)],
                    PackageManager::Cargo,
                ));
            }
        }
        Ok(dependencies)
    }
}

/// Rewrites the line of every updated dependency
struct LineBuilder;

impl ChangeBuilder for LineBuilder {
    fn create_from(
        &self,
        files: &[DependencyFile],
        updated: &[Dependency],
        source: &ChangeSource,
    ) -> Result<FileChange, BuildError> {
        if source.lead.name == "unbuildable" {
            return Err(BuildError::NoChanges {
                package: source.lead.name.clone(),
            });
        }
        let file = files
            .iter()
            .find(|f| f.name == DEPS_FILE)
            .ok_or_else(|| BuildError::MissingFile {
                file: DEPS_FILE.to_string(),
            })?;

        let content: String = file
            .content
            .lines()
            .map(|line| {
                let name = line.split(" = ").next().unwrap_or_default();
                match updated.iter().find(|d| d.name == name) {
                    Some(d) => format!("{} = {}\n", name, d.version()),
                    None => format!("{}\n", line),
                }
            })
            .collect();

        Ok(FileChange::new(updated.to_vec(), vec![file.with_content(content)]))
    }
}

/// What the checker answers for one dependency
#[derive(Clone, Default)]
struct Script {
    target: Option<String>,
    /// Other dependencies moved together with this one
    companions: Vec<(String, String)>,
    failure: Option<&'static str>,
    /// Omit the previous version on the updated dependency
    drop_provenance: bool,
    /// Cancelled once this dependency's update has been computed
    cancels: Option<CancellationToken>,
}

fn target(version: &str) -> Script {
    Script {
        target: Some(version.to_string()),
        ..Script::default()
    }
}

struct ScriptedChecker {
    dependency: Dependency,
    script: Script,
}

impl ScriptedChecker {
    fn fail(&self) -> Result<(), CheckError> {
        match self.script.failure {
            Some("inconsistent") => Err(CheckError::registry_inconsistency(
                &self.dependency.name,
                "version list changed mid-run",
            )),
            Some(message) => Err(CheckError::other(message)),
            None => Ok(()),
        }
    }

    fn target(&self) -> Option<&str> {
        self.script
            .target
            .as_deref()
            .filter(|t| *t != self.dependency.version())
    }
}

#[async_trait]
impl UpdateChecker for ScriptedChecker {
    async fn latest_version(&self) -> Result<Option<String>, CheckError> {
        self.fail()?;
        Ok(self.script.target.clone())
    }

    async fn lowest_security_fix_version(&self) -> Result<Option<String>, CheckError> {
        Ok(None)
    }

    async fn all_versions_ignored(&self) -> Result<bool, CheckError> {
        self.fail()?;
        Ok(false)
    }

    async fn up_to_date(&self) -> Result<bool, CheckError> {
        Ok(self.target().is_none())
    }

    async fn can_update(&self, scope: RequirementsUnlock) -> Result<bool, CheckError> {
        Ok(scope == RequirementsUnlock::Own && self.target().is_some())
    }

    async fn requirements_unlocked_or_can_be(&self) -> Result<bool, CheckError> {
        Ok(true)
    }

    async fn updated_dependencies(
        &self,
        _scope: RequirementsUnlock,
    ) -> Result<Vec<Dependency>, CheckError> {
        let Some(target) = self.target() else {
            return Ok(vec![]);
        };
        if let Some(token) = &self.script.cancels {
            token.cancel();
        }
        let previous =
            (!self.script.drop_provenance).then(|| self.dependency.version().to_string());
        let mut updated = vec![Dependency::new(
            &self.dependency.name,
            Some(target.to_string()),
            vec![],
            PackageManager::Cargo,
        )
        .with_previous_version(previous)];
        for (name, version) in &self.script.companions {
            updated.push(Dependency::new(
                name,
                Some(version.clone()),
                vec![],
                PackageManager::Cargo,
            ));
        }
        Ok(updated)
    }

    async fn generate_notices(&self) -> Result<Vec<Notice>, CheckError> {
        Ok(vec![Notice::info("Updated", self.dependency.name.clone())])
    }
}

/// Hands out scripted checkers and counts checker creation per dependency
#[derive(Default)]
struct ScriptedFactory {
    scripts: HashMap<String, Script>,
    created: Mutex<Vec<String>>,
}

impl ScriptedFactory {
    fn new(scripts: Vec<(&str, Script)>) -> Self {
        Self {
            scripts: scripts
                .into_iter()
                .map(|(name, script)| (name.to_string(), script))
                .collect(),
            created: Mutex::new(Vec::new()),
        }
    }

    fn created_for(&self, name: &str) -> usize {
        self.created.lock().unwrap().iter().filter(|n| *n == name).count()
    }
}

impl UpdateCheckerFactory for ScriptedFactory {
    fn create(&self, context: CheckerContext) -> Box<dyn UpdateChecker> {
        let name = context.dependency.name.clone();
        self.created.lock().unwrap().push(name.clone());
        Box::new(ScriptedChecker {
            dependency: context.dependency,
            script: self.scripts.get(&name).cloned().unwrap_or_default(),
        })
    }
}

struct Harness {
    factory: Arc<ScriptedFactory>,
    errors: Arc<RecordingErrorHandler>,
    compiler: GroupCompiler,
}

fn harness(scripts: Vec<(&str, Script)>) -> Harness {
    let factory = Arc::new(ScriptedFactory::new(scripts));
    let errors = Arc::new(RecordingErrorHandler::new());
    let compiler = GroupCompiler::new(
        Arc::new(LineParser),
        UpdateDecisionEngine::new(factory.clone()),
        Arc::new(LineBuilder),
        errors.clone(),
    );
    Harness {
        factory,
        errors,
        compiler,
    }
}

fn snapshot(content: &str) -> Snapshot {
    let files = vec![DependencyFile::new(DEPS_FILE, "/", content)];
    Snapshot::parse(PackageManager::Cargo, "/", files, &LineParser).unwrap()
}

fn group(name: &str, members: &[&str]) -> DependencyGroup {
    DependencyGroup::new(name, members.iter().map(|m| m.to_string()).collect())
}

const PROJECT: &str = "alpha = 1.0.0\nbeta = 2.0.0\ngamma = 0.3.0\n";

mod compile {
    use super::*;

    #[tokio::test]
    async fn test_group_merges_every_member() {
        let h = harness(vec![
            ("alpha", target("1.1.0")),
            ("beta", target("2.0.5")),
            ("gamma", target("0.4.0")),
        ]);
        let mut handled = HandledDependencies::new();

        let change = h
            .compiler
            .compile(&snapshot(PROJECT), &group("all", &["alpha", "beta", "gamma"]), &mut handled)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(change.dependency_names(), vec!["alpha", "beta", "gamma"]);
        assert_eq!(change.updated_dependency_files.len(), 1);
        assert_eq!(
            change.updated_dependency_files[0].content,
            "alpha = 1.1.0\nbeta = 2.0.5\ngamma = 0.4.0\n"
        );
        assert_eq!(change.notices.len(), 3);
        assert_eq!(handled.len(), 3);
    }

    #[tokio::test]
    async fn test_idempotent_reentry() {
        let scripts = || vec![("alpha", target("1.1.0")), ("gamma", target("0.4.0"))];
        let members = group("pair", &["alpha", "gamma"]);
        let snap = snapshot(PROJECT);

        let first = harness(scripts())
            .compiler
            .compile(&snap, &members, &mut HandledDependencies::new())
            .await
            .unwrap();
        let second = harness(scripts())
            .compiler
            .compile(&snap, &members, &mut HandledDependencies::new())
            .await
            .unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_merge_consistency() {
        let h = harness(vec![("alpha", target("1.1.0")), ("gamma", target("0.4.0"))]);
        let change = h
            .compiler
            .compile(
                &snapshot(PROJECT),
                &group("pair", &["alpha", "gamma"]),
                &mut HandledDependencies::new(),
            )
            .await
            .unwrap()
            .unwrap();

        let reparsed = LineParser.parse(&change.updated_dependency_files).unwrap();
        for updated in &change.updated_dependencies {
            let current = reparsed.iter().find(|d| d.name == updated.name).unwrap();
            assert_eq!(current.version, updated.version);
        }
        let beta = reparsed.iter().find(|d| d.name == "beta").unwrap();
        assert_eq!(beta.version(), "2.0.0");
    }

    #[tokio::test]
    async fn test_absent_member_skipped() {
        let h = harness(vec![("alpha", target("1.1.0"))]);
        let mut handled = HandledDependencies::new();
        let change = h
            .compiler
            .compile(&snapshot(PROJECT), &group("g", &["missing", "alpha"]), &mut handled)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(change.dependency_names(), vec!["alpha"]);
        assert!(!handled.contains("missing"));
        assert_eq!(h.factory.created_for("missing"), 0);
    }
}

mod handled_registry {
    use super::*;

    #[tokio::test]
    async fn test_at_most_once_across_groups() {
        let h = harness(vec![("alpha", target("1.1.0")), ("beta", target("2.1.0"))]);
        let snap = snapshot(PROJECT);
        let mut handled = HandledDependencies::new();

        let first = h
            .compiler
            .compile(&snap, &group("first", &["alpha"]), &mut handled)
            .await
            .unwrap()
            .unwrap();
        let second = h
            .compiler
            .compile(&snap, &group("second", &["alpha", "beta"]), &mut handled)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first.dependency_names(), vec!["alpha"]);
        assert_eq!(second.dependency_names(), vec!["beta"]);
        assert_eq!(h.factory.created_for("alpha"), 1);
    }

    #[tokio::test]
    async fn test_member_spelled_in_other_case_is_not_redecided() {
        let h = harness(vec![("alpha", target("1.1.0"))]);
        let snap = snapshot(PROJECT);
        let mut handled = HandledDependencies::new();

        let first = h
            .compiler
            .compile(&snap, &group("first", &["alpha"]), &mut handled)
            .await
            .unwrap()
            .unwrap();
        let second = h
            .compiler
            .compile(&snap, &group("second", &["Alpha"]), &mut handled)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first.dependency_names(), vec!["alpha"]);
        assert!(second.is_empty());
        assert_eq!(h.factory.created_for("alpha"), 1);
        assert_eq!(handled.len(), 1);
    }

    #[tokio::test]
    async fn test_up_to_date_dependency_is_handled() {
        let h = harness(vec![("alpha", target("1.0.0"))]);
        let mut handled = HandledDependencies::new();
        let change = h
            .compiler
            .compile(&snapshot(PROJECT), &group("g", &["alpha"]), &mut handled)
            .await
            .unwrap()
            .unwrap();

        assert!(change.is_empty());
        assert!(handled.contains("alpha"));
    }

    #[tokio::test]
    async fn test_lock_step_member_not_rechecked() {
        let h = harness(vec![(
            "alpha",
            Script {
                target: Some("1.1.0".to_string()),
                companions: vec![("beta".to_string(), "2.1.0".to_string())],
                ..Script::default()
            },
        )]);
        let mut handled = HandledDependencies::new();

        let change = h
            .compiler
            .compile(&snapshot(PROJECT), &group("linked", &["alpha", "beta"]), &mut handled)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(h.factory.created_for("beta"), 0);
        assert!(handled.contains("beta"));
        let beta = change
            .updated_dependencies
            .iter()
            .find(|d| d.name == "beta")
            .unwrap();
        assert_eq!(beta.version(), "2.1.0");
        assert_eq!(beta.previous_version.as_deref(), Some("2.0.0"));
        assert!(change.has_complete_provenance());
    }
}

mod admission {
    use super::*;

    async fn admitted(latest: &str) -> bool {
        let h = harness(vec![("delta", target(latest))]);
        let minor_only = group("minor", &["delta"]).with_update_types(vec![UpdateType::Minor]);
        let mut handled = HandledDependencies::new();
        let change = h
            .compiler
            .compile(&snapshot("delta = 1.2.3\n"), &minor_only, &mut handled)
            .await
            .unwrap()
            .unwrap();

        // A rejected dependency stays eligible for other groups
        assert_eq!(handled.contains("delta"), !change.is_empty());
        !change.is_empty()
    }

    #[tokio::test]
    async fn test_minor_bump_admitted() {
        assert!(admitted("1.3.0").await);
    }

    #[tokio::test]
    async fn test_major_bump_rejected() {
        assert!(!admitted("2.0.0").await);
    }

    #[tokio::test]
    async fn test_patch_bump_rejected() {
        assert!(!admitted("1.2.4").await);
    }

    #[tokio::test]
    async fn test_prerelease_rejected() {
        assert!(!admitted("1.2.3-beta").await);
    }

    #[tokio::test]
    async fn test_rejected_dependency_taken_by_later_group() {
        let h = harness(vec![("alpha", target("2.0.0"))]);
        let snap = snapshot(PROJECT);
        let mut handled = HandledDependencies::new();

        let patches = group("patches", &["alpha"]).with_update_types(vec![UpdateType::Patch]);
        let first = h.compiler.compile(&snap, &patches, &mut handled).await.unwrap().unwrap();
        let second = h
            .compiler
            .compile(&snap, &group("rest", &["alpha"]), &mut handled)
            .await
            .unwrap()
            .unwrap();

        assert!(first.is_empty());
        assert_eq!(second.dependency_names(), vec!["alpha"]);
    }
}

mod failures {
    use super::*;

    #[tokio::test]
    async fn test_failure_isolation() {
        let h = harness(vec![
            ("alpha", target("1.1.0")),
            (
                "beta",
                Script {
                    failure: Some("registry unreachable"),
                    ..Script::default()
                },
            ),
            (
                "gamma",
                Script {
                    failure: Some("inconsistent"),
                    ..Script::default()
                },
            ),
        ]);
        let mut handled = HandledDependencies::new();
        let snap = snapshot("alpha = 1.0.0\nbeta = 2.0.0\ngamma = 0.3.0\ndelta = 4.0.0\n");

        let change = h
            .compiler
            .compile(&snap, &group("mixed", &["beta", "gamma", "alpha"]), &mut handled)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(change.dependency_names(), vec!["alpha"]);
        assert!(handled.contains("beta"));
        assert!(handled.contains("gamma"));

        let records = h.errors.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].dependency, "beta");
        assert!(records[0].reported);
        assert_eq!(records[1].dependency, "gamma");
        assert_eq!(records[1].kind, "registry_inconsistency");
        assert!(!records[1].reported);
        assert_eq!(h.errors.reported_count(), 1);
    }

    #[tokio::test]
    async fn test_build_failure_reported_and_skipped() {
        let h = harness(vec![("unbuildable", target("2.0.0")), ("alpha", target("1.1.0"))]);
        let mut handled = HandledDependencies::new();

        let change = h
            .compiler
            .compile(
                &snapshot("unbuildable = 1.0.0\nalpha = 1.0.0\n"),
                &group("g", &["unbuildable", "alpha"]),
                &mut handled,
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(change.dependency_names(), vec!["alpha"]);
        let records = h.errors.records();
        assert_eq!(records[0].kind, "build_failure");
        assert!(records[0].reported);
    }
}

mod validation {
    use super::*;

    fn scripts() -> Vec<(&'static str, Script)> {
        vec![
            ("alpha", target("1.1.0")),
            (
                "beta",
                Script {
                    target: Some("2.1.0".to_string()),
                    drop_provenance: true,
                    ..Script::default()
                },
            ),
        ]
    }

    #[tokio::test]
    async fn test_gate_suppresses_change_without_provenance() {
        let h = harness(scripts());
        let compiler = h.compiler.with_options(CompilerOptions {
            validate_previous_versions: true,
        });
        let mut handled = HandledDependencies::new();

        let result = compiler
            .compile(&snapshot(PROJECT), &group("g", &["alpha", "beta"]), &mut handled)
            .await
            .unwrap();

        assert!(result.is_none());
        // The dependencies stay handled for the rest of the run
        assert!(handled.contains("alpha"));
        assert!(handled.contains("beta"));
    }

    #[tokio::test]
    async fn test_gate_disabled_keeps_change() {
        let h = harness(scripts());
        let change = h
            .compiler
            .compile(
                &snapshot(PROJECT),
                &group("g", &["alpha", "beta"]),
                &mut HandledDependencies::new(),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(change.update_count(), 2);
        assert!(!change.has_complete_provenance());
    }
}

mod lifecycle {
    use super::*;

    #[derive(Default)]
    struct TrackingWorkspace {
        events: Mutex<Vec<String>>,
    }

    impl Workspace for TrackingWorkspace {
        fn setup(&self, _path: &Path, directory: &str) -> io::Result<()> {
            self.events.lock().unwrap().push(format!("setup {}", directory));
            Ok(())
        }

        fn store_change(&self, memo: &str) -> io::Result<()> {
            self.events.lock().unwrap().push(format!("store {}", memo));
            Ok(())
        }

        fn cleanup(&self) {
            self.events.lock().unwrap().push("cleanup".to_string());
        }
    }

    #[tokio::test]
    async fn test_cancelled_before_start_emits_empty_change() {
        let token = CancellationToken::new();
        token.cancel();
        let h = harness(vec![("alpha", target("1.1.0"))]);
        let compiler = h.compiler.with_cancellation(token);
        let mut handled = HandledDependencies::new();

        let change = compiler
            .compile(&snapshot(PROJECT), &group("g", &["alpha"]), &mut handled)
            .await
            .unwrap()
            .unwrap();

        assert!(change.is_empty());
        assert!(handled.is_empty());
        assert_eq!(h.factory.created_for("alpha"), 0);
    }

    #[tokio::test]
    async fn test_cancelled_between_members_keeps_merged_state() {
        let token = CancellationToken::new();
        let h = harness(vec![
            (
                "alpha",
                Script {
                    target: Some("1.1.0".to_string()),
                    cancels: Some(token.clone()),
                    ..Script::default()
                },
            ),
            ("beta", target("2.1.0")),
        ]);
        let compiler = h.compiler.with_cancellation(token.clone());
        let mut handled = HandledDependencies::new();

        let change = compiler
            .compile(&snapshot(PROJECT), &group("g", &["alpha", "beta"]), &mut handled)
            .await
            .unwrap()
            .unwrap();

        assert!(token.is_cancelled());
        assert_eq!(change.dependency_names(), vec!["alpha"]);
        assert_eq!(change.updated_dependency_files.len(), 1);
        assert!(change.updated_dependency_files[0].content.contains("alpha = 1.1.0"));
        assert!(change.updated_dependency_files[0].content.contains("beta = 2.0.0"));
        assert_eq!(h.factory.created_for("beta"), 0);
        assert!(!handled.contains("beta"));
    }

    #[tokio::test]
    async fn test_workspace_released_after_pass() {
        let workspace = Arc::new(TrackingWorkspace::default());
        let h = harness(vec![("alpha", target("1.1.0")), ("beta", target("2.0.1"))]);
        let compiler = h.compiler.with_workspace(workspace.clone(), "/tmp/project");

        compiler
            .compile(
                &snapshot(PROJECT),
                &group("g", &["alpha", "beta"]),
                &mut HandledDependencies::new(),
            )
            .await
            .unwrap();

        let events = workspace.events.lock().unwrap().clone();
        assert_eq!(events.first().map(String::as_str), Some("setup /"));
        assert_eq!(events.last().map(String::as_str), Some("cleanup"));
        assert_eq!(events.iter().filter(|e| e.starts_with("store g: ")).count(), 2);
    }
}
