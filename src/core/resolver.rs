//! Affected-set resolution
//!
//! Derives task-level and key-level affectedness from the set of affected
//! packages. Everything here is pure: inputs are borrowed, results are
//! freshly built values.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::core::config::{KeyDependencyMap, TaskName};

/// Mapping of task name to the packages that define it
pub type TaskPackageMap = BTreeMap<TaskName, BTreeSet<String>>;

/// Result of resolving affectedness for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolverResult {
    /// Packages turbo reported as affected
    pub affected_packages: BTreeSet<String>,
    /// Every declared task mapped to whether it is affected
    pub tasks: BTreeMap<TaskName, bool>,
    /// Every configured key mapped to whether it is affected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<BTreeMap<String, bool>>,
}

impl ResolverResult {
    /// Names of affected tasks
    pub fn affected_tasks(&self) -> impl Iterator<Item = &TaskName> {
        self.tasks
            .iter()
            .filter(|(_, affected)| **affected)
            .map(|(task, _)| task)
    }
}

/// Decide which declared tasks are affected
///
/// A task is affected when at least one package defining it is affected.
/// Tasks with no entry in `task_packages` are never affected.
pub fn affected_tasks(
    declared_tasks: &BTreeSet<TaskName>,
    affected_packages: &BTreeSet<String>,
    task_packages: &TaskPackageMap,
) -> BTreeMap<TaskName, bool> {
    declared_tasks
        .iter()
        .map(|task| {
            let affected = task_packages
                .get(task)
                .is_some_and(|packages| !packages.is_disjoint(affected_packages));
            (task.clone(), affected)
        })
        .collect()
}

/// Decide which user-defined keys are affected
///
/// A key is affected when any dependency names an affected package or an
/// affected task. Keys never reference other keys.
pub fn affected_keys(
    key_deps: &KeyDependencyMap,
    affected_packages: &BTreeSet<String>,
    tasks: &BTreeMap<TaskName, bool>,
) -> BTreeMap<String, bool> {
    let affected: BTreeSet<&str> = affected_packages
        .iter()
        .map(String::as_str)
        .chain(
            tasks
                .iter()
                .filter(|(_, affected)| **affected)
                .map(|(task, _)| task.as_str()),
        )
        .collect();

    key_deps
        .iter()
        .map(|(key, deps)| {
            let is_affected = deps.iter().any(|dep| affected.contains(dep.as_str()));
            (key.clone(), is_affected)
        })
        .collect()
}

/// Resolve task and key affectedness in a single pass
pub fn resolve(
    declared_tasks: &BTreeSet<TaskName>,
    affected_packages: &BTreeSet<String>,
    task_packages: &TaskPackageMap,
    key_deps: Option<&KeyDependencyMap>,
) -> ResolverResult {
    let tasks = affected_tasks(declared_tasks, affected_packages, task_packages);
    let keys = key_deps.map(|deps| affected_keys(deps, affected_packages, &tasks));

    ResolverResult {
        affected_packages: affected_packages.clone(),
        tasks,
        keys,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn task_packages(entries: &[(&str, &[&str])]) -> TaskPackageMap {
        entries
            .iter()
            .map(|(task, packages)| ((*task).to_string(), set(packages)))
            .collect()
    }

    fn key_deps(entries: &[(&str, &[&str])]) -> KeyDependencyMap {
        entries
            .iter()
            .map(|(key, deps)| {
                (
                    (*key).to_string(),
                    deps.iter().map(|d| (*d).to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_build_affected_test_not() {
        let declared = set(&["build", "test"]);
        let affected = set(&["pkg-a"]);
        let packages = task_packages(&[("build", &["pkg-a", "pkg-b"]), ("test", &["pkg-b"])]);

        let result = resolve(&declared, &affected, &packages, None);

        assert!(result.tasks["build"]);
        assert!(!result.tasks["test"]);
        assert_eq!(result.affected_tasks().collect::<Vec<_>>(), vec!["build"]);
        assert!(result.keys.is_none());
    }

    #[test]
    fn test_key_affected_via_package() {
        let declared = set(&["build", "test"]);
        let affected = set(&["pkg-c"]);
        let packages = task_packages(&[("build", &["pkg-a", "pkg-b"]), ("test", &["pkg-b"])]);
        let deps = key_deps(&[("deploy", &["build", "pkg-c"])]);

        let result = resolve(&declared, &affected, &packages, Some(&deps));

        assert!(!result.tasks["build"]);
        assert!(result.keys.unwrap()["deploy"]);
    }

    #[test]
    fn test_key_affected_via_task_only() {
        let declared = set(&["build"]);
        let affected = set(&["pkg-a"]);
        let packages = task_packages(&[("build", &["pkg-a"])]);
        let deps = key_deps(&[("deploy", &["build"]), ("docs", &["docs-site"])]);

        let keys = resolve(&declared, &affected, &packages, Some(&deps))
            .keys
            .unwrap();

        assert!(keys["deploy"]);
        assert!(!keys["docs"]);
    }

    #[test]
    fn test_key_affected_via_package_only() {
        let declared = BTreeSet::new();
        let affected = set(&["web"]);
        let deps = key_deps(&[("preview", &["web"])]);

        let keys = resolve(&declared, &affected, &TaskPackageMap::new(), Some(&deps))
            .keys
            .unwrap();

        assert!(keys["preview"]);
    }

    #[test]
    fn test_nothing_affected() {
        let declared = set(&["build", "test"]);
        let packages = task_packages(&[("build", &["pkg-a"]), ("test", &["pkg-b"])]);
        let deps = key_deps(&[("deploy", &["build", "pkg-a"]), ("empty", &[])]);

        let result = resolve(&declared, &BTreeSet::new(), &packages, Some(&deps));

        assert!(result.tasks.values().all(|affected| !affected));
        assert!(result.keys.unwrap().values().all(|affected| !affected));
    }

    #[test]
    fn test_no_declared_tasks() {
        let result = resolve(
            &BTreeSet::new(),
            &set(&["pkg-a"]),
            &TaskPackageMap::new(),
            None,
        );
        assert!(result.tasks.is_empty());
        assert_eq!(result.affected_packages, set(&["pkg-a"]));
    }

    #[test]
    fn test_task_without_packages_is_not_affected() {
        let declared = set(&["lint"]);
        let packages = task_packages(&[("lint", &[])]);

        let result = resolve(&declared, &set(&["pkg-a"]), &packages, None);
        assert!(!result.tasks["lint"]);

        let result = resolve(&declared, &set(&["pkg-a"]), &TaskPackageMap::new(), None);
        assert!(!result.tasks["lint"]);
    }

    #[test]
    fn test_keys_do_not_reference_keys() {
        let declared = set(&["build"]);
        let packages = task_packages(&[("build", &["pkg-a"])]);
        let deps = key_deps(&[("deploy", &["build"]), ("release", &["deploy"])]);

        let keys = resolve(&declared, &set(&["pkg-a"]), &packages, Some(&deps))
            .keys
            .unwrap();

        assert!(keys["deploy"]);
        assert!(!keys["release"]);
    }

    #[test]
    fn test_duplicate_dependencies_are_harmless() {
        let deps = key_deps(&[("deploy", &["web", "web", "web"])]);
        let keys = affected_keys(&deps, &set(&["web"]), &BTreeMap::new());
        assert_eq!(keys.len(), 1);
        assert!(keys["deploy"]);
    }

    #[test]
    fn test_undeclared_task_entries_are_ignored() {
        let declared = set(&["build"]);
        let packages = task_packages(&[("build", &["pkg-b"]), ("ghost", &["pkg-a"])]);

        let result = resolve(&declared, &set(&["pkg-a"]), &packages, None);
        assert_eq!(result.tasks.len(), 1);
        assert!(!result.tasks.contains_key("ghost"));
    }

    fn name() -> impl Strategy<Value = String> {
        "[a-e]"
    }

    fn names() -> impl Strategy<Value = BTreeSet<String>> {
        proptest::collection::btree_set(name(), 0..5)
    }

    fn inputs() -> impl Strategy<
        Value = (
            BTreeSet<String>,
            BTreeSet<String>,
            TaskPackageMap,
            KeyDependencyMap,
        ),
    > {
        (
            proptest::collection::btree_set("t[a-e]", 0..5),
            names(),
            proptest::collection::btree_map("t[a-e]", names(), 0..5),
            proptest::collection::btree_map(
                "k[a-e]",
                proptest::collection::vec(prop_oneof![name(), "t[a-e]"], 0..4),
                0..5,
            ),
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every declared task appears exactly once and nothing else does
        #[test]
        fn test_tasks_cover_declared((declared, affected, packages, _) in inputs()) {
            let result = resolve(&declared, &affected, &packages, None);
            prop_assert_eq!(
                result.tasks.keys().cloned().collect::<BTreeSet<_>>(),
                declared
            );
        }

        /// A task is affected iff its packages intersect the affected set
        #[test]
        fn test_task_affected_iff_intersection((declared, affected, packages, _) in inputs()) {
            let result = resolve(&declared, &affected, &packages, None);
            for (task, is_affected) in &result.tasks {
                let shared = packages
                    .get(task)
                    .map_or(0, |p| p.intersection(&affected).count());
                prop_assert_eq!(*is_affected, shared > 0);
            }
        }

        /// A key is affected iff a dependency is an affected package or task
        #[test]
        fn test_key_affected_iff_union_member((declared, affected, packages, deps) in inputs()) {
            let result = resolve(&declared, &affected, &packages, Some(&deps));
            let keys = result.keys.clone().unwrap();
            prop_assert_eq!(keys.len(), deps.len());

            for (key, dependencies) in &deps {
                let expected = dependencies.iter().any(|dep| {
                    affected.contains(dep) || result.tasks.get(dep).copied().unwrap_or(false)
                });
                prop_assert_eq!(keys[key], expected);
            }
        }

        /// Resolving twice gives identical results
        #[test]
        fn test_resolve_is_idempotent((declared, affected, packages, deps) in inputs()) {
            let first = resolve(&declared, &affected, &packages, Some(&deps));
            let second = resolve(&declared, &affected, &packages, Some(&deps));
            prop_assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
            prop_assert_eq!(first, second);
        }

        /// No affected packages means nothing is affected
        #[test]
        fn test_empty_affected_set((declared, _, packages, deps) in inputs()) {
            let result = resolve(&declared, &BTreeSet::new(), &packages, Some(&deps));
            prop_assert!(result.tasks.values().all(|a| !a));
            prop_assert!(result.keys.unwrap().values().all(|a| !a));
        }
    }
}
