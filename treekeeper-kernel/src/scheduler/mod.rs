//! Cross-board package scheduler (§4.6). A pure facts-to-decision function,
//! grounded in the original's `buildable_packages()`: packages whose
//! dependencies have all completed are "newly buildable"; if none are and
//! nothing is in flight, one arbitrary pending package is forced through to
//! break a dependency cycle rather than deadlock.

pub mod graph;

use std::collections::{BTreeMap, HashSet};

/// What the scheduler decided to do with a board's package set this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Every package has completed; nothing left to schedule.
    Done,
    /// Nothing new is buildable, but packages are still in flight — wait.
    Wait,
    /// These packages' dependencies are satisfied and they aren't already
    /// scheduled/completed; schedule all of them.
    Buildable(Vec<String>),
}

/// Decides what to schedule next for one board, given its dependency graph
/// (`package -> packages that depend on it`, restricted to the verify set)
/// and current scheduling state.
///
/// Mirrors the original's three-tier rule: prefer packages with no
/// unfinished dependency, else wait for in-flight work, else break a cycle
/// by forcing one pending package through.
pub fn buildable_packages(
    packages_to_verify: &[String],
    dependency_graph: &BTreeMap<String, Vec<String>>,
    scheduled: &HashSet<String>,
    completed: &HashSet<String>,
) -> Decision {
    if completed.len() >= packages_to_verify.len() {
        return Decision::Done;
    }

    let pending: Vec<&String> = packages_to_verify
        .iter()
        .filter(|pkg| !scheduled.contains(*pkg) && !completed.contains(*pkg))
        .collect();

    if pending.is_empty() {
        return if scheduled.is_empty() {
            Decision::Done
        } else {
            Decision::Wait
        };
    }

    // A package is newly buildable once nothing still depends on it that
    // hasn't completed yet — i.e. it has no outstanding "blocked by" edge.
    // `dependency_graph` records forward edges (package -> dependents), so a
    // package is buildable once none of ITS dependencies are still pending;
    // we derive "depends on" as the reverse of "depended by".
    let mut blocked_by: BTreeMap<&str, usize> = BTreeMap::new();
    for pkg in packages_to_verify {
        blocked_by.insert(pkg.as_str(), 0);
    }
    for (package, dependents) in dependency_graph {
        for dependent in dependents {
            if let Some(count) = blocked_by.get_mut(dependent.as_str()) {
                if !completed.contains(package) {
                    *count += 1;
                }
            }
        }
    }

    let newly_buildable: Vec<String> = pending
        .iter()
        .filter(|pkg| blocked_by.get(pkg.as_str()).copied().unwrap_or(0) == 0)
        .map(|pkg| (*pkg).clone())
        .collect();

    if !newly_buildable.is_empty() {
        return Decision::Buildable(newly_buildable);
    }

    if !scheduled.is_empty() {
        return Decision::Wait;
    }

    // Nothing is buildable and nothing is in flight: every remaining package
    // is blocked on another remaining package, i.e. a dependency cycle.
    // Force one through arbitrarily so the whole board doesn't deadlock.
    Decision::Buildable(vec![pending[0].clone()])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &str)]) -> BTreeMap<String, Vec<String>> {
        let mut g: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (from, to) in edges {
            g.entry(from.to_string()).or_default().push(to.to_string());
        }
        g
    }

    #[test]
    fn roots_are_buildable_first() {
        let packages = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        // a -> b -> c (a depended-by b, b depended-by c)
        let g = graph(&[("a", "b"), ("b", "c")]);
        let scheduled = HashSet::new();
        let completed = HashSet::new();
        let decision = buildable_packages(&packages, &g, &scheduled, &completed);
        assert_eq!(decision, Decision::Buildable(vec!["a".to_string()]));
    }

    #[test]
    fn waits_when_only_in_flight_work_remains() {
        let packages = vec!["a".to_string(), "b".to_string()];
        let g = graph(&[("a", "b")]);
        let mut scheduled = HashSet::new();
        scheduled.insert("a".to_string());
        let completed = HashSet::new();
        let decision = buildable_packages(&packages, &g, &scheduled, &completed);
        assert_eq!(decision, Decision::Wait);
    }

    #[test]
    fn breaks_cycle_when_nothing_in_flight() {
        let packages = vec!["a".to_string(), "b".to_string()];
        let g = graph(&[("a", "b"), ("b", "a")]);
        let scheduled = HashSet::new();
        let completed = HashSet::new();
        let decision = buildable_packages(&packages, &g, &scheduled, &completed);
        match decision {
            Decision::Buildable(pkgs) => assert_eq!(pkgs.len(), 1),
            other => panic!("expected a forced single package, got {other:?}"),
        }
    }

    #[test]
    fn done_when_all_completed() {
        let packages = vec!["a".to_string()];
        let g = graph(&[]);
        let scheduled = HashSet::new();
        let mut completed = HashSet::new();
        completed.insert("a".to_string());
        assert_eq!(
            buildable_packages(&packages, &g, &scheduled, &completed),
            Decision::Done
        );
    }
}
