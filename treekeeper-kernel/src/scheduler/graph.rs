//! Dependency graph construction restricted to the verify-set (§4.6). A
//! package's raw "depended by" listing is filtered down to edges whose
//! target is also in `packages_to_verify`, and atom strings are stripped of
//! their version/revision suffix before comparison.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

static SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)(-[0-9.]+)?(-r[0-9]+)?$").expect("static regex"));

/// Strips the version (`-1.2.3`) and revision (`-r4`) suffixes from a
/// portage atom, returning the bare package name.
pub fn strip_version_suffix(atom: &str) -> String {
    let caps = SUFFIX
        .captures(atom.trim())
        .expect("regex with optional groups always matches");
    caps.get(1).map(|m| m.as_str()).unwrap_or(atom).to_string()
}

/// Parses one package's raw `depended-by`-style listing (one atom per
/// non-blank line) into bare package names.
pub fn parse_depended_by(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(strip_version_suffix)
        .collect()
}

/// Builds the dependency graph (`package -> packages that depend on it`)
/// restricted to edges inside `packages_to_verify`. `depended_by` supplies
/// each verify-set package's raw listing, keyed by bare package name.
pub fn build_dependency_graph(
    packages_to_verify: &[String],
    depended_by: &BTreeMap<String, Vec<String>>,
) -> BTreeMap<String, Vec<String>> {
    let verify_set: std::collections::BTreeSet<&str> =
        packages_to_verify.iter().map(String::as_str).collect();

    let mut graph: BTreeMap<String, Vec<String>> = packages_to_verify
        .iter()
        .map(|pkg| (pkg.clone(), Vec::new()))
        .collect();

    for package in packages_to_verify {
        let Some(dependents) = depended_by.get(package) else {
            continue;
        };
        for dependent in dependents {
            if verify_set.contains(dependent.as_str()) {
                graph
                    .get_mut(package)
                    .expect("package inserted above")
                    .push(dependent.clone());
            }
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_version_and_revision() {
        assert_eq!(strip_version_suffix("sys-libs/glibc-2.31-r9"), "sys-libs/glibc");
        assert_eq!(strip_version_suffix("chromeos-base/libchrome"), "chromeos-base/libchrome");
        assert_eq!(strip_version_suffix("dev-libs/foo-1.2"), "dev-libs/foo");
    }

    #[test]
    fn drops_edges_outside_verify_set() {
        let verify = vec!["a".to_string(), "b".to_string()];
        let mut depended_by = BTreeMap::new();
        depended_by.insert("a".to_string(), vec!["b".to_string(), "outside".to_string()]);
        let graph = build_dependency_graph(&verify, &depended_by);
        assert_eq!(graph.get("a").unwrap(), &vec!["b".to_string()]);
        assert!(graph.get("b").unwrap().is_empty());
    }
}
