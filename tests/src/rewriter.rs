use treekeeper_core::config::FilterPatterns;
use treekeeper_core::plumbing;
use treekeeper_core::{FilterConfig, HistoryRewriter, NullObserver, RewriteOptions};

use crate::fixtures::{TempRepo, TestResult};

fn wants_dir(name: &str) -> FilterConfig {
    FilterConfig::compile(&FilterPatterns {
        want: vec![format!("{name}/.*")],
        want_exclude: vec![],
        always_want: vec![],
        keep: vec![],
        keep_exclude: vec![],
    })
    .unwrap()
}

#[test]
fn first_rewrite_reproduces_from_scratch_filtering() -> TestResult {
    let repo = TempRepo::init()?;
    repo.commit_file("base/a.h", "one", "add a")?;
    repo.commit_file("third_party/x.h", "two", "add unwanted x")?;
    let last = repo.commit_file("base/b.h", "three", "add b")?;

    let filter = wants_dir("base");
    // No filtered branch exists yet: seed an empty one pointing nowhere by
    // committing an empty tree as the "current" head of a not-yet-existing
    // filtered branch, mirroring how a first run synthesizes ROOT.
    let empty_tree = plumbing::EMPTY_TREE.to_string();
    let seed = plumbing::commit_tree(
        &repo.runner,
        &empty_tree,
        &[],
        &plumbing::Identity {
            name: "seed".into(),
            email: "seed@localhost".into(),
            time: 0,
            timezone: "+0000".into(),
        },
        b"seed\n",
    )?;

    let mut rewriter = HistoryRewriter::new(&repo.runner, &filter, &seed, RewriteOptions::default())?;
    let head = rewriter.rewrite(&last, &NullObserver)?;

    let files = plumbing::list_files(&repo.runner, &head)?;
    let paths: Vec<String> = files.iter().map(|f| f.path_str().into_owned()).collect();
    assert!(paths.contains(&"base/a.h".to_string()));
    assert!(paths.contains(&"base/b.h".to_string()));
    assert!(!paths.iter().any(|p| p.starts_with("third_party")));

    let upstream_files = plumbing::list_files(&repo.runner, &last)?;
    let expected = filter.filter_files(&[], &upstream_files);
    let expected_tree = plumbing::make_tree(&repo.runner, &expected)?;
    let meta = plumbing::get_metadata(&repo.runner, &head)?;
    assert_eq!(meta.tree, expected_tree);

    Ok(())
}

#[test]
fn resuming_only_processes_new_commits() -> TestResult {
    let repo = TempRepo::init()?;
    let first = repo.commit_file("base/a.h", "one", "add a")?;
    let filter = wants_dir("base");

    let empty_tree = plumbing::EMPTY_TREE.to_string();
    let seed = plumbing::commit_tree(
        &repo.runner,
        &empty_tree,
        &[],
        &plumbing::Identity {
            name: "seed".into(),
            email: "seed@localhost".into(),
            time: 0,
            timezone: "+0000".into(),
        },
        b"seed\n",
    )?;

    let mut rewriter = HistoryRewriter::new(&repo.runner, &filter, &seed, RewriteOptions::default())?;
    let head_after_first = rewriter.rewrite(&first, &NullObserver)?;

    let second = repo.commit_file("base/b.h", "two", "add b")?;
    let mut resumed = HistoryRewriter::new(&repo.runner, &filter, &head_after_first, RewriteOptions::default())?;
    let head_after_second = resumed.rewrite(&second, &NullObserver)?;

    let meta = plumbing::get_metadata(&repo.runner, &head_after_second)?;
    assert_eq!(meta.parents, vec![head_after_first]);
    Ok(())
}
