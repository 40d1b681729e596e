use treekeeper_core::config::FilterPatterns;
use treekeeper_core::plumbing;
use treekeeper_core::{BranchDriver, FilterConfig, NullObserver};

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
fn delete_drops_now_unwanted_files() -> TestResult {
    let repo = TempRepo::init()?;
    repo.commit_file("base/a.h", "one", "add a")?;
    repo.commit_file("base/win/b.h", "two", "add win-only b")?;
    let original_cursor = repo.head()?;

    // `current` carries both files as if an earlier, broader filter had let
    // `base/win/` through; the new filter excludes it.
    let filter = FilterConfig::compile(&FilterPatterns {
        want: vec!["base/.*".to_string()],
        want_exclude: vec!["base/win/.*".to_string()],
        always_want: vec![],
        keep: vec![],
        keep_exclude: vec![],
    })?;

    let driver = BranchDriver::new(&repo.runner, &filter);
    let new_head = driver.delete(&original_cursor, &original_cursor)?;

    let files = plumbing::list_files(&repo.runner, &new_head)?;
    let paths: Vec<String> = files.iter().map(|f| f.path_str().into_owned()).collect();
    assert!(paths.contains(&"base/a.h".to_string()));
    assert!(!paths.iter().any(|p| p.starts_with("base/win")));
    Ok(())
}

#[test]
fn delete_is_a_noop_when_nothing_is_dropped() -> TestResult {
    let repo = TempRepo::init()?;
    repo.commit_file("base/a.h", "one", "add a")?;
    let head = repo.head()?;

    let filter = wants_dir("base");
    let driver = BranchDriver::new(&repo.runner, &filter);
    let result = driver.delete(&head, &head)?;
    assert_eq!(result, head);
    Ok(())
}

#[test]
fn forward_rewrites_from_current_to_target() -> TestResult {
    let repo = TempRepo::init()?;
    let first = repo.commit_file("base/a.h", "one", "add a")?;
    let filter = wants_dir("base");

    let driver = BranchDriver::new(&repo.runner, &filter);
    // Seed `current` as the already-filtered state at `first` by rewriting
    // from an empty-tree seed commit, the same bootstrap a first real run
    // performs.
    let seed = plumbing::commit_tree(
        &repo.runner,
        plumbing::EMPTY_TREE,
        &[],
        &plumbing::Identity {
            name: "seed".into(),
            email: "seed@localhost".into(),
            time: 0,
            timezone: "+0000".into(),
        },
        b"seed\n",
    )?;
    let seeded = {
        let mut rewriter = treekeeper_core::HistoryRewriter::new(
            &repo.runner,
            &filter,
            &seed,
            treekeeper_core::RewriteOptions::default(),
        )?;
        rewriter.rewrite(&first, &NullObserver)?
    };

    let second = repo.commit_file("base/b.h", "two", "add b")?;
    let new_head = driver.forward(&seeded, &second, &NullObserver)?;

    let files = plumbing::list_files(&repo.runner, &new_head)?;
    let paths: Vec<String> = files.iter().map(|f| f.path_str().into_owned()).collect();
    assert!(paths.contains(&"base/a.h".to_string()));
    assert!(paths.contains(&"base/b.h".to_string()));
    Ok(())
}
