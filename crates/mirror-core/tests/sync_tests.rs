//! Tests for the TreeSynchronizer

use std::sync::Arc;

use mirror_core::{MemoryLogger, SyncAction, SyncConfig, SyncOptions, TreeSynchronizer};
use mirror_fs::{DigestAlgorithm, NormalizedPath};
use mirror_test_utils::TestTrees;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn synchronizer(trees: &TestTrees) -> (TreeSynchronizer, Arc<MemoryLogger>) {
    let logger = Arc::new(MemoryLogger::new());
    let sync = TreeSynchronizer::new(trees.source(), trees.replica(), Arc::clone(&logger));
    (sync, logger)
}

fn paths(actions: impl Iterator<Item = impl AsRef<str>>) -> Vec<String> {
    actions.map(|p| p.as_ref().to_string()).collect()
}

#[test]
fn test_empty_trees_are_a_noop() {
    let trees = TestTrees::new();
    let (sync, logger) = synchronizer(&trees);

    let report = sync.run();

    assert!(report.success);
    assert!(report.is_noop());
    assert_eq!(
        logger.messages(),
        vec![
            "Starting synchronization...",
            "Both source and replica folders are empty. No synchronization needed.",
            "Synchronization finished.",
        ]
    );
    assert_eq!(std::fs::read_dir(trees.replica()).unwrap().count(), 0);
}

#[test]
fn test_empty_directories_alone_are_a_noop() {
    let trees = TestTrees::new();
    std::fs::create_dir_all(trees.source().join("only/dirs")).unwrap();
    std::fs::create_dir_all(trees.replica().join("left/over")).unwrap();
    let (sync, logger) = synchronizer(&trees);

    let report = sync.run();

    assert!(report.is_noop());
    assert!(
        logger
            .messages()
            .iter()
            .any(|m| m.contains("No synchronization needed"))
    );
    // Directories are not synchronized on their own
    assert!(trees.replica().join("left/over").is_dir());
    assert!(!trees.replica().join("only").exists());
}

#[test]
fn test_new_files_are_copied() {
    let trees = TestTrees::new();
    trees.write_source("a.txt", "alpha");
    trees.write_source("dir/b.txt", "beta");
    let (sync, _logger) = synchronizer(&trees);

    let report = sync.run();

    assert!(report.success);
    assert_eq!(paths(report.copies()), vec!["a.txt", "dir/b.txt"]);
    assert_eq!(report.deletions().count(), 0);
    trees.assert_mirrored();
}

#[test]
fn test_nested_directories_are_created() {
    let trees = TestTrees::new();
    trees.write_source("a/b/c/deep.txt", "deep content");
    let (sync, _logger) = synchronizer(&trees);

    let report = sync.run();

    assert!(report.success);
    assert!(trees.replica().join("a/b/c").is_dir());
    assert_eq!(trees.read_replica("a/b/c/deep.txt"), b"deep content");
}

#[test]
fn test_stale_files_are_deleted() {
    let trees = TestTrees::new();
    trees.write_source("keep.txt", "keep");
    trees.write_replica("keep.txt", "keep");
    trees.write_replica("gone.txt", "stale");
    trees.write_replica("sub/gone-too.txt", "stale");
    let (sync, logger) = synchronizer(&trees);

    let report = sync.run();

    assert!(report.success);
    assert_eq!(paths(report.deletions()), vec!["gone.txt", "sub/gone-too.txt"]);
    assert_eq!(report.copies().count(), 0);
    trees.assert_replica_not_exists("gone.txt");
    trees.assert_replica_not_exists("sub/gone-too.txt");
    assert!(logger.messages().contains(&"Deleted from replica: gone.txt".to_string()));
    trees.assert_mirrored();
}

#[test]
fn test_deletion_is_logged_before_copy() {
    let trees = TestTrees::new();
    trees.write_source("a/new.txt", "new");
    trees.write_replica("a/old.txt", "old");
    let (sync, logger) = synchronizer(&trees);

    let report = sync.run();

    assert!(report.success);
    trees.assert_replica_not_exists("a/old.txt");
    assert_eq!(trees.read_replica("a/new.txt"), b"new");
    assert_eq!(
        report.actions,
        vec![
            SyncAction::delete(NormalizedPath::new("a/old.txt")),
            SyncAction::copy(NormalizedPath::new("a/new.txt")),
        ]
    );
    assert_eq!(
        logger.messages(),
        vec![
            "Starting synchronization...",
            "Deleted from replica: a/old.txt",
            "Copied/updated: a/new.txt",
            "Synchronization finished.",
        ]
    );
}

#[test]
fn test_changed_content_is_overwritten_once() {
    let trees = TestTrees::new();
    trees.write_source("report.txt", "version 2");
    trees.write_replica("report.txt", "version 1");
    let (sync, logger) = synchronizer(&trees);

    let report = sync.run();

    assert!(report.success);
    assert_eq!(
        report.actions,
        vec![SyncAction::copy(NormalizedPath::new("report.txt"))]
    );
    assert_eq!(trees.read_replica("report.txt"), b"version 2");
    let copies = logger
        .messages()
        .iter()
        .filter(|m| m.as_str() == "Copied/updated: report.txt")
        .count();
    assert_eq!(copies, 1);
}

#[test]
fn test_changed_content_of_different_length_is_overwritten() {
    let trees = TestTrees::new();
    trees.write_source("report.txt", "a much longer second version");
    trees.write_replica("report.txt", "v1");
    let (sync, _logger) = synchronizer(&trees);

    let report = sync.run();

    assert_eq!(paths(report.copies()), vec!["report.txt"]);
    trees.assert_mirrored();
}

#[test]
fn test_identical_content_is_left_alone() {
    let trees = TestTrees::new();
    trees.write_source("report.txt", "same");
    trees.write_replica("report.txt", "same");
    let (sync, logger) = synchronizer(&trees);

    let report = sync.run();

    assert!(report.is_noop());
    assert_eq!(
        logger.messages(),
        vec!["Starting synchronization...", "Synchronization finished."]
    );
}

#[rstest]
#[case::md5(DigestAlgorithm::Md5)]
#[case::sha256(DigestAlgorithm::Sha256)]
fn test_second_run_is_idempotent(#[case] algorithm: DigestAlgorithm) {
    let trees = TestTrees::new();
    trees.write_source("one.txt", "1");
    trees.write_source("x/two.txt", "2");
    trees.write_replica("x/two.txt", "old two");
    trees.write_replica("three.txt", "3");
    let (sync, logger) = synchronizer(&trees);
    let sync = sync.with_options(SyncOptions {
        algorithm,
        dry_run: false,
    });

    let first = sync.run();
    assert!(first.success);
    let after_first = trees.replica_snapshot();

    logger.clear();
    let second = sync.run();

    assert!(second.is_noop());
    assert_eq!(trees.replica_snapshot(), after_first);
    assert_eq!(
        logger.messages(),
        vec!["Starting synchronization...", "Synchronization finished."]
    );
}

#[test]
fn test_dry_run_reports_without_mutating() {
    let trees = TestTrees::new();
    trees.write_source("new.txt", "new");
    trees.write_source("changed.txt", "after");
    trees.write_replica("changed.txt", "before");
    trees.write_replica("stale.txt", "stale");
    let (sync, logger) = synchronizer(&trees);
    let sync = sync.with_options(SyncOptions {
        dry_run: true,
        ..SyncOptions::default()
    });
    let before = trees.replica_snapshot();

    let report = sync.run();

    assert!(report.success);
    assert_eq!(paths(report.deletions()), vec!["stale.txt"]);
    assert_eq!(paths(report.copies()), vec!["changed.txt", "new.txt"]);
    assert_eq!(trees.replica_snapshot(), before);
    assert_eq!(
        logger.messages(),
        vec![
            "Starting synchronization...",
            "[dry-run] Would delete from replica: stale.txt",
            "[dry-run] Would copy/update: changed.txt",
            "[dry-run] Would copy/update: new.txt",
            "Synchronization finished.",
        ]
    );
}

#[test]
fn test_file_replacing_directory_in_replica() {
    let trees = TestTrees::new();
    trees.write_source("entry", "now a file");
    trees.write_replica("entry/nested/old.txt", "was a directory");
    let (sync, _logger) = synchronizer(&trees);

    let report = sync.run();

    assert!(report.success, "run failed: {:?}", report.error);
    assert_eq!(paths(report.deletions()), vec!["entry/nested/old.txt"]);
    assert_eq!(paths(report.copies()), vec!["entry"]);
    trees.assert_mirrored();
}

#[test]
fn test_directory_replacing_file_in_replica() {
    let trees = TestTrees::new();
    trees.write_source("entry/inner.txt", "inside a directory");
    trees.write_replica("entry", "was a file");
    let (sync, _logger) = synchronizer(&trees);

    let report = sync.run();

    assert!(report.success, "run failed: {:?}", report.error);
    assert_eq!(paths(report.deletions()), vec!["entry"]);
    assert_eq!(paths(report.copies()), vec!["entry/inner.txt"]);
    trees.assert_mirrored();
}

#[test]
fn test_missing_replica_root_fails_the_run() {
    let trees = TestTrees::new();
    trees.write_source("a.txt", "a");
    let logger = Arc::new(MemoryLogger::new());
    let sync = TreeSynchronizer::new(
        trees.source(),
        trees.root().join("no-such-replica"),
        Arc::clone(&logger),
    );

    let report = sync.run();

    assert!(!report.success);
    assert!(report.actions.is_empty());
    let error = report.error.unwrap();
    assert!(error.contains("no-such-replica"), "got: {}", error);

    let messages = logger.messages();
    assert_eq!(messages.first().unwrap(), "Starting synchronization...");
    assert_eq!(
        messages.last().unwrap(),
        &format!("[ERROR] Synchronization failed: {}", error)
    );
    assert!(!messages.iter().any(|m| m == "Synchronization finished."));
}

#[cfg(unix)]
#[test]
fn test_first_failure_aborts_rest_of_run() {
    let trees = TestTrees::new();
    trees.write_replica("stale.txt", "stale");
    // "blocked" must become a file, but the replica holds a directory with
    // an entry the index never sees
    trees.write_source("blocked", "file");
    trees.write_source("later.txt", "after the failure");
    std::fs::create_dir_all(trees.replica().join("blocked")).unwrap();
    std::os::unix::fs::symlink("/nonexistent", trees.replica().join("blocked/link")).unwrap();
    let (sync, logger) = synchronizer(&trees);

    let report = sync.run();

    assert!(!report.success);
    // The deletion pass completed before the failing copy
    assert_eq!(
        report.actions,
        vec![SyncAction::delete(NormalizedPath::new("stale.txt"))]
    );
    trees.assert_replica_not_exists("stale.txt");
    // Nothing after the failing path was attempted
    trees.assert_replica_not_exists("later.txt");

    let error = report.error.unwrap();
    assert!(error.starts_with("Failed to replace directory blocked"), "got: {}", error);
    assert!(
        logger
            .messages()
            .last()
            .unwrap()
            .starts_with("[ERROR] Synchronization failed: Failed to replace directory blocked")
    );

    // The next run re-evaluates from scratch and fails the same way
    let retry = sync.run();
    assert!(!retry.success);
    assert!(retry.actions.is_empty());
}

#[test]
fn test_from_config_uses_validated_roots_and_algorithm() {
    let trees = TestTrees::new();
    trees.write_source("f.txt", "content");
    let mut config = SyncConfig::new(trees.source(), trees.replica(), trees.logs());
    config.algorithm = DigestAlgorithm::Sha256;
    let validated = config.validate().unwrap();

    let sync = TreeSynchronizer::from_config(&validated, MemoryLogger::new());

    assert_eq!(sync.options().algorithm, DigestAlgorithm::Sha256);
    assert!(!sync.options().dry_run);
    assert_eq!(sync.source(), validated.source());
    assert_eq!(sync.replica(), validated.replica());
    assert!(sync.run().success);
    trees.assert_mirrored();
}

#[test]
fn test_binary_content_is_copied_exactly() {
    let trees = TestTrees::new();
    let content: Vec<u8> = (0..=255u8).cycle().take(70_000).collect();
    trees.write_source("blob.bin", &content);
    trees.write_replica("blob.bin", vec![0u8; content.len()]);
    let (sync, _logger) = synchronizer(&trees);

    let report = sync.run();

    assert_eq!(paths(report.copies()), vec!["blob.bin"]);
    assert_eq!(trees.read_replica("blob.bin"), content);
}

#[test]
fn test_from_config_with_dry_run_keeps_algorithm() {
    let trees = TestTrees::new();
    trees.write_source("f.txt", "content");
    let mut config = SyncConfig::new(trees.source(), trees.replica(), trees.logs());
    config.algorithm = DigestAlgorithm::Sha256;
    let validated = config.validate().unwrap();

    let sync = TreeSynchronizer::from_config(&validated, MemoryLogger::new()).with_dry_run(true);

    assert_eq!(sync.options().algorithm, DigestAlgorithm::Sha256);
    assert!(sync.options().dry_run);
    assert_eq!(paths(sync.run().copies()), vec!["f.txt"]);
    trees.assert_replica_not_exists("f.txt");
}

#[cfg(unix)]
mod symlinks {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::os::unix::fs::symlink;

    #[test]
    fn test_replica_file_symlink_is_replaced_not_written_through() {
        let trees = TestTrees::new();
        let outside = trees.root().join("outside.txt");
        fs::write(&outside, "outside bytes").unwrap();
        trees.write_source("f.txt", "source bytes");
        symlink(&outside, trees.replica().join("f.txt")).unwrap();
        let (sync, _logger) = synchronizer(&trees);

        let report = sync.run();

        assert!(report.success, "run failed: {:?}", report.error);
        assert_eq!(paths(report.copies()), vec!["f.txt"]);
        assert_eq!(fs::read_to_string(&outside).unwrap(), "outside bytes");
        let meta = fs::symlink_metadata(trees.replica().join("f.txt")).unwrap();
        assert!(meta.file_type().is_file());
        trees.assert_mirrored();
    }

    #[test]
    fn test_replica_symlink_with_identical_content_is_still_replaced() {
        let trees = TestTrees::new();
        let outside = trees.root().join("outside.txt");
        fs::write(&outside, "same").unwrap();
        trees.write_source("f.txt", "same");
        symlink(&outside, trees.replica().join("f.txt")).unwrap();
        let (sync, _logger) = synchronizer(&trees);

        let report = sync.run();

        assert_eq!(paths(report.copies()), vec!["f.txt"]);
        assert!(!fs::symlink_metadata(trees.replica().join("f.txt")).unwrap().file_type().is_symlink());
        assert!(outside.is_file());

        // Converged: nothing left to do
        assert!(sync.run().is_noop());
    }

    #[test]
    fn test_symlinked_replica_directory_is_not_followed() {
        let trees = TestTrees::new();
        let outside_dir = trees.root().join("outside_dir");
        fs::create_dir_all(&outside_dir).unwrap();
        fs::write(outside_dir.join("kept.txt"), "untouched").unwrap();
        trees.write_source("d/new.txt", "new");
        symlink(&outside_dir, trees.replica().join("d")).unwrap();
        let (sync, _logger) = synchronizer(&trees);

        let report = sync.run();

        assert!(report.success, "run failed: {:?}", report.error);
        assert_eq!(paths(report.copies()), vec!["d/new.txt"]);
        assert!(!outside_dir.join("new.txt").exists());
        assert_eq!(fs::read_to_string(outside_dir.join("kept.txt")).unwrap(), "untouched");
        let meta = fs::symlink_metadata(trees.replica().join("d")).unwrap();
        assert!(meta.file_type().is_dir());
        trees.assert_mirrored();
    }

    #[test]
    fn test_dry_run_leaves_replica_symlink_in_place() {
        let trees = TestTrees::new();
        let outside = trees.root().join("outside.txt");
        fs::write(&outside, "outside bytes").unwrap();
        trees.write_source("f.txt", "source bytes");
        symlink(&outside, trees.replica().join("f.txt")).unwrap();
        let (sync, logger) = synchronizer(&trees);
        let sync = sync.with_dry_run(true);

        let report = sync.run();

        assert_eq!(paths(report.copies()), vec!["f.txt"]);
        assert!(logger.messages().contains(&"[dry-run] Would copy/update: f.txt".to_string()));
        assert!(fs::symlink_metadata(trees.replica().join("f.txt")).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&outside).unwrap(), "outside bytes");
    }

    #[test]
    fn test_source_symlinks_are_not_copied() {
        let trees = TestTrees::new();
        let outside = trees.root().join("outside.txt");
        fs::write(&outside, "linked file").unwrap();
        let outside_dir = trees.root().join("outside_dir");
        fs::create_dir_all(&outside_dir).unwrap();
        fs::write(outside_dir.join("inner.txt"), "linked dir").unwrap();
        trees.write_source("real.txt", "real");
        symlink(&outside, trees.source().join("link.txt")).unwrap();
        symlink(&outside_dir, trees.source().join("linked_dir")).unwrap();
        let (sync, _logger) = synchronizer(&trees);

        let report = sync.run();

        assert!(report.success);
        assert_eq!(paths(report.copies()), vec!["real.txt"]);
        trees.assert_replica_not_exists("link.txt");
        trees.assert_replica_not_exists("linked_dir");
        assert_eq!(trees.read_replica("real.txt"), b"real");
    }
}
