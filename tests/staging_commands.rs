use crate::common::command::{
    branch_tip, commit_files, init_repository_dir, read_history, repository_dir,
    run_twig_command, twig_commit,
};
use crate::common::file::{FileSpec, read_file, write_file, write_generated_files};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

mod common;

fn stage_document(dir: &std::path::Path) -> serde_json::Value {
    let content = read_file(&dir.join(".twig").join("stage.json"));
    serde_json::from_str(&content).expect("Failed to parse stage document")
}

fn staged_digest(dir: &std::path::Path, file_name: &str) -> Option<String> {
    stage_document(dir)["tracking"][file_name]
        .as_str()
        .map(str::to_string)
}

fn object_path(dir: &std::path::Path, digest: &str) -> std::path::PathBuf {
    dir.join(".twig")
        .join("objects")
        .join(&digest[..2])
        .join(&digest[2..])
}

#[rstest]
fn add_stages_nested_files(repository_dir: TempDir) {
    let dir = repository_dir.path();
    run_twig_command(dir, &["init"]).assert().success();
    write_file(FileSpec::new(dir.join("1.txt"), "one".to_string()));
    write_file(FileSpec::new(dir.join("a").join("b").join("3.txt"), "three".to_string()));

    run_twig_command(dir, &["add", "."]).assert().success();

    let digest = staged_digest(dir, "a/b/3.txt").expect("nested file is staged");
    assert!(staged_digest(dir, "1.txt").is_some());
    assert!(object_path(dir, &digest).is_file());
}

#[rstest]
fn add_missing_file_fails_without_staging(repository_dir: TempDir) {
    let dir = repository_dir.path();
    run_twig_command(dir, &["init"]).assert().success();

    run_twig_command(dir, &["add", "missing.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No file with that name exists"));

    assert_eq!(stage_document(dir)["tracking"], serde_json::json!({}));
}

#[rstest]
fn identical_files_share_one_stored_copy(repository_dir: TempDir) {
    let dir = repository_dir.path();
    run_twig_command(dir, &["init"]).assert().success();
    write_file(FileSpec::new(dir.join("x.txt"), "same".to_string()));
    write_file(FileSpec::new(dir.join("y.txt"), "same".to_string()));

    run_twig_command(dir, &["add", "."]).assert().success();

    assert_eq!(staged_digest(dir, "x.txt"), staged_digest(dir, "y.txt"));
    let objects = read_file(&dir.join(".twig").join("objects.json"));
    let objects: serde_json::Value = serde_json::from_str(&objects).unwrap();
    assert_eq!(objects["records"].as_object().unwrap().len(), 1);
}

#[rstest]
fn hash_object_matches_staged_digest(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(FileSpec::new(dir.join("new.txt"), "fresh".to_string()));

    let output = run_twig_command(dir, &["hash-object", "new.txt"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let digest = String::from_utf8(output).unwrap().trim().to_string();
    assert_eq!(digest.len(), 40);
    assert!(!object_path(dir, &digest).exists());

    run_twig_command(dir, &["hash-object", "-w", "new.txt"])
        .assert()
        .success()
        .stdout(format!("{digest}\n"));
    run_twig_command(dir, &["cat-file", &digest])
        .assert()
        .success()
        .stdout("fresh");
}

#[rstest]
fn cat_file_of_unknown_digest_fails(init_repository_dir: TempDir) {
    run_twig_command(
        init_repository_dir.path(),
        &["cat-file", &"0".repeat(40)],
    )
    .assert()
    .failure()
    .stderr(predicate::str::contains("no stored content"));
}

#[rstest]
fn rm_unstages_and_drops_unreferenced_copy(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(FileSpec::new(dir.join("draft.txt"), "draft".to_string()));
    run_twig_command(dir, &["add", "draft.txt"]).assert().success();
    let digest = staged_digest(dir, "draft.txt").unwrap();

    run_twig_command(dir, &["rm", "draft.txt"]).assert().success();

    assert_eq!(staged_digest(dir, "draft.txt"), None);
    assert!(!object_path(dir, &digest).exists());
    assert!(dir.join("draft.txt").is_file());
}

#[rstest]
fn rm_keeps_copy_referenced_by_a_commit(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    run_twig_command(dir, &["add", "1.txt"]).assert().success();
    let digest = staged_digest(dir, "1.txt").unwrap();

    run_twig_command(dir, &["rm", "1.txt"]).assert().success();

    assert_eq!(staged_digest(dir, "1.txt"), None);
    assert!(object_path(dir, &digest).is_file());
    run_twig_command(dir, &["cat-file", &digest])
        .assert()
        .success()
        .stdout("one");
}

#[rstest]
fn rm_of_committed_file_leaves_it_out_of_next_commit(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    let first = branch_tip(dir, "master").unwrap();

    run_twig_command(dir, &["rm", "1.txt"]).assert().success();
    assert_eq!(stage_document(dir)["removed"], serde_json::json!(["1.txt"]));
    twig_commit(dir, "Drop one").assert().success();

    let tip = branch_tip(dir, "master").unwrap();
    assert_eq!(commit_files(dir, &tip), vec!["a/2.txt", "a/b/3.txt"]);
    assert_eq!(commit_files(dir, &first), vec!["1.txt", "a/2.txt", "a/b/3.txt"]);
    assert!(dir.join("1.txt").is_file());
    assert_eq!(stage_document(dir)["removed"], serde_json::json!([]));
}

#[rstest]
fn restaging_cancels_a_pending_removal(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();

    run_twig_command(dir, &["rm", "1.txt"]).assert().success();
    run_twig_command(dir, &["add", "1.txt"]).assert().success();

    twig_commit(dir, "Nothing really changed")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No changes added to the commit."));
}

#[rstest]
fn rm_of_unstaged_file_fails(init_repository_dir: TempDir) {
    run_twig_command(init_repository_dir.path(), &["rm", "nothing.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'nothing.txt' is not staged"));
}

#[rstest]
fn status_reports_every_category(init_repository_dir: TempDir) {
    let dir = init_repository_dir.path();
    write_file(FileSpec::new(dir.join("kept.txt"), "kept".to_string()));
    write_file(FileSpec::new(dir.join("edited.txt"), "before".to_string()));
    write_file(FileSpec::new(dir.join("gone.txt"), "gone".to_string()));
    run_twig_command(dir, &["add", "kept.txt", "edited.txt", "gone.txt"])
        .assert()
        .success();
    write_file(FileSpec::new(dir.join("edited.txt"), "after".to_string()));
    std::fs::remove_file(dir.join("gone.txt")).unwrap();
    write_file(FileSpec::new(dir.join("stray.txt"), "stray".to_string()));

    run_twig_command(dir, &["status"])
        .assert()
        .success()
        .stdout(
            "On branch master\n\
             \n\
             Tracking files:\n  edited.txt\n  gone.txt\n  kept.txt\n\
             \n\
             Staged but modified files:\n  modified: edited.txt\n\
             \n\
             Staged but removed files:\n  deleted: gone.txt\n\
             \n\
             Untracked files:\n  stray.txt\n\
             \n",
        );
}

#[rstest]
fn status_of_clean_tree_lists_nothing(init_repository_dir: TempDir) {
    run_twig_command(init_repository_dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Untracked files:\n\n"))
        .stdout(predicate::str::contains("Tracking files:\n\n"));
}

#[rstest]
fn many_generated_files_are_committed(repository_dir: TempDir) {
    let dir = repository_dir.path();
    run_twig_command(dir, &["init"]).assert().success();
    let files = write_generated_files(dir, 12);

    run_twig_command(dir, &["add", "."]).assert().success();
    twig_commit(dir, "bulk").assert().success();

    let history = read_history(dir);
    let tip = history["branches"]["master"].as_str().unwrap();
    let snapshot = history["commits"][tip]["files"].as_object().unwrap();
    assert_eq!(snapshot.len(), files.len());
}
