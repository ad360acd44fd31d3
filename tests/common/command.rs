use crate::common::file::{FileSpec, write_file};
use crate::common::redirect_temp_dir;
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    redirect_temp_dir();
    TempDir::new().expect("Failed to create temp dir")
}

/// Initialized repository with three files committed on master
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_twig_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("1.txt"),
        "one".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("b").join("3.txt"),
        "three".to_string(),
    ));

    run_twig_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();

    twig_commit(repository_dir.path(), "First commit")
        .assert()
        .success();

    repository_dir
}

pub fn run_twig_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("twig").expect("Failed to find twig binary");
    cmd.envs(vec![
        ("NO_COLOR", "1"),
        ("TWIG_AUTHOR_NAME", "fake_user"),
        ("TWIG_AUTHOR_EMAIL", "fake_email@email.com"),
        ("TWIG_AUTHOR_DATE", "2023-01-01 12:00:00 +0000"), // %Y-%m-%d %H:%M:%S %z
    ]);
    cmd.env_remove("TWIG_LOG");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn twig_commit(dir: &Path, message: &str) -> Command {
    run_twig_command(dir, &["commit", "-m", message])
}

pub fn twig_add_all_and_commit(dir: &Path, message: &str) {
    run_twig_command(dir, &["add", "."]).assert().success();
    twig_commit(dir, message).assert().success();
}

/// Read the persisted commit graph document
pub fn read_history(dir: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(dir.join(".twig").join("history.json"))
        .expect("Failed to read history document");
    serde_json::from_str(&content).expect("Failed to parse history document")
}

pub fn branch_tip(dir: &Path, branch: &str) -> Option<String> {
    read_history(dir)["branches"][branch]
        .as_str()
        .map(str::to_string)
}

pub fn head_branch(dir: &Path) -> String {
    read_history(dir)["head"]
        .as_str()
        .expect("head is a string")
        .to_string()
}

pub fn commit_count(dir: &Path) -> usize {
    read_history(dir)["commits"]
        .as_object()
        .expect("commits is an object")
        .len()
}

pub fn commit_parents(dir: &Path, commit_id: &str) -> (Option<String>, Option<String>) {
    let history = read_history(dir);
    let commit = &history["commits"][commit_id];
    (
        commit["parent"].as_str().map(str::to_string),
        commit["second_parent"].as_str().map(str::to_string),
    )
}

/// File names recorded in a commit's snapshot, sorted
pub fn commit_files(dir: &Path, commit_id: &str) -> Vec<String> {
    read_history(dir)["commits"][commit_id]["files"]
        .as_object()
        .expect("files is an object")
        .keys()
        .cloned()
        .collect()
}
