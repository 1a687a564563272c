use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;
use tempfile;

type STDRESULT = Result<(), Box<dyn std::error::Error>>;

#[test]
fn search_finds_inserted_pair() -> STDRESULT {
    let mut cmd = Command::cargo_bin("lexitrie")?;
    cmd.arg("search")
        .arg("-p").arg("hello=greeting")
        .arg("-k").arg("hello")
        .assert()
        .success()
        .stdout(predicate::str::contains("greeting"));
    Ok(())
}

#[test]
fn search_reports_not_found() -> STDRESULT {
    let mut cmd = Command::cargo_bin("lexitrie")?;
    cmd.arg("search")
        .arg("-p").arg("hello=greeting")
        .arg("-k").arg("goodbye")
        .assert()
        .success()
        .stdout(predicate::str::contains("not found"));
    Ok(())
}

#[test]
fn prefix_lists_matching_keys() -> STDRESULT {
    let mut cmd = Command::cargo_bin("lexitrie")?;
    let out = cmd
        .arg("prefix")
        .arg("-p").arg("abcababd=x")
        .arg("-p").arg("abd=y")
        .arg("-k").arg("ab")
        .output()?;
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout)?;
    let mut lines: Vec<&str> = stdout.lines().collect();
    lines.sort_unstable();
    assert_eq!(lines, vec!["abcababd", "abd"]);
    Ok(())
}

#[test]
fn find_returns_substring_matches() -> STDRESULT {
    let mut cmd = Command::cargo_bin("lexitrie")?;
    cmd.arg("find")
        .arg("-p").arg("cây hậu tố=suffix tree")
        .arg("-p").arg("thử nghiệm=experiment")
        .arg("-k").arg("nghiệm")
        .assert()
        .success()
        .stdout(predicate::str::contains("thử nghiệm\texperiment"));
    Ok(())
}

#[test]
fn find_persists_and_reloads() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let index_dir = temp_dir.path().join("idx");

    let mut build = Command::cargo_bin("lexitrie")?;
    build
        .arg("find")
        .arg("-p").arg("cây hậu tố=suffix tree")
        .arg("-p").arg("thử nghiệm=experiment")
        .arg("-k").arg("nghiệm")
        .arg("-o").arg(&index_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("thử nghiệm\texperiment"));

    let mut reload = Command::cargo_bin("lexitrie")?;
    reload
        .arg("find")
        .arg("-i").arg(&index_dir)
        .arg("-k").arg("nghiệm")
        .assert()
        .success()
        .stdout(predicate::str::contains("thử nghiệm\texperiment"));
    Ok(())
}
