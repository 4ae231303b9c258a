use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn shows_help() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("goscan"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("goscan"));
}

#[test]
fn requires_a_target_argument() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("goscan"));
    cmd.assert().failure();
}

#[test]
fn exits_zero_without_strace_enabled() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("goscan"));
    cmd.env_remove("GOSCAN_STRACE");
    cmd.arg("/bin/true");
    cmd.assert().success();
}
