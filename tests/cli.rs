use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn bin() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("unixcrypt"))
}

#[test]
fn generate_then_validate() {
    let out = bin()
        .env("UNIXCRYPT_PASSWORD", "pw")
        .arg("generate")
        .arg("--scheme")
        .arg("sha256")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("$5$"))
        .get_output()
        .stdout
        .clone();
    let hash = String::from_utf8(out).unwrap();

    bin()
        .env("UNIXCRYPT_PASSWORD", "pw")
        .arg("validate")
        .arg(hash.trim())
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));

    bin()
        .env("UNIXCRYPT_PASSWORD", "wrong")
        .arg("validate")
        .arg(hash.trim())
        .assert()
        .failure()
        .stdout(predicate::str::contains("not valid"));
}

#[test]
fn default_command_is_generate() {
    bin()
        .arg("--password")
        .arg("pw")
        .arg("--count")
        .arg("4")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("$2b$04$"));
}

#[test]
fn password_from_file() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("pw.txt");
    fs::write(&file, "password\nsecond line\n").unwrap();

    bin()
        .arg("validate")
        .arg("--password-file")
        .arg(&file)
        .arg("$1$5pZSV9va$azfrPr6af3Fc7dLblQXVa0")
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn gensalt_and_check() {
    bin()
        .arg("gensalt")
        .arg("--scheme")
        .arg("sha512")
        .arg("--count")
        .arg("10000")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("$6$rounds=10000$"));

    bin()
        .arg("check")
        .arg("$2b$05$")
        .assert()
        .success()
        .stdout(predicate::str::diff("ok\n"));

    bin()
        .arg("check")
        .arg("ab")
        .assert()
        .failure()
        .stdout(predicate::str::diff("legacy\n"));

    bin()
        .arg("check")
        .arg("$2$")
        .assert()
        .failure()
        .stdout(predicate::str::diff("invalid\n"));
}

#[test]
fn bad_cost_is_reported() {
    bin()
        .arg("gensalt")
        .arg("--scheme")
        .arg("bcrypt")
        .arg("--count")
        .arg("3")
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidArgument"));
}

#[test]
fn yescrypt_needs_backend() {
    bin()
        .env("UNIXCRYPT_PASSWORD", "pw")
        .arg("generate")
        .arg("--scheme")
        .arg("yescrypt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("AlgorithmDisabled"));
}
