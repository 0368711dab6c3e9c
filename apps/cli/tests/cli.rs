use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::{TempDir, tempdir};

/// Runs `strata` in an empty directory with an empty environment.
fn strata(dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_strata"));
    cmd.env_clear().current_dir(dir.path());
    cmd
}

#[test]
fn show_masks_secrets_unless_revealed() {
    let dir = tempdir().expect("temp dir");

    strata(&dir)
        .args(["--set", "SECRET_KEY=s3cr3t-value", "--set", "DB_PASSWORD=hunter2", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("********"))
        .stdout(predicate::str::contains("s3cr3t-value").not())
        .stdout(predicate::str::contains("hunter2").not());

    strata(&dir)
        .args(["--set", "SECRET_KEY=s3cr3t-value", "show", "--reveal", "--format", "toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("secret_key = \"s3cr3t-value\""));
}

#[test]
fn get_prints_the_raw_value() {
    let dir = tempdir().expect("temp dir");

    strata(&dir)
        .env("MONGO_URL", "mongodb://env/abc")
        .args(["get", "MONGO_URL"])
        .assert()
        .success()
        .stdout("mongodb://env/abc\n");

    strata(&dir)
        .args(["--set", "redis_port=6380", "get", "redis_port"])
        .assert()
        .success()
        .stdout("6380\n");
}

#[test]
fn explain_reports_the_winning_source() {
    let dir = tempdir().expect("temp dir");

    strata(&dir)
        .env("DEBUG", "true")
        .args(["--set", "DEBUG=false", "--set", "NCCM=true", "explain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("debug <- env (environment variable DEBUG)"))
        .stdout(predicate::str::contains("nccm <- init (init arguments)"))
        .stdout(predicate::str::contains("db_name <- default"));

    strata(&dir)
        .args(["--order", "init,env", "--set", "DEBUG=false", "explain", "debug"])
        .env("DEBUG", "true")
        .assert()
        .success()
        .stdout("debug <- init (init arguments)\n");
}

#[test]
fn dotenv_and_secret_files_are_layered() {
    let dir = tempdir().expect("temp dir");
    fs::write(dir.path().join("settings.env"), "DB_HOST=dotenv-host\nAPP_DB_NAME=prefixed\n")
        .expect("write dotenv");
    let secrets = dir.path().join("secrets");
    fs::create_dir(&secrets).expect("secrets dir");
    fs::write(secrets.join("db_host"), "secret-host\n").expect("write secret");
    fs::write(secrets.join("redis_password"), "from-secret\n").expect("write secret");

    strata(&dir)
        .args(["--env-file", "settings.env", "--secrets-dir", "secrets", "get", "db_host"])
        .assert()
        .success()
        .stdout("dotenv-host\n");

    strata(&dir)
        .args(["--secrets-dir", "secrets", "show", "--reveal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from-secret"));

    strata(&dir)
        .args(["--env-file", "settings.env", "--env-prefix", "APP_", "get", "db_name"])
        .assert()
        .success()
        .stdout("prefixed\n");
}

#[test]
fn unreachable_remote_falls_back_unless_required() {
    let dir = tempdir().expect("temp dir");
    let url = "http://127.0.0.1:9/settings";

    strata(&dir)
        .args(["--remote-url", url, "--remote-timeout", "1", "--set", "DB_NAME=local", "get", "db_name"])
        .assert()
        .success()
        .stdout("local\n")
        .stderr(predicate::str::contains("falling back to other sources"));

    strata(&dir)
        .args(["--remote-url", url, "--remote-timeout", "1", "--remote-required", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to resolve settings"));
}

#[test]
fn check_validates_the_resolved_settings() {
    let dir = tempdir().expect("temp dir");

    strata(&dir)
        .args(["--set", "ITSM=true", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("settings ok"))
        .stdout(predicate::str::contains("features: itsm"));

    strata(&dir)
        .args(["--set", "LOG_LEVEL=loud", "--set", "JWT_ALGORITHM=none", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("log_level"))
        .stderr(predicate::str::contains("jwt_algorithm"));

    strata(&dir)
        .args(["--set", "LOG_LEVEL=loud", "get", "log_level"])
        .assert()
        .success()
        .stdout("loud\n");
}

#[test]
fn bad_arguments_are_rejected() {
    let dir = tempdir().expect("temp dir");

    strata(&dir)
        .args(["--set", "NOT_A_SETTING=1", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown setting"));

    strata(&dir)
        .args(["--set", "DB_PORT=abc", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to resolve settings"));

    strata(&dir).args(["get", "nope"]).assert().failure();
}
