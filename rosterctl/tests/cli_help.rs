use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn rosterctl(workdir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("rosterctl");
    cmd.current_dir(workdir.path())
        .arg("--data-dir")
        .arg(workdir.path().join("state"))
        .env_remove("ROSTER_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn users_help_lists_subcommands() {
    let mut cmd = cargo_bin_cmd!("rosterctl");
    let output = cmd
        .arg("users")
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&output);
    for sub in ["list", "show", "create", "update", "delete"] {
        assert!(text.contains(sub), "users help missing '{sub}'");
    }
}

#[test]
fn login_help_mentions_password_env() {
    let mut cmd = cargo_bin_cmd!("rosterctl");
    cmd.arg("login")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--email"))
        .stdout(predicate::str::contains("ROSTER_PASSWORD"));
}

#[test]
fn status_without_session_reports_logged_out() {
    let workdir = TempDir::new().unwrap();
    rosterctl(&workdir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("not signed in"))
        .stdout(predicate::str::contains("theme: light, view: table"));
}

#[test]
fn theme_toggle_is_persisted_between_runs() {
    let workdir = TempDir::new().unwrap();
    rosterctl(&workdir)
        .arg("theme")
        .assert()
        .success()
        .stdout("theme: dark\n");
    rosterctl(&workdir)
        .args(["view", "card"])
        .assert()
        .success();
    rosterctl(&workdir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("theme: dark, view: card"));
}

#[test]
fn listing_users_requires_a_session() {
    let workdir = TempDir::new().unwrap();
    rosterctl(&workdir)
        .args(["users", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please log in to continue."));
}

#[test]
fn unknown_view_mode_is_rejected() {
    let workdir = TempDir::new().unwrap();
    rosterctl(&workdir)
        .args(["view", "grid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown preference value 'grid'"));
}
