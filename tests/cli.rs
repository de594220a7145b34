use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tally(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tally").unwrap();
    cmd.env("TALLY_HOME", home.path())
        .env_remove("TALLY_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn log_in(home: &TempDir, user_id: &str) {
    std::fs::write(
        home.path().join("session.json"),
        format!(r#"{{"user_id": "{user_id}", "user_name": "Ann", "email": "ann@example.com"}}"#),
    )
    .unwrap();
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    tally(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("dashboard"))
        .stdout(predicate::str::contains("report"));
}

#[test]
fn dashboard_requires_login() {
    let home = TempDir::new().unwrap();
    tally(&home)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn logout_without_session() {
    let home = TempDir::new().unwrap();
    tally(&home)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("No active session"));
}

#[test]
fn logout_removes_session() {
    let home = TempDir::new().unwrap();
    log_in(&home, "7");
    tally(&home)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out."));
    assert!(!home.path().join("session.json").exists());
}

#[test]
fn add_validates_before_contacting_server() {
    let home = TempDir::new().unwrap();
    log_in(&home, "7");
    tally(&home)
        .args(["--api-url", "http://127.0.0.1:9"])
        .args(["add", "--date", "2024-01-05", "--item", "Coffee", "--cost", "-3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Expense cost must be zero or greater"));
}

#[test]
fn add_with_non_numeric_user_logs_out() {
    let home = TempDir::new().unwrap();
    log_in(&home, "abc");
    tally(&home)
        .args(["add", "--date", "2024-01-05", "--item", "Coffee", "--cost", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("User not found, please log in again"));
    assert!(!home.path().join("session.json").exists());
}

#[test]
fn status_uses_env_url() {
    let home = TempDir::new().unwrap();
    tally(&home)
        .env("TALLY_API_URL", "http://env.test/")
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("API URL:    http://env.test"))
        .stdout(predicate::str::contains("not logged in"));
}

#[test]
fn config_set_persists() {
    let home = TempDir::new().unwrap();
    tally(&home)
        .args(["config", "set", "api-url", "https://expenses.test/"])
        .assert()
        .success();
    tally(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://expenses.test"));
    tally(&home)
        .args(["config", "set", "api-url", "expenses.test"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("http://"));
}

#[test]
fn report_rejects_bad_date() {
    let home = TempDir::new().unwrap();
    log_in(&home, "7");
    tally(&home)
        .args(["report", "--from", "last-week"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("YYYY-MM-DD"));
}

#[test]
fn unreachable_server_is_a_network_error() {
    let home = TempDir::new().unwrap();
    log_in(&home, "7");
    tally(&home)
        .args(["--api-url", "http://127.0.0.1:9", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Network error while loading expenses"));
}

#[test]
fn completions_print_script() {
    let home = TempDir::new().unwrap();
    tally(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tally"));
}
