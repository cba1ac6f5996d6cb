//! Binary tests against an isolated data directory

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn splitshare(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("splitshare").unwrap();
    cmd.env("SPLITSHARE_DATA_DIR", dir.path())
        .env("RUST_LOG", "off");
    cmd
}

fn run(dir: &TempDir, args: &[&str]) {
    splitshare(dir).args(args).assert().success();
}

fn roommates() -> TempDir {
    let dir = TempDir::new().unwrap();
    run(&dir, &["init"]);
    run(&dir, &["user", "add", "Alice"]);
    run(&dir, &["user", "add", "Bob"]);
    run(&dir, &["config", "--current-user", "Alice"]);
    dir
}

#[test]
fn init_creates_configuration() {
    let dir = TempDir::new().unwrap();
    splitshare(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete!"));
    assert!(dir.path().join("config.json").exists());
}

#[test]
fn balances_require_a_current_user() {
    let dir = TempDir::new().unwrap();
    run(&dir, &["init"]);
    splitshare(&dir)
        .arg("balances")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No current user set"));
}

#[test]
fn split_then_settle_up() {
    let dir = roommates();

    splitshare(&dir)
        .args(["expense", "add", "Pizza", "30", "--split", "Alice", "Bob"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added expense"));
    run(
        &dir,
        &["expense", "add", "Taxi", "50", "--paid-by", "Bob", "--split", "Alice", "Bob"],
    );

    splitshare(&dir)
        .arg("balances")
        .assert()
        .success()
        .stdout(predicate::str::contains("you owe Bob $10.00"));

    splitshare(&dir)
        .args(["settle", "Bob", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded: Alice paid Bob $10.00"))
        .stdout(predicate::str::contains("Warning").not());

    splitshare(&dir)
        .arg("balances")
        .assert()
        .success()
        .stdout(predicate::str::contains("settled up with Bob"));

    splitshare(&dir)
        .arg("suggest")
        .assert()
        .success()
        .stdout(predicate::str::contains("Everyone is settled up."));

    splitshare(&dir)
        .args(["export", "settlements"])
        .assert()
        .success()
        .stdout(predicate::str::contains(",Alice,Bob,10.00,USD,"));
}

#[test]
fn overpayment_is_recorded_with_a_warning() {
    let dir = roommates();
    run(&dir, &["expense", "add", "Rent", "100", "--paid-by", "Bob", "--split", "Alice", "Bob"]);

    splitshare(&dir)
        .args(["settle", "Bob", "80"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Warning: payment of $80.00 exceeds"));

    splitshare(&dir)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("Alice paid Bob $80.00"));
}

#[test]
fn drafts_stay_out_of_balances() {
    let dir = roommates();
    run(&dir, &["expense", "add", "Groceries", "40", "--split", "Alice", "Bob", "--draft"]);

    splitshare(&dir)
        .arg("balances")
        .assert()
        .success()
        .stdout(predicate::str::contains("No friends yet."));

    splitshare(&dir)
        .args(["expense", "list", "--drafts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[draft]"));
}

#[test]
fn unknown_currency_is_rejected() {
    let dir = roommates();
    splitshare(&dir)
        .args(["expense", "add", "Lunch", "12", "-x", "XYZ", "--split", "Alice", "Bob"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown currency code"));
}

#[test]
fn damaged_log_makes_the_ledger_read_only() {
    let dir = roommates();
    run(&dir, &["expense", "add", "Rent", "100", "--split", "Alice", "Bob"]);
    let expenses = dir.path().join("data").join("expenses.json");
    let before = std::fs::read_to_string(&expenses).unwrap();
    std::fs::write(dir.path().join("data").join("settlements.jsonl"), "{not json\n").unwrap();

    splitshare(&dir)
        .args(["expense", "add", "Pizza", "30", "--split", "Alice", "Bob"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("read-only"));
    splitshare(&dir)
        .args(["settle", "Bob", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("read-only"));

    assert_eq!(std::fs::read_to_string(&expenses).unwrap(), before);
}
