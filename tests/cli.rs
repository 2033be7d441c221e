use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn engine() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("reimbursement-engine");
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn prints_amount_with_two_decimals() {
    engine()
        .args(["5", "200", "700.00"])
        .assert()
        .success()
        .stdout("796.60\n");
}

#[test]
fn single_day_fraud_pattern() {
    engine()
        .args(["1", "1080", "1810.00"])
        .assert()
        .success()
        .stdout("208.90\n");
}

#[test]
fn whole_numbers_still_print_cents() {
    engine()
        .args(["1", "0", "0"])
        .assert()
        .success()
        .stdout("100.00\n");
}

#[test]
fn wrong_argument_count_is_usage_error() {
    engine()
        .args(["5", "200"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn non_numeric_input_is_rejected() {
    engine()
        .args(["five", "200", "700"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
}

#[test]
fn zero_days_exits_with_one() {
    engine()
        .args(["0", "200", "700"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("trip_duration_days"));
}

#[test]
fn negative_receipts_exit_with_one() {
    engine()
        .args(["3", "200", "-10"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("total_receipts_amount"));
}

#[test]
fn explain_writes_trace_to_stderr() {
    engine()
        .args(["--explain", "3", "300", "200.99"])
        .assert()
        .success()
        .stdout("448.00\n")
        .stderr(predicate::str::contains("receipt_cents_bonus"));
}

#[test]
fn loads_policy_directory() {
    let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/config/legacy");
    engine()
        .args(["--config", dir, "3", "300", "200"])
        .assert()
        .success()
        .stdout("438.00\n");
}

#[test]
fn missing_policy_directory_exits_with_one() {
    engine()
        .args(["--config", "./no-such-policy", "3", "300", "200"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}
