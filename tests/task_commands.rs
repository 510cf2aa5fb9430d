mod support;

use predicates::str::contains;
use serde_json::Value;

use support::TestData;

#[test]
fn add_list_toggle_rm_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new();

    let added = data.json(&["add", "2025-03-15", "Buy", "milk"]);
    assert_eq!(added["schema_version"], "taskcal.v1");
    assert_eq!(added["command"], "add");
    assert_eq!(added["status"], "success");
    assert_eq!(added["data"]["position"], 1);
    assert_eq!(added["data"]["task"]["text"], "Buy milk");
    assert_eq!(added["data"]["task"]["done"], false);

    let snapshot = data.read_snapshot();
    assert_eq!(
        snapshot,
        serde_json::json!({"2025-03-15": [{"text": "Buy milk", "done": false}]})
    );

    let toggled = data.json(&["toggle", "2025-03-15", "1"]);
    assert_eq!(toggled["data"]["done"], true);

    let listed = data.json(&["list", "2025-03-15"]);
    assert_eq!(listed["data"]["completed"], 1);
    assert_eq!(listed["data"]["uncompleted"], 0);
    assert_eq!(listed["data"]["tasks"][0]["text"], "Buy milk");

    let removed = data.json(&["rm", "2025-03-15", "1"]);
    assert_eq!(removed["data"]["remaining"], 0);
    assert_eq!(data.read_snapshot(), serde_json::json!({}));

    Ok(())
}

#[test]
fn task_text_is_trimmed() {
    let data = TestData::new();
    data.cmd()
        .args(["add", "2025-03-15", "  Call mom  "])
        .assert()
        .success();
    assert_eq!(data.read_snapshot()["2025-03-15"][0]["text"], "Call mom");
}

#[test]
fn blank_task_is_a_user_error() {
    let data = TestData::new();
    data.cmd()
        .args(["add", "2025-03-15", "   "])
        .assert()
        .code(2)
        .stderr(contains("Task text cannot be empty"));
    assert!(!data.snapshot_path().exists());
}

#[test]
fn stale_position_reports_range_error() {
    let data = TestData::new();
    data.cmd()
        .args(["add", "2025-03-15", "Only task"])
        .assert()
        .success();

    let output = data
        .cmd()
        .args(["toggle", "2025-03-15", "3", "--json"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(2));
    let envelope: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(envelope["status"], "error");
    assert_eq!(envelope["command"], "toggle");
    assert_eq!(envelope["error"]["kind"], "user_error");
    assert_eq!(envelope["error"]["code"], 2);
    assert_eq!(envelope["next_steps"][0], "taskcal list 2025-03-15");

    assert_eq!(data.read_snapshot()["2025-03-15"][0]["done"], false);
}

#[test]
fn position_zero_is_rejected() {
    let data = TestData::new();
    data.cmd()
        .args(["rm", "2025-03-15", "0"])
        .assert()
        .code(2)
        .stderr(contains("positions start at 1"));
}

#[test]
fn malformed_date_is_rejected() {
    let data = TestData::new();
    data.cmd()
        .args(["add", "2025-02-30", "Nope"])
        .assert()
        .code(2)
        .stderr(contains("Malformed date key"));
    data.cmd()
        .args(["list", "15/03/2025"])
        .assert()
        .code(2);
}

#[test]
fn days_lists_dates_in_order() {
    let data = TestData::new();
    for (date, text) in [("2025-04-02", "b"), ("2025-03-15", "a"), ("2025-04-02", "c")] {
        data.cmd().args(["add", date, text]).assert().success();
    }
    data.cmd().args(["toggle", "2025-04-02", "2"]).assert().success();

    let days = data.json(&["days"]);
    assert_eq!(days["data"]["tasks_total"], 3);
    let listed = days["data"]["days"].as_array().expect("days");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["date"], "2025-03-15");
    assert_eq!(listed[1]["date"], "2025-04-02");
    assert_eq!(listed[1]["completed"], 1);
    assert_eq!(listed[1]["uncompleted"], 1);
}

#[test]
fn corrupt_snapshot_loads_as_empty() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new();
    data.write_file("tasks.json", "{not json")?;

    let listed = data.json(&["list", "2025-03-15"]);
    assert_eq!(listed["status"], "success");
    assert_eq!(listed["data"]["tasks"], serde_json::json!([]));

    data.cmd()
        .args(["add", "2025-03-15", "Fresh start"])
        .assert()
        .success();
    assert_eq!(data.read_snapshot()["2025-03-15"][0]["text"], "Fresh start");
    Ok(())
}

#[test]
fn human_list_shows_checkboxes() {
    let data = TestData::new();
    data.cmd().args(["add", "2025-03-15", "Buy milk"]).assert().success();
    data.cmd().args(["add", "2025-03-15", "Walk dog"]).assert().success();
    data.cmd().args(["toggle", "2025-03-15", "2"]).assert().success();

    data.cmd()
        .args(["list", "2025-03-15"])
        .assert()
        .success()
        .stdout(contains("1. [ ] Buy milk"))
        .stdout(contains("2. [x] Walk dog"));
}

#[test]
fn quiet_suppresses_human_output() {
    let data = TestData::new();
    data.cmd()
        .args(["add", "2025-03-15", "Silent", "--quiet"])
        .assert()
        .success()
        .stdout("");
}
