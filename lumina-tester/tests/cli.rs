use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "lumina-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_lumina-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(&output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("full-story"));
    let _ = std::fs::remove_file(output_path);
}

#[test]
fn cli_runs_every_scenario_with_a_json_report() {
    let exe = env!("CARGO_BIN_EXE_lumina-tester");
    let output_path = temp_path("run");
    let output = Command::new(exe)
        .args(["--scenarios", "all", "--report", "json", "--output"])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success(), "scenario run failed");
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output_path).expect("read output"))
            .expect("parse report");
    let results = report.as_array().expect("array report");
    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|r| r["passed"] == true));
    let _ = std::fs::remove_file(output_path);
}

#[test]
fn cli_exits_nonzero_only_on_failures() {
    let exe = env!("CARGO_BIN_EXE_lumina-tester");
    let output = Command::new(exe)
        .args(["--scenarios", "intro,ritual"])
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Lumina Story Tester"));
}
