// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use std::fs;
use std::path::Path;

use cosim_check::checks::CheckConfig;
use cosim_check::{load_run_output, run_checks};

static RESULT: &str = r#"
{
  "success": true,
  "sims": {
    "host.host": {
      "stdout": [
        "booting",
        "Accelerator Size: 128",
        "Cycles per operation: 678050068",
        "STATUS: Success matrices match"
      ],
      "stderr": []
    },
    "dev.host.accel": {
      "stdout": [],
      "stderr": ["DMA READS = 512", "DMA WRITES = 256"]
    }
  }
}
"#;

fn write_result(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn config(yaml: &str) -> CheckConfig {
    CheckConfig::from_string(yaml).unwrap()
}

static BASIC_CHECKS: &str = "
test: accel
checks:
  - file: accel-1.json
    sim: host.host
    expect:
      - pattern: '^STATUS: Success matrices match'
      - pattern: '^Accelerator Size: ([0-9]*)'
        capture: size
    thresholds:
      - capture: size
        equals: 128
  - file: accel-1.json
    sim: dev.host.accel
    stream: stderr
    expect:
      - pattern: '^DMA READS = ([0-9]*)'
        capture: dma_reads
    thresholds:
      - capture: dma_reads
        min: 1
";

#[test]
fn passing_checks() {
    let dir = tempfile::tempdir().unwrap();
    write_result(dir.path(), "accel-1.json", RESULT);
    run_checks(&config(BASIC_CHECKS), dir.path()).unwrap();
}

#[test]
fn checker_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    write_result(dir.path(), "accel-1.json", RESULT);
    let cfg = config(BASIC_CHECKS);
    let first = run_checks(&cfg, dir.path());
    let second = run_checks(&cfg, dir.path());
    assert_eq!(first, second);
    assert!(first.is_ok());
}

#[test]
fn missing_fixture_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_checks(&config(BASIC_CHECKS), dir.path()).unwrap_err();
    assert!(err.msg.contains("has not produced JSON output"));
    assert!(
        err.fixture
            .as_ref()
            .unwrap()
            .ends_with("accel-1.json")
    );
}

#[test]
fn unsuccessful_run_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_result(
        dir.path(),
        "accel-1.json",
        r#"{"success": false, "sims": {}}"#,
    );
    let err = run_checks(&config(BASIC_CHECKS), dir.path()).unwrap_err();
    assert!(err.msg.contains("was not successful"));
}

#[test]
fn malformed_json_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_result(dir.path(), "accel-1.json", "{ not json");
    let err = load_run_output(&dir.path().join("accel-1.json")).unwrap_err();
    assert!(err.msg.contains("Loading simulation JSON output failed"));
}

#[test]
fn missing_pattern_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_result(dir.path(), "accel-1.json", RESULT);
    let cfg = config(
        "
test: accel
checks:
  - file: accel-1.json
    sim: host.host
    expect:
      - pattern: '^STATUS: FAILED'
",
    );
    let err = run_checks(&cfg, dir.path()).unwrap_err();
    assert!(err.msg.contains("Could not find"));
    assert!(err.fixture.is_some());
}

#[test]
fn unknown_simulator_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_result(dir.path(), "accel-1.json", RESULT);
    let cfg = config(
        "
test: accel
checks:
  - file: accel-1.json
    sim: host.nowhere
    expect:
      - pattern: 'booting'
",
    );
    let err = run_checks(&cfg, dir.path()).unwrap_err();
    assert!(err.msg.contains("No output for simulator 'host.nowhere'"));
}

fn cycles_threshold(max: u64) -> CheckConfig {
    config(&format!(
        "
test: cycles
checks:
  - file: accel-1.json
    sim: host.host
    expect:
      - pattern: '^Cycles per operation: ([0-9]*)'
        capture: cycles
    thresholds:
      - capture: cycles
        max: {max}
"
    ))
}

#[test]
fn threshold_boundary_equal_passes() {
    let dir = tempfile::tempdir().unwrap();
    write_result(dir.path(), "accel-1.json", RESULT);
    // The reported value is exactly 678050068; the comparison is a
    // strict `>`, so equality passes.
    run_checks(&cycles_threshold(678_050_068), dir.path()).unwrap();
}

#[test]
fn threshold_above_limit_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_result(dir.path(), "accel-1.json", RESULT);
    let err = run_checks(&cycles_threshold(678_050_067), dir.path()).unwrap_err();
    assert!(err.msg.contains("must not exceed"));
}

#[test]
fn min_boundary_equal_passes() {
    let dir = tempfile::tempdir().unwrap();
    write_result(dir.path(), "accel-1.json", RESULT);
    let cfg = config(
        "
test: dma
checks:
  - file: accel-1.json
    sim: dev.host.accel
    stream: stderr
    expect:
      - pattern: '^DMA WRITES = ([0-9]*)'
        capture: dma_writes
    thresholds:
      - capture: dma_writes
        min: 256
",
    );
    run_checks(&cfg, dir.path()).unwrap();
}

#[test]
fn unknown_capture_in_threshold_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_result(dir.path(), "accel-1.json", RESULT);
    let cfg = config(
        "
test: bad
checks:
  - file: accel-1.json
    sim: host.host
    expect:
      - pattern: 'booting'
    thresholds:
      - capture: cycles
        max: 1
",
    );
    let err = run_checks(&cfg, dir.path()).unwrap_err();
    assert!(err.msg.contains("No captured value named 'cycles'"));
}
