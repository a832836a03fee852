// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use std::io::Write;
use std::time::Duration;

use cosim_check::follow::follow_until;
use regex::Regex;

#[test]
fn follow_stops_on_the_stop_pattern() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("console.log");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "booting").unwrap();
    writeln!(file, "run started").unwrap();
    writeln!(file, "SUCCESS demo").unwrap();
    writeln!(file, "after the end").unwrap();

    let stop = Regex::new(r"^SUCCESS").unwrap();
    let mut seen = Vec::new();
    let stopped = follow_until(&path, &stop, Duration::from_millis(1), 3, |line| {
        seen.push(line.to_string());
    })
    .unwrap();

    assert!(stopped);
    // Lines arrive in order and nothing past the stop line is consumed.
    assert_eq!(seen, vec!["booting", "run started", "SUCCESS demo"]);
}

#[test]
fn follow_gives_up_when_the_log_stops_growing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("console.log");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "booting").unwrap();

    let stop = Regex::new(r"^SUCCESS").unwrap();
    let mut count = 0;
    let stopped = follow_until(&path, &stop, Duration::from_millis(1), 2, |_| count += 1).unwrap();

    assert!(!stopped);
    assert_eq!(count, 1);
}

#[test]
fn follow_reports_a_missing_log() {
    let stop = Regex::new(r"^SUCCESS").unwrap();
    let err = follow_until(
        std::path::Path::new("/nonexistent/console.log"),
        &stop,
        Duration::from_millis(1),
        1,
        |_| {},
    )
    .unwrap_err();
    assert!(err.msg.contains("Unable to open log"));
}
