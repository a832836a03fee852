// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Blocking line-by-line tailing of a growing log file.
//!
//! Used to watch the console log of an in-flight run: the consumer loop
//! suspends on I/O availability and resumes per line, with no ordering
//! guarantee beyond log-line arrival order.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::thread;
use std::time::Duration;

use regex::Regex;

use crate::CheckError;

/// Tail a log file until a stop pattern matches.
///
/// Each complete line is handed to `on_line` as it arrives. At end of
/// file the reader polls every `poll` until new content appears; after
/// `max_idle_polls` polls without growth the follow gives up. Returns
/// whether the stop pattern was seen.
pub fn follow_until<F>(
    path: &Path,
    stop: &Regex,
    poll: Duration,
    max_idle_polls: usize,
    mut on_line: F,
) -> Result<bool, CheckError>
where
    F: FnMut(&str),
{
    let file = File::open(path)
        .map_err(|e| CheckError::at(path, format!("Unable to open log for tailing: {e}")))?;
    let mut reader = BufReader::new(file);

    let mut idle_polls = 0;
    let mut line = String::new();
    loop {
        line.clear();
        let n = reader
            .read_line(&mut line)
            .map_err(|e| CheckError::at(path, format!("Reading log failed: {e}")))?;

        if n == 0 {
            if idle_polls >= max_idle_polls {
                return Ok(false);
            }
            idle_polls += 1;
            thread::sleep(poll);
            continue;
        }
        idle_polls = 0;

        let trimmed = line.trim_end_matches(['\n', '\r']);
        on_line(trimmed);
        if stop.is_match(trimmed) {
            return Ok(true);
        }
    }
}
