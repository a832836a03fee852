// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Locate expected lines in captured output.

use regex::{Captures, Regex};

/// The first line matching the pattern, with its captures.
///
/// Lines are scanned in arrival order; later matches are never
/// considered. Patterns should anchor with `^` when they mean to match
/// from the start of a line.
#[must_use]
pub fn find_line<'a>(lines: &'a [String], re: &Regex) -> Option<Captures<'a>> {
    lines.iter().find_map(|line| re.captures(line))
}

/// Every line matching the pattern, in arrival order.
#[must_use]
pub fn find_lines<'a>(lines: &'a [String], re: &Regex) -> Vec<Captures<'a>> {
    lines.iter().filter_map(|line| re.captures(line)).collect()
}
