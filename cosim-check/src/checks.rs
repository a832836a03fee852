// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Check definitions and their execution.
//!
//! A check definition is a YAML file naming the fixtures to inspect, the
//! log lines expected in each simulator's captured output, and the
//! numeric gates over values extracted from those lines. Execution is
//! linear and terminal: the first failed step fails the whole test.

use std::collections::BTreeMap;
use std::path::Path;

use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::CheckError;
use crate::matcher::find_line;
use crate::schema::load_run_output;

/// Which captured stream of a simulator to inspect.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    #[default]
    Stdout,
    Stderr,
}

/// An expected log line, with an optional numeric capture.
///
/// The pattern's first capture group provides the value; anchor patterns
/// with `^` to match from the start of a line, preserving the contract
/// of the result producer.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpectSection {
    pub pattern: String,
    /// Name the first capture group's value is stored under for the
    /// threshold gates.
    pub capture: Option<String>,
}

/// A numeric gate over a captured value.
///
/// Comparisons are strict: `max` fails on `value > max` and `min` fails
/// on `value < min`, so a value equal to either limit passes. `equals`
/// fails on any difference.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdSection {
    pub capture: String,
    pub max: Option<u64>,
    pub min: Option<u64>,
    pub equals: Option<u64>,
}

/// One fixture inspection: which file, which simulator, which stream,
/// what must appear there.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckSection {
    /// Result document, relative to the output directory.
    pub file: String,
    /// Full simulator name the output is keyed under.
    pub sim: String,
    #[serde(default)]
    pub stream: Stream,
    pub expect: Vec<ExpectSection>,
    #[serde(default)]
    pub thresholds: Vec<ThresholdSection>,
}

/// A named test over one or more fixtures.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckConfig {
    pub test: String,
    pub checks: Vec<CheckSection>,
}

impl CheckConfig {
    pub fn from_string(config: &str) -> Result<Self, CheckError> {
        serde_yaml::from_str(config)
            .map_err(|e| CheckError::plain(format!("serde_yaml::from_str failed: {e}")))
    }

    pub fn from_file(path: &Path) -> Result<Self, CheckError> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| CheckError::plain(format!("Unable to read {}: {e}", path.display())))?;
        Self::from_string(&s)
    }
}

fn run_section(section: &CheckSection, outdir: &Path) -> Result<(), CheckError> {
    let fixture = outdir.join(&section.file);
    let output = load_run_output(&fixture)?;
    let sim = output
        .sim(&section.sim)
        .map_err(|e| e.with_fixture(&fixture))?;
    let lines = match section.stream {
        Stream::Stdout => &sim.stdout,
        Stream::Stderr => &sim.stderr,
    };

    let mut values: BTreeMap<String, u64> = BTreeMap::new();
    for expect in &section.expect {
        let re = Regex::new(&expect.pattern).map_err(|e| {
            CheckError::at(&fixture, format!("Bad pattern '{}': {e}", expect.pattern))
        })?;
        let caps = match find_line(lines, &re) {
            Some(caps) => caps,
            None => {
                return Err(CheckError::at(
                    &fixture,
                    format!(
                        "Could not find '{}' in {} of {}",
                        expect.pattern,
                        stream_name(section.stream),
                        section.sim
                    ),
                ));
            }
        };

        if let Some(name) = &expect.capture {
            let group = caps.get(1).ok_or_else(|| {
                CheckError::at(
                    &fixture,
                    format!("Pattern '{}' has no capture group", expect.pattern),
                )
            })?;
            let value: u64 = group.as_str().parse().map_err(|e| {
                CheckError::at(
                    &fixture,
                    format!("Parsing simulation output failed for '{name}': {e}"),
                )
            })?;
            debug!("{name} = {value}");
            values.insert(name.clone(), value);
        }
    }

    for threshold in &section.thresholds {
        let value = *values.get(&threshold.capture).ok_or_else(|| {
            CheckError::at(
                &fixture,
                format!("No captured value named '{}'", threshold.capture),
            )
        })?;

        if let Some(max) = threshold.max
            && value > max
        {
            return Err(CheckError::at(
                &fixture,
                format!("{} is {value}, must not exceed {max}", threshold.capture),
            ));
        }
        if let Some(min) = threshold.min
            && value < min
        {
            return Err(CheckError::at(
                &fixture,
                format!("{} is {value}, must not be below {min}", threshold.capture),
            ));
        }
        if let Some(equals) = threshold.equals
            && value != equals
        {
            return Err(CheckError::at(
                &fixture,
                format!("{} is {value}, expected {equals}", threshold.capture),
            ));
        }
    }

    Ok(())
}

fn stream_name(stream: Stream) -> &'static str {
    match stream {
        Stream::Stdout => "stdout",
        Stream::Stderr => "stderr",
    }
}

/// Run every check of a definition against the output directory.
///
/// Purely reads the fixtures: running the same definition twice over
/// unmodified files yields the same verdict.
pub fn run_checks(cfg: &CheckConfig, outdir: &Path) -> Result<(), CheckError> {
    for section in &cfg.checks {
        run_section(section, outdir)?;
    }
    Ok(())
}
