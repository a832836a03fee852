// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! The result-document contract produced by the runner.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::CheckError;

/// Captured output of one simulator process.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SimOutput {
    #[serde(default)]
    pub stdout: Vec<String>,
    #[serde(default)]
    pub stderr: Vec<String>,
}

/// One run's result document: an overall success flag plus the captured
/// output streams keyed by full simulator name (`host.client`,
/// `dev.host.accel`, ...).
#[derive(Clone, Debug, Deserialize)]
pub struct RunOutput {
    pub success: bool,
    #[serde(default)]
    pub sims: BTreeMap<String, SimOutput>,
}

impl RunOutput {
    /// The captured output of a simulator, by full name.
    pub fn sim(&self, name: &str) -> Result<&SimOutput, CheckError> {
        self.sims
            .get(name)
            .ok_or_else(|| CheckError::plain(format!("No output for simulator '{name}'")))
    }
}

/// Load and pre-check a result document.
///
/// A missing file, malformed JSON and an unsuccessful run are distinct
/// fatal errors; each names the fixture file being inspected.
pub fn load_run_output(path: &Path) -> Result<RunOutput, CheckError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        CheckError::at(path, format!("Simulation has not produced JSON output: {e}"))
    })?;

    let output: RunOutput = serde_json::from_str(&raw)
        .map_err(|e| CheckError::at(path, format!("Loading simulation JSON output failed: {e}")))?;

    if !output.success {
        return Err(CheckError::at(path, "Simulation was not successful"));
    }
    Ok(output)
}
