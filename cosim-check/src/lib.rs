// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Offline correctness/performance gates over co-simulation result
//! documents.
//!
//! A run of an experiment leaves a JSON result document
//! (`out/<name>-<n>.json`) with an overall success flag and the captured
//! stdout/stderr lines of every simulator process. The checker loads
//! such documents, locates expected log lines by regular expression,
//! extracts numeric fields and applies threshold gates. Any missing
//! file, missing line or failed gate is terminal: these are build gates,
//! not a live service, and nothing is retried.

use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

pub mod checks;
pub mod follow;
pub mod matcher;
pub mod schema;

pub use checks::{CheckConfig, run_checks};
pub use schema::{RunOutput, SimOutput, load_run_output};

/// A failed check, carrying the fixture being inspected when one is
/// known.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckError {
    pub msg: String,
    pub fixture: Option<PathBuf>,
}

impl CheckError {
    /// An error not tied to a particular fixture file.
    #[must_use]
    pub fn plain(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            fixture: None,
        }
    }

    /// An error raised while inspecting a fixture file.
    #[must_use]
    pub fn at(fixture: &Path, msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            fixture: Some(fixture.to_path_buf()),
        }
    }

    /// Attach the fixture context to an error that lacked it.
    #[must_use]
    pub fn with_fixture(mut self, fixture: &Path) -> Self {
        if self.fixture.is_none() {
            self.fixture = Some(fixture.to_path_buf());
        }
        self
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.fixture {
            Some(fixture) => write!(f, "{} (inspect {})", self.msg, fixture.display()),
            None => write!(f, "{}", self.msg),
        }
    }
}

impl Error for CheckError {}
