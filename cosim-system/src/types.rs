// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Shared types.

use std::error::Error;
use std::fmt;

// Configuration/build errors

#[macro_export]
/// Build an `Err(SimError)` from a format string
macro_rules! sim_error {
    ($($arg:tt)+) => {
        Err($crate::types::SimError(format!($($arg)+)))
    };
}

/// The `SimError` is what should be returned in the case of an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimError(pub String);

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Error: {}", self.0)
    }
}

impl Error for SimError {}

/// The SimResult is the return type for most fallible build functions
pub type SimResult = Result<(), SimError>;

/// Units for channel latencies and synchronization periods.
///
/// Amounts are always stored in nanoseconds internally; this enum only
/// exists so definitions can state latencies in natural units.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Time {
    Seconds,
    Milliseconds,
    Microseconds,
    Nanoseconds,
}

impl Time {
    /// Convert an amount in this unit to nanoseconds.
    #[must_use]
    pub fn to_ns(self, amount: u64) -> u64 {
        match self {
            Time::Seconds => amount * 1_000_000_000,
            Time::Milliseconds => amount * 1_000_000,
            Time::Microseconds => amount * 1_000,
            Time::Nanoseconds => amount,
        }
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Time::Seconds => write!(f, "s"),
            Time::Milliseconds => write!(f, "ms"),
            Time::Microseconds => write!(f, "us"),
            Time::Nanoseconds => write!(f, "ns"),
        }
    }
}
