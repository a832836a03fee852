// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Accelerator device simulator backends.

use cosim_system::AccelId;

/// Concrete accelerator backend configuration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AccelBackend {
    /// Behavioral model charging the device's configured operation
    /// latency.
    Behavioral,
    /// Verilated RTL at a configured clock.
    Rtl { clock_freq_mhz: u64 },
}

/// An accelerator bound to its simulator backend.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AccelSim {
    pub accel: AccelId,
    pub backend: AccelBackend,
    /// RTL models can dump a waveform for offline inspection.
    pub waveform: bool,
}

impl AccelSim {
    #[must_use]
    pub fn new(accel: AccelId, backend: AccelBackend) -> Self {
        Self {
            accel,
            backend,
            waveform: false,
        }
    }
}
