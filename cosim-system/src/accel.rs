// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! A simulated hardware accelerator exposed to a host as a PCIe device.

/// Device-model parameters for an accelerator.
///
/// The model itself (behavioral or RTL) is a backend choice made in the
/// simulation layer; this only describes the device as the topology sees
/// it.
#[derive(Clone, Debug, PartialEq)]
pub struct AccelDev {
    pub name: String,
    /// Latency the device model charges per operation.
    pub op_latency_ns: u64,
    /// Problem size the model is configured for (e.g. supported matrix
    /// dimension).
    pub size: u64,
}

impl AccelDev {
    #[must_use]
    pub fn new(name: &str, op_latency_ns: u64, size: u64) -> Self {
        Self {
            name: name.to_string(),
            op_latency_ns,
            size,
        }
    }
}
