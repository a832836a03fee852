// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! NIC simulator backends.

use cosim_system::host::Host;
use cosim_system::types::SimError;
use cosim_system::{NicId, sim_error};
use serde::{Deserialize, Serialize};

/// The fidelity at which a NIC is simulated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NicVariant {
    /// Behavioral model of the vendor NIC with an in-kernel driver.
    Fast,
    /// Behavioral model of the custom NIC.
    Bm,
    /// Verilated RTL of the custom NIC.
    Rtl,
}

/// What a host needs in order to drive a NIC variant: the drivers to
/// load and the guest memory the driver stack requires.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeProfile {
    pub drivers: Vec<String>,
    pub memory_mb: u64,
}

impl NodeProfile {
    /// Apply this profile to a host being built.
    pub fn apply_to(&self, host: &mut Host) {
        host.drivers.extend(self.drivers.iter().cloned());
        if host.memory_mb < self.memory_mb {
            host.memory_mb = self.memory_mb;
        }
    }
}

/// Map a device-type tag to the (device backend, node flavor) pair it
/// selects.
///
/// The custom-NIC variants need the out-of-tree driver module injected
/// and more guest memory; the vendor model's driver ships with the
/// kernel. Unrecognized tags are an unsupported-configuration error.
pub fn select_nic(tag: &str) -> Result<(NicVariant, NodeProfile), SimError> {
    match tag {
        "fast" => Ok((
            NicVariant::Fast,
            NodeProfile {
                drivers: vec!["fastnic".to_string()],
                memory_mb: 512,
            },
        )),
        "bm" => Ok((
            NicVariant::Bm,
            NodeProfile {
                drivers: vec!["refnic.ko".to_string()],
                memory_mb: 2048,
            },
        )),
        "rtl" => Ok((
            NicVariant::Rtl,
            NodeProfile {
                drivers: vec!["refnic.ko".to_string()],
                memory_mb: 2048,
            },
        )),
        _ => sim_error!("Unsupported NIC variant '{tag}'"),
    }
}

/// A NIC bound to its simulator backend.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NicSim {
    pub nic: NicId,
    pub variant: NicVariant,
    /// RTL models run at a configured clock; behavioral models ignore
    /// this.
    pub clock_freq_mhz: u64,
}

impl NicSim {
    #[must_use]
    pub fn new(nic: NicId, variant: NicVariant) -> Self {
        Self {
            nic,
            variant,
            clock_freq_mhz: 250,
        }
    }
}
