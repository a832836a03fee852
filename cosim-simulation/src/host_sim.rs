// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Host simulator backends.

use cosim_system::types::SimError;
use cosim_system::{HostId, sim_error};
use serde::{Deserialize, Serialize};

/// The fidelity at which a host is simulated.
///
/// `plain` is functional-only and therefore unsynchronized; it cannot
/// share an experiment with the synchronized variants.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostVariant {
    /// Functional full-system emulator, free-running clock.
    Plain,
    /// The same emulator with its clock lock-stepped to its peers.
    Timed,
    /// Cycle-accurate CPU simulator; synchronized and checkpointable.
    Detailed,
}

impl HostVariant {
    /// Map a variant tag to the backend it selects.
    ///
    /// Unrecognized tags are an unsupported-configuration error.
    pub fn from_tag(tag: &str) -> Result<Self, SimError> {
        match tag {
            "plain" => Ok(HostVariant::Plain),
            "timed" => Ok(HostVariant::Timed),
            "detailed" => Ok(HostVariant::Detailed),
            _ => sim_error!("Unsupported host variant '{tag}'"),
        }
    }

    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            HostVariant::Plain => "plain",
            HostVariant::Timed => "timed",
            HostVariant::Detailed => "detailed",
        }
    }

    /// Whether this variant runs with a lock-stepped clock.
    #[must_use]
    pub fn synchronized(self) -> bool {
        !matches!(self, HostVariant::Plain)
    }

    /// Wrap a host into a runnable simulator instance of this variant.
    #[must_use]
    pub fn build(self, host: HostId) -> HostSim {
        let backend = match self {
            HostVariant::Plain => HostBackend::Emulator { sync: false },
            HostVariant::Timed => HostBackend::Emulator { sync: true },
            HostVariant::Detailed => HostBackend::CycleAccurate {
                cpu: CpuModel::Timing,
                restore_checkpoint: false,
            },
        };
        HostSim {
            host,
            variant: self,
            backend,
            wait: false,
        }
    }
}

/// CPU model used by the cycle-accurate backend.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CpuModel {
    /// Timing-accurate model, the default.
    Timing,
    /// Hardware-virtualized fast-forward model, used to take checkpoints.
    Kvm,
}

/// Concrete host backend configuration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum HostBackend {
    Emulator { sync: bool },
    CycleAccurate { cpu: CpuModel, restore_checkpoint: bool },
}

/// A host bound to its simulator backend.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HostSim {
    pub host: HostId,
    pub variant: HostVariant,
    pub backend: HostBackend,
    /// The runner waits on this simulator's exit before declaring the
    /// experiment complete.
    pub wait: bool,
}

/// Reject experiments mixing unsynchronized and synchronized host
/// variants.
///
/// Runs over the declared variant list before any simulator object is
/// constructed, so a bad configuration fails without side effects.
pub fn check_host_variants(variants: &[HostVariant]) -> Result<(), SimError> {
    let any_plain = variants.iter().any(|v| !v.synchronized());
    let any_synced = variants.iter().any(|v| v.synchronized());
    if any_plain && any_synced {
        return sim_error!(
            "Cannot mix unsynchronized 'plain' hosts with synchronized host variants in one experiment"
        );
    }
    Ok(())
}
