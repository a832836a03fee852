// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Simulator backend bindings for co-simulation experiments.
//!
//! A [`Simulation`] binds the components of a
//! [`System`](cosim_system::System) to concrete simulator backends and
//! carries the experiment-wide execution settings (checkpointing, clock
//! synchronization). Selection is by closed variant enums; unknown tags
//! fail with an unsupported-configuration error rather than at some later
//! lookup.

use std::fmt::Display;

use cosim_system::types::{SimError, Time};
use cosim_system::{AccelId, HostId, NicId, System, sim_error};
use log::debug;

pub mod accel_sim;
pub mod host_sim;
pub mod net_sim;
pub mod nic_sim;

use accel_sim::AccelSim;
use host_sim::{HostSim, HostVariant};
use net_sim::NetSim;
use nic_sim::NicSim;

/// A reference to one simulator within a [`Simulation`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SimRef {
    Host(usize),
    Nic(usize),
    Net(usize),
    Accel(usize),
}

/// Experiment-wide synchronization settings.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SyncConfig {
    /// How far a simulator may run ahead of its peers.
    pub period_ns: u64,
}

/// All simulator instances of one experiment and their settings.
#[derive(Clone, Debug, PartialEq)]
pub struct Simulation {
    pub name: String,
    /// Use checkpoint and restore to skip the slow boot phase.
    pub checkpoint: bool,
    host_sims: Vec<HostSim>,
    nic_sims: Vec<NicSim>,
    net_sims: Vec<NetSim>,
    accel_sims: Vec<AccelSim>,
    sync: Option<SyncConfig>,
}

impl Simulation {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            checkpoint: false,
            host_sims: Vec::new(),
            nic_sims: Vec::new(),
            net_sims: Vec::new(),
            accel_sims: Vec::new(),
            sync: None,
        }
    }

    /// Bind a host to a backend variant.
    ///
    /// The simulator inherits its wait flag from the host's application,
    /// so the runner knows which process exits matter.
    pub fn bind_host(&mut self, system: &System, host: HostId, variant: HostVariant) -> SimRef {
        let mut sim = variant.build(host);
        if let Some(app) = &system.host(host).app {
            sim.wait = app.wait;
        }
        debug!(
            "bind host {} to variant {}",
            system.host(host).name,
            variant.tag()
        );
        self.host_sims.push(sim);
        SimRef::Host(self.host_sims.len() - 1)
    }

    pub fn add_host_sim(&mut self, sim: HostSim) -> SimRef {
        self.host_sims.push(sim);
        SimRef::Host(self.host_sims.len() - 1)
    }

    pub fn add_nic_sim(&mut self, sim: NicSim) -> SimRef {
        self.nic_sims.push(sim);
        SimRef::Nic(self.nic_sims.len() - 1)
    }

    pub fn add_net_sim(&mut self, sim: NetSim) -> SimRef {
        self.net_sims.push(sim);
        SimRef::Net(self.net_sims.len() - 1)
    }

    pub fn add_accel_sim(&mut self, sim: AccelSim) -> SimRef {
        self.accel_sims.push(sim);
        SimRef::Accel(self.accel_sims.len() - 1)
    }

    /// Lock-step all synchronized simulators, letting each run at most
    /// `amount` (in `unit`) ahead of its peers.
    pub fn enable_synchronization(&mut self, amount: u64, unit: Time) {
        self.sync = Some(SyncConfig {
            period_ns: unit.to_ns(amount),
        });
    }

    #[must_use]
    pub fn sync(&self) -> Option<SyncConfig> {
        self.sync
    }

    #[must_use]
    pub fn host_sims(&self) -> &[HostSim] {
        &self.host_sims
    }

    #[must_use]
    pub fn nic_sims(&self) -> &[NicSim] {
        &self.nic_sims
    }

    #[must_use]
    pub fn net_sims(&self) -> &[NetSim] {
        &self.net_sims
    }

    #[must_use]
    pub fn accel_sims(&self) -> &[AccelSim] {
        &self.accel_sims
    }

    pub fn host_sim_mut(&mut self, idx: usize) -> &mut HostSim {
        &mut self.host_sims[idx]
    }

    pub fn net_sim_mut(&mut self, idx: usize) -> &mut NetSim {
        &mut self.net_sims[idx]
    }

    /// The simulator executing a given host.
    pub fn find_host_sim(&self, host: HostId) -> Result<SimRef, SimError> {
        match self.host_sims.iter().position(|s| s.host == host) {
            Some(idx) => Ok(SimRef::Host(idx)),
            None => sim_error!("No simulator bound for host index {}", host.0),
        }
    }

    /// The simulator executing a given NIC.
    pub fn find_nic_sim(&self, nic: NicId) -> Result<SimRef, SimError> {
        match self.nic_sims.iter().position(|s| s.nic == nic) {
            Some(idx) => Ok(SimRef::Nic(idx)),
            None => sim_error!("No simulator bound for NIC index {}", nic.0),
        }
    }

    /// The simulator executing a given accelerator.
    pub fn find_accel_sim(&self, accel: AccelId) -> Result<SimRef, SimError> {
        match self.accel_sims.iter().position(|s| s.accel == accel) {
            Some(idx) => Ok(SimRef::Accel(idx)),
            None => sim_error!("No simulator bound for accelerator index {}", accel.0),
        }
    }

    /// All simulators of this experiment, in start order: networks first,
    /// then devices, then hosts (a host connects to its device sockets at
    /// boot, and devices connect to their network sockets).
    #[must_use]
    pub fn all_sims(&self) -> Vec<SimRef> {
        let mut refs = Vec::new();
        refs.extend((0..self.net_sims.len()).map(SimRef::Net));
        refs.extend((0..self.nic_sims.len()).map(SimRef::Nic));
        refs.extend((0..self.accel_sims.len()).map(SimRef::Accel));
        refs.extend((0..self.host_sims.len()).map(SimRef::Host));
        refs
    }

    /// The full simulator name used to key captured output in the result
    /// document, e.g. `host.client`, `nic.client-nic`, `net.0`,
    /// `dev.server.accel0`.
    #[must_use]
    pub fn full_name(&self, system: &System, sim: SimRef) -> String {
        match sim {
            SimRef::Host(idx) => {
                format!("host.{}", system.host(self.host_sims[idx].host).name)
            }
            SimRef::Nic(idx) => format!("nic.{}", system.nic(self.nic_sims[idx].nic).name),
            SimRef::Net(idx) => format!("net.{idx}"),
            SimRef::Accel(idx) => {
                let accel = self.accel_sims[idx].accel;
                let host = system
                    .pcie_host(cosim_system::PciePort::Accel(accel))
                    .map_or_else(|| "unattached".to_string(), |h| system.host(h).name.clone());
                format!("dev.{host}.{}", system.accel(accel).name)
            }
        }
    }

    /// The number of waiting simulators (the runner needs at least one).
    #[must_use]
    pub fn num_waiting(&self) -> usize {
        self.host_sims.iter().filter(|s| s.wait).count()
    }
}

impl Display for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Simulation {}: {} host sims, {} NIC sims, {} net sims, {} device sims",
            self.name,
            self.host_sims.len(),
            self.nic_sims.len(),
            self.net_sims.len(),
            self.accel_sims.len()
        )
    }
}
