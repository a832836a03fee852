// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Abstract system graphs for co-simulation experiments.
//!
//! A [`System`] is the logical description of the machines under test:
//! hosts, the PCIe devices attached to them (NICs and accelerators),
//! Ethernet switches, and the channels between all of these. It carries no
//! notion of which simulator executes which component; that binding is
//! made separately so the same system can be simulated at different
//! fidelities.
//!
//! Everything here is plain data built once per experiment definition.
//! There is no I/O at construction time except reading workload asset
//! files into injection manifests.

use std::collections::BTreeSet;
use std::fmt::Display;

use log::debug;

pub mod accel;
pub mod app;
pub mod host;
pub mod nic;
pub mod switch;
pub mod types;

use accel::AccelDev;
use host::Host;
use nic::Nic;
use switch::Switch;
use types::SimError;

/// Index of a host within its [`System`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct HostId(pub usize);

/// Index of a NIC within its [`System`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NicId(pub usize);

/// Index of an accelerator within its [`System`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AccelId(pub usize);

/// Index of a switch within its [`System`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SwitchId(pub usize);

/// The device end of a PCIe attachment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PciePort {
    Nic(NicId),
    Accel(AccelId),
}

/// A PCIe attachment between a host and a device.
///
/// Latency and synchronization period default to 500ns and can be tuned
/// per link when a backend needs realistic PCI timing.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PcieLink {
    pub host: HostId,
    pub dev: PciePort,
    pub latency_ns: u64,
    pub sync_period_ns: u64,
}

/// One end of an Ethernet channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EthEndpoint {
    Nic(NicId),
    Switch(SwitchId),
}

/// An Ethernet channel between two endpoints.
///
/// Switch-to-switch bottleneck channels additionally carry a data rate;
/// NIC-to-switch edges are rate-unconstrained.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EthLink {
    pub a: EthEndpoint,
    pub b: EthEndpoint,
    pub latency_ns: u64,
    pub rate_mbps: Option<u64>,
}

/// Index of an Ethernet link within its [`System`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EthLinkId(pub usize);

pub const DEFAULT_LINK_LATENCY_NS: u64 = 500;
pub const DEFAULT_SYNC_PERIOD_NS: u64 = 500;

/// The logical system under simulation.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct System {
    hosts: Vec<Host>,
    nics: Vec<Nic>,
    accels: Vec<AccelDev>,
    switches: Vec<Switch>,
    pcie_links: Vec<PcieLink>,
    eth_links: Vec<EthLink>,
    names: BTreeSet<String>,
}

impl System {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn register_name(&mut self, name: &str) -> Result<(), SimError> {
        if !self.names.insert(name.to_string()) {
            return sim_error!("Duplicate component name {name}");
        }
        Ok(())
    }

    pub fn add_host(&mut self, host: Host) -> Result<HostId, SimError> {
        self.register_name(&host.name)?;
        self.hosts.push(host);
        Ok(HostId(self.hosts.len() - 1))
    }

    pub fn add_nic(&mut self, nic: Nic) -> Result<NicId, SimError> {
        self.register_name(&nic.name)?;
        self.nics.push(nic);
        Ok(NicId(self.nics.len() - 1))
    }

    pub fn add_accel(&mut self, accel: AccelDev) -> Result<AccelId, SimError> {
        self.register_name(&accel.name)?;
        self.accels.push(accel);
        Ok(AccelId(self.accels.len() - 1))
    }

    pub fn add_switch(&mut self, switch: Switch) -> Result<SwitchId, SimError> {
        self.register_name(&switch.name)?;
        self.switches.push(switch);
        Ok(SwitchId(self.switches.len() - 1))
    }

    /// Attach a PCIe device to a host.
    ///
    /// A device belongs to exactly one host; attaching it a second time
    /// is a configuration error.
    pub fn attach_pcie(&mut self, host: HostId, dev: PciePort) -> Result<(), SimError> {
        if let Some(existing) = self.pcie_links.iter().find(|l| l.dev == dev) {
            return sim_error!(
                "Device {} is already attached to host {}",
                self.pcie_port_name(dev),
                self.hosts[existing.host.0].name
            );
        }
        debug!(
            "attach {} to {} via PCIe",
            self.pcie_port_name(dev),
            self.hosts[host.0].name
        );
        self.pcie_links.push(PcieLink {
            host,
            dev,
            latency_ns: DEFAULT_LINK_LATENCY_NS,
            sync_period_ns: DEFAULT_SYNC_PERIOD_NS,
        });
        Ok(())
    }

    /// Connect a NIC's Ethernet interface to a switch port.
    ///
    /// A NIC has a single Ethernet attachment; connecting it twice is a
    /// configuration error.
    pub fn connect_nic(&mut self, nic: NicId, switch: SwitchId) -> Result<EthLinkId, SimError> {
        let endpoint = EthEndpoint::Nic(nic);
        if self
            .eth_links
            .iter()
            .any(|l| l.a == endpoint || l.b == endpoint)
        {
            return sim_error!("NIC {} is already connected", self.nics[nic.0].name);
        }
        debug!(
            "connect {} to {}",
            self.nics[nic.0].name, self.switches[switch.0].name
        );
        self.eth_links.push(EthLink {
            a: endpoint,
            b: EthEndpoint::Switch(switch),
            latency_ns: DEFAULT_LINK_LATENCY_NS,
            rate_mbps: None,
        });
        Ok(EthLinkId(self.eth_links.len() - 1))
    }

    /// Chain two switches with a rate-constrained bottleneck channel.
    pub fn chain_switches(
        &mut self,
        a: SwitchId,
        b: SwitchId,
        latency_ns: u64,
        rate_mbps: u64,
    ) -> EthLinkId {
        debug!(
            "chain {} to {} at {rate_mbps}Mbps/{latency_ns}ns",
            self.switches[a.0].name, self.switches[b.0].name
        );
        self.eth_links.push(EthLink {
            a: EthEndpoint::Switch(a),
            b: EthEndpoint::Switch(b),
            latency_ns,
            rate_mbps: Some(rate_mbps),
        });
        EthLinkId(self.eth_links.len() - 1)
    }

    #[must_use]
    pub fn host(&self, id: HostId) -> &Host {
        &self.hosts[id.0]
    }

    pub fn host_mut(&mut self, id: HostId) -> &mut Host {
        &mut self.hosts[id.0]
    }

    #[must_use]
    pub fn nic(&self, id: NicId) -> &Nic {
        &self.nics[id.0]
    }

    pub fn nic_mut(&mut self, id: NicId) -> &mut Nic {
        &mut self.nics[id.0]
    }

    #[must_use]
    pub fn accel(&self, id: AccelId) -> &AccelDev {
        &self.accels[id.0]
    }

    #[must_use]
    pub fn switch(&self, id: SwitchId) -> &Switch {
        &self.switches[id.0]
    }

    pub fn host_by_name(&self, name: &str) -> Result<HostId, SimError> {
        match self.hosts.iter().position(|h| h.name == name) {
            Some(idx) => Ok(HostId(idx)),
            None => sim_error!("No Host '{name}'"),
        }
    }

    /// The host a device is attached to, if any.
    #[must_use]
    pub fn pcie_host(&self, dev: PciePort) -> Option<HostId> {
        self.pcie_links
            .iter()
            .find(|l| l.dev == dev)
            .map(|l| l.host)
    }

    /// The NICs attached to a host, in attachment order.
    #[must_use]
    pub fn host_nics(&self, host: HostId) -> Vec<NicId> {
        self.pcie_links
            .iter()
            .filter(|l| l.host == host)
            .filter_map(|l| match l.dev {
                PciePort::Nic(nic) => Some(nic),
                PciePort::Accel(_) => None,
            })
            .collect()
    }

    /// The Ethernet link a NIC is attached by, if connected.
    #[must_use]
    pub fn nic_link(&self, nic: NicId) -> Option<EthLinkId> {
        let endpoint = EthEndpoint::Nic(nic);
        self.eth_links
            .iter()
            .position(|l| l.a == endpoint || l.b == endpoint)
            .map(EthLinkId)
    }

    pub fn pcie_link_mut(&mut self, host: HostId, dev: PciePort) -> Result<&mut PcieLink, SimError> {
        match self
            .pcie_links
            .iter_mut()
            .find(|l| l.host == host && l.dev == dev)
        {
            Some(link) => Ok(link),
            None => sim_error!("No PCIe link for host index {}", host.0),
        }
    }

    #[must_use]
    pub fn pcie_links(&self) -> &[PcieLink] {
        &self.pcie_links
    }

    #[must_use]
    pub fn eth_links(&self) -> &[EthLink] {
        &self.eth_links
    }

    #[must_use]
    pub fn eth_link(&self, id: EthLinkId) -> &EthLink {
        &self.eth_links[id.0]
    }

    #[must_use]
    pub fn num_hosts(&self) -> usize {
        self.hosts.len()
    }

    #[must_use]
    pub fn num_nics(&self) -> usize {
        self.nics.len()
    }

    #[must_use]
    pub fn num_accels(&self) -> usize {
        self.accels.len()
    }

    #[must_use]
    pub fn num_switches(&self) -> usize {
        self.switches.len()
    }

    #[must_use]
    pub fn host_ids(&self) -> impl Iterator<Item = HostId> {
        (0..self.hosts.len()).map(HostId)
    }

    #[must_use]
    pub fn nic_ids(&self) -> impl Iterator<Item = NicId> {
        (0..self.nics.len()).map(NicId)
    }

    #[must_use]
    pub fn accel_ids(&self) -> impl Iterator<Item = AccelId> {
        (0..self.accels.len()).map(AccelId)
    }

    #[must_use]
    pub fn switch_ids(&self) -> impl Iterator<Item = SwitchId> {
        (0..self.switches.len()).map(SwitchId)
    }

    fn pcie_port_name(&self, dev: PciePort) -> &str {
        match dev {
            PciePort::Nic(id) => &self.nics[id.0].name,
            PciePort::Accel(id) => &self.accels[id.0].name,
        }
    }
}

impl Display for System {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Hosts:")?;
        for (i, host) in self.hosts.iter().enumerate() {
            writeln!(f, "  {i}: {}", host.name)?;
        }

        writeln!(f, "\nNICs:")?;
        for (i, nic) in self.nics.iter().enumerate() {
            writeln!(f, "  {i}: {}", nic.name)?;
        }

        writeln!(f, "\nAccelerators:")?;
        for (i, accel) in self.accels.iter().enumerate() {
            writeln!(f, "  {i}: {}", accel.name)?;
        }

        writeln!(f, "\nSwitches:")?;
        for (i, switch) in self.switches.iter().enumerate() {
            writeln!(f, "  {i}: {}", switch.name)?;
        }

        Ok(())
    }
}
