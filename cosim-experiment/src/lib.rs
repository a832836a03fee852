// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Declarative experiment definitions.
//!
//! An experiment definition is a YAML file describing the topology
//! (client/server host groups, NIC variant, network shape, bottleneck
//! link) and the workload. [`build_experiments`] turns one definition
//! into fully wired [`Experiment`]s — one per NIC variant listed — each
//! of which can then be instantiated for the runner.

use std::fmt::Display;

use cosim_instantiation::Instantiation;
use cosim_instantiation::fragment::Fragment;
use cosim_simulation::{SimRef, Simulation};
use cosim_system::types::SimError;
use cosim_system::{HostId, System, sim_error};

pub mod builder;
pub mod topo;
pub mod types;

pub use builder::build_experiments;
use types::DistributedSection;

/// A fully wired experiment: the system graph plus its simulator
/// bindings.
#[derive(Clone, Debug, PartialEq)]
pub struct Experiment {
    pub name: String,
    pub system: System,
    pub simulation: Simulation,
    /// Server-side hosts, in creation order.
    pub servers: Vec<HostId>,
    /// Client-side hosts, in creation order. Device experiments list
    /// their hosts here.
    pub clients: Vec<HostId>,
}

impl Experiment {
    /// Hand the experiment over to the instantiation layer.
    ///
    /// Without a distributed layout every simulator lands in a single
    /// fragment. With one, the network simulators form one fragment and
    /// the server and client sides one fragment each, connected by a
    /// proxy pair per crossing NIC channel.
    pub fn instantiate(
        &self,
        layout: Option<&DistributedSection>,
    ) -> Result<Instantiation, SimError> {
        let layout = match layout {
            None => {
                let inst =
                    Instantiation::simple(self.system.clone(), self.simulation.clone());
                inst.finalize_validate()?;
                return Ok(inst);
            }
            Some(layout) => layout,
        };

        let mut inst = Instantiation::new(self.system.clone(), self.simulation.clone());

        let mut network = Fragment::new("network");
        network.add_simulators((0..self.simulation.net_sims().len()).map(SimRef::Net));
        let network = inst.add_fragment(network);
        let left = inst.add_fragment(Fragment::new("left"));
        let right = inst.add_fragment(Fragment::new("right"));

        for (side, hosts) in [(left, &self.servers), (right, &self.clients)] {
            for host in hosts {
                let host_sim = inst.simulation.find_host_sim(*host)?;
                inst.fragment_mut(side).add_simulators([host_sim]);

                for nic in inst.system.host_nics(*host) {
                    let nic_sim = inst.simulation.find_nic_sim(nic)?;
                    inst.fragment_mut(side).add_simulators([nic_sim]);

                    let link = match inst.system.nic_link(nic) {
                        Some(link) => link,
                        None => {
                            return sim_error!(
                                "NIC {} has no Ethernet link to forward",
                                inst.system.nic(nic).name
                            );
                        }
                    };
                    let proxy = inst.create_proxy_pair(layout.proxy, network, side);
                    inst.proxy_mut(proxy).assign_eth_link(link);
                }
            }
        }

        inst.finalize_validate()?;
        Ok(inst)
    }
}

impl Display for Experiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Experiment {}:", self.name)?;
        writeln!(f, "{}", self.system)?;
        write!(f, "{}", self.simulation)
    }
}
