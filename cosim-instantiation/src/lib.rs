// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! The handoff boundary between experiment definitions and the runner.
//!
//! An [`Instantiation`] takes a fully wired system with its simulator
//! bindings, assigns the simulators to [`Fragment`]s (one per execution
//! machine), validates the assignment, and renders the [`RunPlan`] the
//! external runner consumes. Nothing here launches a process; the run
//! plan is plain serializable data.

use cosim_simulation::{SimRef, Simulation};
use cosim_system::types::{SimError, SimResult};
use cosim_system::{EthEndpoint, System, sim_error};
use log::debug;

pub mod env;
pub mod fragment;
pub mod plan;

use env::Env;
use fragment::{Fragment, FragmentId, ProxyKind, ProxyPair};
use plan::{RunPlan, SimCommand, render_command};

/// A validated, fragment-assigned experiment ready to hand to the
/// runner.
#[derive(Clone, Debug, PartialEq)]
pub struct Instantiation {
    pub system: System,
    pub simulation: Simulation,
    fragments: Vec<Fragment>,
    proxies: Vec<ProxyPair>,
}

impl Instantiation {
    #[must_use]
    pub fn new(system: System, simulation: Simulation) -> Self {
        Self {
            system,
            simulation,
            fragments: Vec::new(),
            proxies: Vec::new(),
        }
    }

    /// The common case: every simulator in one fragment on one machine.
    #[must_use]
    pub fn simple(system: System, simulation: Simulation) -> Self {
        let mut all = Fragment::new("all");
        all.add_simulators(simulation.all_sims());
        let mut inst = Self::new(system, simulation);
        inst.fragments.push(all);
        inst
    }

    pub fn add_fragment(&mut self, fragment: Fragment) -> FragmentId {
        self.fragments.push(fragment);
        FragmentId(self.fragments.len() - 1)
    }

    #[must_use]
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn fragment_mut(&mut self, id: FragmentId) -> &mut Fragment {
        &mut self.fragments[id.0]
    }

    /// Create a proxy pair connecting two fragments; channels are
    /// assigned to it afterwards.
    pub fn create_proxy_pair(&mut self, kind: ProxyKind, a: FragmentId, b: FragmentId) -> usize {
        self.proxies.push(ProxyPair {
            kind,
            a,
            b,
            links: Vec::new(),
        });
        self.proxies.len() - 1
    }

    pub fn proxy_mut(&mut self, idx: usize) -> &mut ProxyPair {
        &mut self.proxies[idx]
    }

    #[must_use]
    pub fn proxies(&self) -> &[ProxyPair] {
        &self.proxies
    }

    /// The fragment a simulator is assigned to.
    pub fn fragment_of(&self, sim: SimRef) -> Result<&Fragment, SimError> {
        let mut found = None;
        for fragment in &self.fragments {
            if fragment.contains(sim) {
                if found.is_some() {
                    return sim_error!(
                        "Simulator {} is assigned to more than one fragment",
                        self.simulation.full_name(&self.system, sim)
                    );
                }
                found = Some(fragment);
            }
        }
        match found {
            Some(fragment) => Ok(fragment),
            None => sim_error!(
                "Simulator {} is not assigned to any fragment",
                self.simulation.full_name(&self.system, sim)
            ),
        }
    }

    fn sim_for_endpoint(&self, endpoint: EthEndpoint) -> Result<SimRef, SimError> {
        match endpoint {
            EthEndpoint::Nic(nic) => self.simulation.find_nic_sim(nic),
            EthEndpoint::Switch(switch) => {
                match self
                    .simulation
                    .net_sims()
                    .iter()
                    .position(|net| net.switches.contains(&switch))
                {
                    Some(idx) => Ok(SimRef::Net(idx)),
                    None => sim_error!("No simulator bound for switch index {}", switch.0),
                }
            }
        }
    }

    /// Check the instantiation is complete and consistent before any
    /// handoff.
    ///
    /// Every simulator must sit in exactly one fragment; every Ethernet
    /// channel crossing a fragment boundary must be forwarded by exactly
    /// one proxy pair; bridged NICs must share a fragment with the
    /// network simulator bridging them; and the runner must be able to
    /// tell when the experiment is done (at least one waiting simulator,
    /// an unambiguous final workload).
    pub fn finalize_validate(&self) -> SimResult {
        if self.fragments.is_empty() {
            return sim_error!("Instantiation has no fragments");
        }

        for sim in self.simulation.all_sims() {
            self.fragment_of(sim)?;
        }

        for (idx, link) in self.system.eth_links().iter().enumerate() {
            let sim_a = self.sim_for_endpoint(link.a)?;
            let sim_b = self.sim_for_endpoint(link.b)?;
            let frag_a = self.fragment_of(sim_a)?;
            let frag_b = self.fragment_of(sim_b)?;
            if frag_a.name == frag_b.name {
                continue;
            }
            let num_proxies = self
                .proxies
                .iter()
                .filter(|p| p.links.iter().any(|l| l.0 == idx))
                .count();
            if num_proxies != 1 {
                return sim_error!(
                    "Ethernet link {idx} crosses fragments '{}' and '{}' but is assigned to {num_proxies} proxy pairs",
                    frag_a.name,
                    frag_b.name
                );
            }
        }

        for (net_idx, net) in self.simulation.net_sims().iter().enumerate() {
            let net_fragment = self.fragment_of(SimRef::Net(net_idx))?;
            for bridge in &net.bridges {
                let nic_sim = self.simulation.find_nic_sim(bridge.nic)?;
                let nic_fragment = self.fragment_of(nic_sim)?;
                if nic_fragment.name != net_fragment.name {
                    return sim_error!(
                        "Bridged endpoint {} and its NIC simulator sit in different fragments",
                        bridge.name
                    );
                }
            }
        }

        let num_waiting = self.simulation.num_waiting();
        if num_waiting == 0 {
            return sim_error!("No simulator waits; the runner would never stop");
        }

        let num_last = self
            .system
            .host_ids()
            .filter_map(|h| self.system.host(h).app.as_ref())
            .filter(|app| app.is_last)
            .count();
        if num_last > 1 {
            return sim_error!("{num_last} workloads are marked is_last (at most one allowed)");
        }
        if num_waiting > 1 && num_last == 0 {
            return sim_error!(
                "{num_waiting} simulators wait but no workload is marked is_last; \
                 the runner cannot tell which one finishes the experiment"
            );
        }

        Ok(())
    }

    /// Validate and render the run plan handed to the runner.
    pub fn run_plan(&self, env: &Env) -> Result<RunPlan, SimError> {
        self.finalize_validate()?;

        let mut commands = Vec::new();
        for sim in self.simulation.all_sims() {
            let name = self.simulation.full_name(&self.system, sim);
            let cmd = render_command(&self.system, &self.simulation, env, sim)?;
            let wait = match sim {
                SimRef::Host(idx) => self.simulation.host_sims()[idx].wait,
                _ => false,
            };
            let fragment = self.fragment_of(sim)?.name.clone();
            debug!("plan {name}: {cmd}");
            commands.push(SimCommand {
                name,
                cmd,
                wait,
                fragment,
            });
        }

        Ok(RunPlan {
            experiment: self.simulation.name.clone(),
            output: env
                .output_path(&self.simulation.name, 1)
                .display()
                .to_string(),
            commands,
        })
    }
}
