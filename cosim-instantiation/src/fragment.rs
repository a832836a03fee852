// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Fragments for distributed execution.
//!
//! A fragment is the subset of an experiment's simulators assigned to one
//! execution machine. Fragments are connected by proxy pairs, one proxy
//! process on each side, which forward the Ethernet channels that cross
//! the fragment boundary.

use std::collections::BTreeSet;

use cosim_simulation::SimRef;
use cosim_system::EthLinkId;
use serde::{Deserialize, Serialize};

/// Transport used by a proxy pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyKind {
    /// TCP connection between the two execution machines.
    Tcp,
    /// RDMA transport for latency-sensitive channels.
    Rdma,
}

/// A named subset of simulators assigned to one execution machine.
#[derive(Clone, Debug, PartialEq)]
pub struct Fragment {
    pub name: String,
    /// Tag selecting the executor image the runner launches this
    /// fragment with; `None` uses the runner's default.
    pub executor_tag: Option<String>,
    pub sims: BTreeSet<SimRef>,
}

impl Fragment {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            executor_tag: None,
            sims: BTreeSet::new(),
        }
    }

    pub fn add_simulators(&mut self, sims: impl IntoIterator<Item = SimRef>) {
        self.sims.extend(sims);
    }

    #[must_use]
    pub fn contains(&self, sim: SimRef) -> bool {
        self.sims.contains(&sim)
    }
}

/// Index of a fragment within its instantiation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FragmentId(pub usize);

/// A pair of proxy processes connecting two fragments.
#[derive(Clone, Debug, PartialEq)]
pub struct ProxyPair {
    pub kind: ProxyKind,
    pub a: FragmentId,
    pub b: FragmentId,
    /// The Ethernet links forwarded over this proxy pair.
    pub links: Vec<EthLinkId>,
}

impl ProxyPair {
    /// Forward an Ethernet channel over this proxy pair.
    pub fn assign_eth_link(&mut self, link: EthLinkId) {
        self.links.push(link);
    }
}
