// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Network simulator backends.
//!
//! A network simulator executes the switches of a system and, for the
//! packet-level backend, additionally hosts its own native traffic
//! endpoints and the bridge endpoints that splice externally simulated
//! NICs into the modelled topology.

use cosim_system::{NicId, SwitchId};
use serde::{Deserialize, Serialize};

/// Whether a bridged endpoint's clock is lock-stepped with its peer
/// simulator or free-running.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    Synchronized,
    Disabled,
}

/// Parameters of the dumbbell bottleneck modelled by the packet-level
/// backend.
#[derive(Clone, Debug, PartialEq)]
pub struct DumbbellParams {
    pub data_rate_mbps: u64,
    pub delay_ms: u64,
    pub queue_size_bytes: u64,
    pub mtu: u64,
}

impl DumbbellParams {
    /// Derive dumbbell parameters from the bottleneck link: the queue is
    /// sized at twice the bandwidth-delay product and the MTU leaves room
    /// for protocol headers.
    #[must_use]
    pub fn for_link(rate_mbps: u64, latency_ms: u64) -> Self {
        // 1 Mbps for 1 ms is 125 bytes in flight
        let bdp_bytes = rate_mbps * latency_ms * 125;
        Self {
            data_rate_mbps: rate_mbps,
            delay_ms: latency_ms,
            queue_size_bytes: 2 * bdp_bytes,
            mtu: 1500 - 52,
        }
    }
}

/// Concrete network backend configuration.
#[derive(Clone, Debug, PartialEq)]
pub enum NetBackend {
    /// Behavioral packet switch, no native endpoints.
    Switch,
    /// Packet-level network simulator modelling a dumbbell topology.
    Dumbbell(DumbbellParams),
}

/// Which side of the dumbbell bottleneck an endpoint attaches to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// An externally simulated NIC spliced into the modelled topology.
#[derive(Clone, Debug, PartialEq)]
pub struct BridgeEndpoint {
    pub name: String,
    pub nic: NicId,
    pub sync: SyncMode,
    pub eth_latency_ns: u64,
    pub side: Side,
}

/// An application run by a network-native traffic endpoint.
#[derive(Clone, Debug, PartialEq)]
pub enum TrafficApp {
    /// Accept and discard traffic on a local address.
    Sink { local: String, stop_s: u64 },
    /// Saturate the path towards a remote address.
    BulkSend { remote: String, stop_s: u64 },
}

/// A traffic endpoint native to the network simulator, used to generate
/// background load in mixed-fidelity experiments.
#[derive(Clone, Debug, PartialEq)]
pub struct TrafficEndpoint {
    pub name: String,
    /// Address with prefix, e.g. "192.168.64.1/24".
    pub ip: String,
    pub app: TrafficApp,
    pub side: Side,
}

/// A network simulator instance and everything it executes.
#[derive(Clone, Debug, PartialEq)]
pub struct NetSim {
    pub backend: NetBackend,
    pub switches: Vec<SwitchId>,
    pub bridges: Vec<BridgeEndpoint>,
    pub traffic: Vec<TrafficEndpoint>,
    /// Backend-specific option key/values rendered as `--key=value`.
    pub opts: Vec<(String, String)>,
}

impl NetSim {
    #[must_use]
    pub fn new(backend: NetBackend) -> Self {
        Self {
            backend,
            switches: Vec::new(),
            bridges: Vec::new(),
            traffic: Vec::new(),
            opts: Vec::new(),
        }
    }

    pub fn add_switch(&mut self, switch: SwitchId) {
        self.switches.push(switch);
    }

    /// Attach a bridge endpoint to one side of the dumbbell.
    ///
    /// Appends unconditionally: no existence check is made on the name,
    /// so attaching the same name twice yields two distinct endpoints.
    pub fn add_bridge(&mut self, bridge: BridgeEndpoint) {
        self.bridges.push(bridge);
    }

    pub fn add_traffic(&mut self, endpoint: TrafficEndpoint) {
        self.traffic.push(endpoint);
    }
}
