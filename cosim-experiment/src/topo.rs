// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Dumbbell topology wiring helpers.
//!
//! A dumbbell experiment has two sides joined by a bottleneck; these
//! helpers splice an externally simulated NIC into one side as a bridge
//! endpoint. The network simulator owns both sides, so "attaching" is
//! appending to the simulator's endpoint list.

use cosim_simulation::net_sim::{BridgeEndpoint, NetSim, Side, SyncMode};
use cosim_system::NicId;

/// Ethernet latency between a bridge endpoint and the modelled topology.
pub const BRIDGE_ETH_LATENCY_NS: u64 = 1000;

fn bridge(name: &str, nic: NicId, unsynchronized: bool, side: Side) -> BridgeEndpoint {
    let sync = if unsynchronized {
        SyncMode::Disabled
    } else {
        SyncMode::Synchronized
    };
    BridgeEndpoint {
        name: name.to_string(),
        nic,
        sync,
        eth_latency_ns: BRIDGE_ETH_LATENCY_NS,
        side,
    }
}

/// Attach a bridged host endpoint to the left side of the bottleneck.
///
/// Appends one endpoint per call. Names are not checked for uniqueness:
/// attaching the same name twice yields two distinct endpoints, matching
/// the positional (not name-keyed) contract of the topology.
pub fn add_endpoint_left(net: &mut NetSim, name: &str, nic: NicId, unsynchronized: bool) {
    net.add_bridge(bridge(name, nic, unsynchronized, Side::Left));
}

/// Attach a bridged host endpoint to the right side of the bottleneck.
///
/// Same contract as [`add_endpoint_left`].
pub fn add_endpoint_right(net: &mut NetSim, name: &str, nic: NicId, unsynchronized: bool) {
    net.add_bridge(bridge(name, nic, unsynchronized, Side::Right));
}
