// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! A simulated network interface card.

/// A NIC attached to a host over simulated PCIe, with one Ethernet
/// attachment into the network.
#[derive(Clone, Debug, PartialEq)]
pub struct Nic {
    pub name: String,
    /// IPv4 address the driving host configures on this interface.
    pub ip: Option<String>,
}

impl Nic {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ip: None,
        }
    }

    /// The locally-administered MAC for NIC index `idx` within a system.
    ///
    /// Stable across builds so that two builds of the same system are
    /// structurally equal.
    #[must_use]
    pub fn mac_for(idx: usize) -> String {
        format!("02:00:00:00:00:{:02x}", (idx + 1) & 0xff)
    }
}
