// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! A simulated Ethernet switch.

/// An Ethernet aggregation point. Attachments are recorded on the links
/// themselves; a switch grows ports as links are connected to it.
#[derive(Clone, Debug, PartialEq)]
pub struct Switch {
    pub name: String,
}

impl Switch {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}
