// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Types that map directly to the YAML schema of an experiment
//! definition.

use byte_unit::Byte;
use cosim_instantiation::fragment::ProxyKind;
use cosim_system::types::SimError;
use serde::{Deserialize, de};
use serde_yaml::Value;

/// Parse a value which could be an integer or a string and return a u64
/// byte count.
///
/// The string can be a hex string with underscores or a Byte string that
/// specifies units:
///  0x10000000
///  0x1000_0000
///  2048M, 2GiB
pub fn parse_byte_str<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: de::Deserializer<'de>,
{
    // Deserialize to a generic `Value` first so that a plain u64 is
    // accepted as-is.
    let value: Value = Deserialize::deserialize(deserializer)?;

    if let Some(number) = value.as_u64() {
        return Ok(number);
    }

    let s = match value.as_str() {
        Some(s) => s.to_owned(),
        None => {
            return Err(de::Error::custom(format!(
                "'{value:?}': Unsupported type for Deserialize (should be u64 or String)"
            )));
        }
    };

    let lowercase = s.to_lowercase();
    if lowercase.starts_with("0x") {
        let digits = lowercase.trim_start_matches("0x").replace('_', "");
        u64::from_str_radix(&digits, 16)
            .map_err(|e| de::Error::custom(format!("Unable to parse {s} as hex string: {e}")))
    } else {
        let ignore_case = false;
        let num_bytes = Byte::parse_str(&s, ignore_case)
            .map_err(|e| de::Error::custom(format!("Unable to parse {s} as Byte string: {e}")))?;
        Ok(num_bytes.as_u64())
    }
}

pub fn parse_optional_byte_str<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: de::Deserializer<'de>,
{
    Ok(Some(parse_byte_str(deserializer)?))
}

fn default_sync_period_ns() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

fn default_duration_s() -> u64 {
    10
}

fn default_ping_count() -> u64 {
    20
}

fn default_stop_s() -> u64 {
    20
}

/// One experiment definition file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExperimentConfig {
    pub name: String,
    /// Use checkpoint and restore to skip the slow boot phase of
    /// detailed hosts.
    #[serde(default)]
    pub checkpoint: bool,
    /// Lock-step all simulator clocks. When false the bridged endpoints
    /// run with synchronization disabled.
    #[serde(default = "default_true")]
    pub synchronized: bool,
    #[serde(default = "default_sync_period_ns")]
    pub sync_period_ns: u64,
    /// Host groups; each group contributes `count` server/client pairs
    /// at the given fidelity.
    pub hosts: Vec<HostGroupSection>,
    /// NIC variant tags; one experiment is built per entry. Unused (and
    /// allowed empty) for device experiments.
    #[serde(default)]
    pub nics: Vec<String>,
    #[serde(default)]
    pub network: NetworkKind,
    /// Bottleneck link settings; required for the dumbbell network.
    pub link: Option<LinkSection>,
    /// Number of background traffic pairs native to the packet-level
    /// network simulator.
    #[serde(default)]
    pub traffic_pairs: usize,
    /// Workload for each client/server pair; required for network
    /// experiments, unused for device experiments.
    #[serde(default)]
    pub workload: Option<WorkloadSection>,
    /// Name of the prepared distribution disk image. Defaults to
    /// "base".
    #[serde(default)]
    pub disk_image: Option<String>,
    /// Guest memory per host in bytes (accepts size strings such as
    /// `2GiB`); NIC node profiles may raise it further.
    #[serde(default, deserialize_with = "parse_optional_byte_str")]
    pub host_memory: Option<u64>,
    /// Distributed execution layout; omit for a single-machine run.
    #[serde(default)]
    pub distributed: Option<DistributedSection>,
    /// Accelerator-device experiment: each host drives a PCIe
    /// accelerator instead of a NIC; `nics` and `network` are unused.
    #[serde(default)]
    pub device: Option<DeviceSection>,
}

impl ExperimentConfig {
    pub fn from_string(config: &str) -> Result<Self, SimError> {
        serde_yaml::from_str(config)
            .map_err(|e| SimError(format!("serde_yaml::from_str failed: {e}")))
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self, SimError> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| SimError(format!("Unable to read {}: {e}", path.display())))?;
        Self::from_string(&s)
    }
}

/// A group of hosts simulated at one fidelity.
///
/// The variant is kept as its tag here and resolved through the backend
/// selector at build time, so an unsupported tag fails with the
/// selector's configuration error.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostGroupSection {
    pub variant: String,
    pub count: usize,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
    /// Behavioral packet switch.
    #[default]
    Switch,
    /// Packet-level network simulator modelling a dumbbell bottleneck.
    Dumbbell,
}

#[derive(Copy, Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkSection {
    pub rate_mbps: u64,
    pub latency_ms: u64,
}

/// The workload attached to each client/server pair.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum WorkloadSection {
    /// netperf throughput pair: server daemon plus driving client.
    Netperf {
        #[serde(default = "default_duration_s")]
        duration_s: u64,
    },
    /// Idle server pinged by the client.
    Ping {
        #[serde(default = "default_ping_count")]
        count: u64,
    },
    /// Explicit command lists for both sides.
    Raw {
        server_cmds: Vec<String>,
        client_cmds: Vec<String>,
    },
}

impl WorkloadSection {
    /// Stop time for the background traffic applications, matched to the
    /// foreground workload length.
    #[must_use]
    pub fn traffic_stop_s(&self) -> u64 {
        match self {
            WorkloadSection::Netperf { duration_s } => duration_s * 2,
            _ => default_stop_s(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DistributedSection {
    pub proxy: ProxyKind,
}

/// An accelerator attached to each host, with the benchmark driving it.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceSection {
    /// Device backend tag: `behavioral` or `rtl`.
    pub backend: String,
    pub op_latency_ns: u64,
    /// Problem size the device model is configured for.
    pub size: u64,
    /// Guest driver binary injected into the host image.
    pub driver: std::path::PathBuf,
    pub iterations: Option<u64>,
    /// RTL models only: dump a waveform for offline inspection.
    #[serde(default)]
    pub waveform: bool,
}
