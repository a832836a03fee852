// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Workload descriptors.
//!
//! A workload is the application a simulated host runs once it has booted:
//! the ordered shell commands to execute, plus the files that must be
//! injected into the host's disk image before boot. Workloads are a closed
//! set so that experiment definitions can select them by tag and so that
//! built systems stay comparable.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::types::SimError;

/// Files to inject into a host image: image-local name to file contents.
///
/// A `BTreeMap` keeps manifests deterministically ordered, which keeps two
/// builds of the same system structurally equal.
pub type FileMap = BTreeMap<String, Vec<u8>>;

/// Read a workload asset from disk.
///
/// A missing or unreadable asset is a fatal configuration error naming the
/// offending path; there is no retry.
pub fn read_asset(path: &Path) -> Result<Vec<u8>, SimError> {
    std::fs::read(path).map_err(|e| SimError(format!("Unable to read {}: {e}", path.display())))
}

/// Merge a workload's own files over a base manifest.
///
/// On key collision the workload's entry wins (last writer wins). This is
/// documented behaviour, not necessarily desired: a colliding key silently
/// replaces the base file.
#[must_use]
pub fn merge_files(base: &FileMap, own: FileMap) -> FileMap {
    let mut merged = base.clone();
    merged.extend(own);
    merged
}

/// A netperf-style throughput server: starts the server daemon and idles.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct NetServer {}

/// A netperf-style throughput client.
#[derive(Clone, Debug, PartialEq)]
pub struct NetClient {
    /// IP of the server to drive traffic at (no prefix).
    pub server_ip: String,
    /// Test length in seconds.
    pub duration_s: u64,
}

impl NetClient {
    #[must_use]
    pub fn new(server_ip: &str) -> Self {
        Self {
            server_ip: server_ip.to_string(),
            duration_s: 10,
        }
    }
}

/// Ping a peer a fixed number of times.
#[derive(Clone, Debug, PartialEq)]
pub struct PingClient {
    pub target_ip: String,
    pub count: u64,
}

impl PingClient {
    #[must_use]
    pub fn new(target_ip: &str) -> Self {
        Self {
            target_ip: target_ip.to_string(),
            count: 20,
        }
    }
}

/// Sleep for a number of seconds, or forever when `seconds` is `None`.
///
/// The standard idle workload for a host that only serves traffic.
#[derive(Clone, Debug, PartialEq)]
pub struct Sleep {
    pub seconds: Option<u64>,
}

/// An explicit command list, run verbatim.
#[derive(Clone, Debug, PartialEq)]
pub struct RawCommands {
    pub cmds: Vec<String>,
}

/// Driver benchmark for an attached accelerator device.
///
/// Injects the compiled guest driver binary and invokes it with the
/// configured problem size and iteration count. Omitted parameters are
/// omitted from the command line so the driver's own defaults apply.
#[derive(Clone, Debug, PartialEq)]
pub struct AccelBench {
    /// Guest driver binary to inject as `accel-bench`.
    pub driver: PathBuf,
    pub size: Option<u64>,
    pub iterations: Option<u64>,
}

/// DMA image-decode workload for an attached decoder device.
///
/// Copies each input image into guest memory with `dd`, invokes the PCI
/// driver against the device, and optionally dumps the decoded output as
/// base64 for the offline checker to recover.
#[derive(Clone, Debug, PartialEq)]
pub struct DevImageDecode {
    /// PCI address of the decoder as seen by the guest.
    pub pci_dev: String,
    /// Guest driver binary to inject as `pci-driver`.
    pub driver: PathBuf,
    pub images: Vec<PathBuf>,
    /// Guest-physical source address the image is DMA'd from.
    pub dma_src: u64,
    /// Guest-physical destination address the decoded output lands at.
    pub dma_dst: u64,
    pub dump_output: bool,
}

/// The closed set of workloads an experiment can attach to a host.
#[derive(Clone, Debug, PartialEq)]
pub enum Workload {
    NetServer(NetServer),
    NetClient(NetClient),
    PingClient(PingClient),
    Sleep(Sleep),
    RawCommands(RawCommands),
    AccelBench(AccelBench),
    DevImageDecode(DevImageDecode),
}

impl Workload {
    /// Commands to run before the device/driver setup phase of boot.
    ///
    /// Device-driver workloads need the vfio path opened up before the
    /// application runs; everything else has no pre-phase.
    #[must_use]
    pub fn prepare_cmds(&self) -> Vec<String> {
        match self {
            Workload::AccelBench(_) | Workload::DevImageDecode(_) => vec![
                "echo 1 >/sys/module/vfio/parameters/enable_unsafe_noiommu_mode".to_string(),
                "echo 9876 1234 >/sys/bus/pci/drivers/vfio-pci/new_id".to_string(),
            ],
            _ => Vec::new(),
        }
    }

    /// The ordered application commands.
    ///
    /// Pure with respect to the descriptor's fields.
    #[must_use]
    pub fn run_cmds(&self) -> Vec<String> {
        match self {
            Workload::NetServer(_) => {
                vec!["netserver".to_string(), "sleep infinity".to_string()]
            }
            Workload::NetClient(c) => vec![
                format!(
                    "netperf -H {} -t TCP_STREAM -l {}",
                    c.server_ip, c.duration_s
                ),
                format!("netperf -H {} -t TCP_RR -l {}", c.server_ip, c.duration_s),
            ],
            Workload::PingClient(p) => vec![
                "sleep 2".to_string(),
                format!("ping -c {} {}", p.count, p.target_ip),
            ],
            Workload::Sleep(s) => match s.seconds {
                Some(secs) => vec![format!("sleep {secs}")],
                None => vec!["sleep infinity".to_string()],
            },
            Workload::RawCommands(r) => r.cmds.clone(),
            Workload::AccelBench(b) => {
                let cmd = match (b.size, b.iterations) {
                    (None, _) => "/tmp/guest/accel-bench".to_string(),
                    (Some(n), None) => format!("/tmp/guest/accel-bench {n}"),
                    (Some(n), Some(its)) => format!("/tmp/guest/accel-bench {n} {its}"),
                };
                vec![cmd]
            }
            Workload::DevImageDecode(d) => d.run_cmds(),
        }
    }

    /// The workload's own file manifest (image-local name to contents).
    ///
    /// Asset files are read eagerly; a missing file fails the build.
    pub fn own_files(&self) -> Result<FileMap, SimError> {
        let mut files = FileMap::new();
        match self {
            Workload::AccelBench(b) => {
                files.insert("accel-bench".to_string(), read_asset(&b.driver)?);
            }
            Workload::DevImageDecode(d) => {
                files.insert("pci-driver".to_string(), read_asset(&d.driver)?);
                for img in &d.images {
                    files.insert(image_name(img), read_asset(img)?);
                }
            }
            _ => {}
        }
        Ok(files)
    }

    /// True when overall experiment completion should wait on this
    /// workload's host by default.
    #[must_use]
    pub fn default_wait(&self) -> bool {
        !matches!(self, Workload::NetServer(_) | Workload::Sleep(_))
    }
}

fn image_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.to_string_lossy().into_owned(),
    }
}

impl DevImageDecode {
    fn run_cmds(&self) -> Vec<String> {
        let mut cmds = Vec::new();
        for img in &self.images {
            let name = image_name(img);
            cmds.push(format!("echo starting decode of image {name}"));
            cmds.push(format!(
                "dd if=/tmp/guest/{name} bs=4096 of=/dev/mem seek={} oflag=seek_bytes",
                self.dma_src
            ));
            cmds.push(format!(
                "/tmp/guest/pci-driver {} {} {}",
                self.pci_dev, self.dma_src, self.dma_dst
            ));
            cmds.push(format!("echo finished decode of image {name}"));
            if self.dump_output {
                cmds.push("echo output dump begin".to_string());
                cmds.push(format!(
                    "dd if=/dev/mem iflag=skip_bytes bs=4096 skip={} status=none | base64",
                    self.dma_dst
                ));
                cmds.push("echo output dump end".to_string());
            }
        }
        cmds
    }
}

/// A workload bound to a host, with the flags the runner needs.
#[derive(Clone, Debug, PartialEq)]
pub struct Application {
    pub workload: Workload,
    /// Overall experiment completion depends on this host's exit.
    pub wait: bool,
    /// This workload is responsible for final output and cleanup; the
    /// runner stops the experiment once it exits.
    pub is_last: bool,
}

impl Application {
    /// Bind a workload with its default wait behaviour.
    #[must_use]
    pub fn new(workload: Workload) -> Self {
        let wait = workload.default_wait();
        Self {
            workload,
            wait,
            is_last: false,
        }
    }

    /// The full manifest: the host's base files with the workload's own
    /// files merged over them (last writer wins on collision).
    pub fn config_files(&self, base: &FileMap) -> Result<FileMap, SimError> {
        Ok(merge_files(base, self.workload.own_files()?))
    }
}
