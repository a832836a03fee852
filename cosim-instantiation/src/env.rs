// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Execution-environment path conventions.
//!
//! The runner and every simulator process agree on where sockets, shared
//! memory regions, disk images and result documents live purely by
//! convention; this module is the single place those conventions are
//! spelled out.

use std::path::{Path, PathBuf};

/// Paths of one experiment run.
#[derive(Clone, Debug, PartialEq)]
pub struct Env {
    /// Per-run scratch directory holding sockets and generated images.
    pub workdir: PathBuf,
    /// Directory the runner writes result documents into.
    pub outdir: PathBuf,
    /// Directory for shared-memory queues between simulator processes.
    pub shmdir: PathBuf,
    /// Checkout of the simulator binaries and prepared kernel/disk
    /// images.
    pub repo: PathBuf,
    /// Directory checkpoints are taken into and restored from.
    pub cpdir: PathBuf,
}

impl Env {
    #[must_use]
    pub fn new(workdir: &Path, outdir: &Path, repo: &Path) -> Self {
        Self {
            workdir: workdir.to_path_buf(),
            outdir: outdir.to_path_buf(),
            shmdir: workdir.join("shm"),
            repo: repo.to_path_buf(),
            cpdir: workdir.join("checkpoints"),
        }
    }

    /// PCIe socket for a device, named by the device.
    #[must_use]
    pub fn dev_pci_path(&self, dev_name: &str) -> PathBuf {
        self.workdir.join(format!("dev.pci.{dev_name}"))
    }

    /// Shared-memory queue file for a device.
    #[must_use]
    pub fn dev_shm_path(&self, dev_name: &str) -> PathBuf {
        self.shmdir.join(format!("dev.shm.{dev_name}"))
    }

    /// Ethernet socket for a NIC, named by the NIC.
    #[must_use]
    pub fn nic_eth_path(&self, nic_name: &str) -> PathBuf {
        self.workdir.join(format!("nic.eth.{nic_name}"))
    }

    /// Ethernet socket for a proxy endpoint of a cross-fragment link.
    #[must_use]
    pub fn proxy_eth_path(&self, fragment: &str, idx: usize) -> PathBuf {
        self.workdir.join(format!("proxy.eth.{fragment}.{idx}"))
    }

    /// The prepared root disk image for a host.
    #[must_use]
    pub fn hd_path(&self, image: &str) -> PathBuf {
        self.repo.join("images").join(image)
    }

    /// The generated per-host configuration image carrying the command
    /// script and injected files.
    #[must_use]
    pub fn cfg_image_path(&self, host_name: &str) -> PathBuf {
        self.workdir.join(format!("cfg.{host_name}.tar"))
    }

    /// The kernel booted by the full-system host simulators.
    #[must_use]
    pub fn kernel_path(&self) -> PathBuf {
        self.repo.join("images").join("vmlinux")
    }

    /// Checkpoint directory for a host.
    #[must_use]
    pub fn checkpoint_path(&self, host_name: &str) -> PathBuf {
        self.cpdir.join(host_name)
    }

    /// Where the runner writes the result document of run `run` of the
    /// named experiment: `out/<name>-<run>.json`.
    #[must_use]
    pub fn output_path(&self, experiment: &str, run: usize) -> PathBuf {
        self.outdir.join(format!("{experiment}-{run}.json"))
    }

    /// A simulator binary within the checkout.
    #[must_use]
    pub fn sim_bin(&self, name: &str) -> PathBuf {
        self.repo.join("sims").join(name)
    }
}
