// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! A simulated machine under test.

use std::path::PathBuf;

use crate::app::{Application, FileMap, read_asset};
use crate::types::SimError;

/// A disk image attached to a host.
#[derive(Clone, Debug, PartialEq)]
pub enum DiskImage {
    /// A prepared distribution image, referenced by name.
    Distro(String),
    /// The generated per-host configuration image carrying the command
    /// script and the injected file manifest.
    LinuxConfig,
    /// A raw image file on the experiment machine.
    Raw(PathBuf),
}

/// A file injected into the host's configuration image in addition to
/// whatever the workload injects: image-local name plus source path.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtraFile {
    pub name: String,
    pub path: PathBuf,
}

/// A full simulated host (boots Linux, runs an [`Application`]).
#[derive(Clone, Debug, PartialEq)]
pub struct Host {
    pub name: String,
    /// IPv4 address without prefix, e.g. "10.0.0.1".
    pub ip: Option<String>,
    pub prefix: u8,
    pub memory_mb: u64,
    pub cores: usize,
    /// Extra kernel command-line content appended at boot.
    pub kcmd_append: String,
    /// Drivers loaded before the application runs. Entries ending in
    /// `.ko` are insmod'd from the injected guest directory, anything
    /// else is modprobe'd.
    pub drivers: Vec<String>,
    pub disks: Vec<DiskImage>,
    pub extra_files: Vec<ExtraFile>,
    pub app: Option<Application>,
}

impl Host {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ip: None,
            prefix: 24,
            memory_mb: 512,
            cores: 1,
            kcmd_append: String::new(),
            drivers: Vec::new(),
            disks: Vec::new(),
            extra_files: Vec::new(),
            app: None,
        }
    }

    pub fn add_disk(&mut self, disk: DiskImage) {
        self.disks.push(disk);
    }

    pub fn set_app(&mut self, app: Application) {
        self.app = Some(app);
    }

    /// The host's own file manifest, before the workload's files are
    /// merged over it.
    pub fn base_files(&self) -> Result<FileMap, SimError> {
        let mut files = FileMap::new();
        for extra in &self.extra_files {
            files.insert(extra.name.clone(), read_asset(&extra.path)?);
        }
        Ok(files)
    }

    /// The complete injected manifest for this host.
    pub fn config_files(&self) -> Result<FileMap, SimError> {
        let base = self.base_files()?;
        match &self.app {
            Some(app) => app.config_files(&base),
            None => Ok(base),
        }
    }

    /// The ordered boot-to-poweroff command script for this host.
    ///
    /// Mounts first, then the workload's prepare phase, then drivers,
    /// then interface configuration, then the application itself. The
    /// script always ends by powering the machine off so the simulator
    /// process exits.
    #[must_use]
    pub fn command_script(&self) -> Vec<String> {
        let mut cmds = vec![
            "set -x".to_string(),
            "mount -t proc proc /proc".to_string(),
            "mount -t sysfs sysfs /sys".to_string(),
        ];

        if let Some(app) = &self.app {
            cmds.extend(app.workload.prepare_cmds());
        }

        for driver in &self.drivers {
            if driver.ends_with(".ko") {
                cmds.push(format!("insmod /tmp/guest/{driver}"));
            } else {
                cmds.push(format!("modprobe {driver}"));
            }
        }

        if let Some(ip) = &self.ip {
            cmds.push("ip link set dev eth0 up".to_string());
            cmds.push(format!("ip addr add {ip}/{} dev eth0", self.prefix));
        }

        if let Some(app) = &self.app {
            cmds.extend(app.workload.run_cmds());
        }

        cmds.push("poweroff -f".to_string());
        cmds
    }
}
