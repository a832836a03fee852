// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Command-line rendering for the run plan.
//!
//! Every simulator binary has a fixed argument contract with the runner;
//! the functions here format those command lines from the bound system.
//! Rendering is pure string formatting over the object graph and the
//! [`Env`](crate::env::Env) path conventions.

use cosim_simulation::accel_sim::{AccelBackend, AccelSim};
use cosim_simulation::host_sim::{CpuModel, HostBackend, HostSim};
use cosim_simulation::net_sim::{NetBackend, NetSim, Side, SyncMode, TrafficApp};
use cosim_simulation::nic_sim::{NicSim, NicVariant};
use cosim_simulation::{SimRef, Simulation};
use cosim_system::host::DiskImage;
use cosim_system::nic::Nic;
use cosim_system::types::SimError;
use cosim_system::{EthEndpoint, NicId, PciePort, System, sim_error};
use serde::{Deserialize, Serialize};

use crate::env::Env;

/// One launched simulator process within a run plan.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SimCommand {
    /// Full simulator name, also the key its captured output is stored
    /// under in the result document.
    pub name: String,
    pub cmd: String,
    /// The runner waits on this process before declaring the run
    /// complete.
    pub wait: bool,
    /// Fragment this process is launched in.
    pub fragment: String,
}

/// The ordered set of processes the runner launches for one experiment.
///
/// Commands are ordered networks first, then devices, then hosts, so
/// that every socket a process connects to has already been created by
/// its peer.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RunPlan {
    pub experiment: String,
    /// Where the runner writes the result document of run 1.
    pub output: String,
    pub commands: Vec<SimCommand>,
}

fn sync_flag(simulation: &Simulation) -> u64 {
    u64::from(simulation.sync().is_some())
}

fn sync_period_ns(simulation: &Simulation, link_period_ns: u64) -> u64 {
    match simulation.sync() {
        Some(cfg) => cfg.period_ns,
        None => link_period_ns,
    }
}

/// Render the emulator / cycle-accurate command line for a host.
pub fn render_host_cmd(
    system: &System,
    simulation: &Simulation,
    env: &Env,
    sim: &HostSim,
) -> Result<String, SimError> {
    let host = system.host(sim.host);

    let mut disk_args = Vec::new();
    for disk in &host.disks {
        let path = match disk {
            DiskImage::Distro(name) => env.hd_path(name),
            DiskImage::LinuxConfig => env.cfg_image_path(&host.name),
            DiskImage::Raw(path) => path.clone(),
        };
        disk_args.push(path.display().to_string());
    }
    if disk_args.is_empty() {
        return sim_error!("Host {} has no disk image", host.name);
    }

    let mut dev_args = Vec::new();
    for link in system.pcie_links().iter().filter(|l| l.host == sim.host) {
        let dev_name = match link.dev {
            PciePort::Nic(id) => &system.nic(id).name,
            PciePort::Accel(id) => &system.accel(id).name,
        };
        let sock = env.dev_pci_path(dev_name);
        let period = sync_period_ns(simulation, link.sync_period_ns);
        dev_args.push((sock, link.latency_ns, period));
    }

    let cmd = match sim.backend {
        HostBackend::Emulator { sync } => {
            let mut cmd = format!(
                "{} -machine pc -m {} -smp {} -kernel {} \
                 -append \"earlyprintk=ttyS0 console=ttyS0 {}\" -nographic",
                env.sim_bin("cosim-emu").display(),
                host.memory_mb,
                host.cores,
                env.kernel_path().display(),
                host.kcmd_append,
            );
            for disk in &disk_args {
                cmd.push_str(&format!(" -drive file={disk},format=raw"));
            }
            if sync {
                cmd.push_str(" -icount shift=1,sleep=off");
            }
            for (sock, latency, period) in &dev_args {
                cmd.push_str(&format!(
                    " -device cosim-pci,socket={},latency={latency}ns,sync-period={period}ns,sync={}",
                    sock.display(),
                    if sync { "on" } else { "off" },
                ));
            }
            cmd
        }
        HostBackend::CycleAccurate {
            cpu,
            restore_checkpoint,
        } => {
            let cpu_type = match cpu {
                CpuModel::Timing => "TimingCPU",
                CpuModel::Kvm => "KvmCPU",
            };
            let mut cmd = format!(
                "{} --outdir={} --cpu-type={cpu_type} --mem-size={}MB --num-cores={} \
                 --kernel={}",
                env.sim_bin("cosim-cycle").display(),
                env.workdir.join(format!("cycle.{}", host.name)).display(),
                host.memory_mb,
                host.cores,
                env.kernel_path().display(),
            );
            for disk in &disk_args {
                cmd.push_str(&format!(" --disk={disk}"));
            }
            if !host.kcmd_append.is_empty() {
                cmd.push_str(&format!(" --kcmd-append=\"{}\"", host.kcmd_append));
            }
            if simulation.checkpoint || restore_checkpoint {
                cmd.push_str(&format!(
                    " --checkpoint-dir={}",
                    env.checkpoint_path(&host.name).display()
                ));
            }
            for (sock, latency, period) in &dev_args {
                cmd.push_str(&format!(
                    " --cosim-pci={}:{latency}:{period}",
                    sock.display()
                ));
            }
            cmd
        }
    };
    Ok(cmd)
}

fn eth_latency_for_nic(system: &System, nic: NicId) -> u64 {
    match system.nic_link(nic) {
        Some(link) => system.eth_link(link).latency_ns,
        None => cosim_system::DEFAULT_LINK_LATENCY_NS,
    }
}

/// Render the device-simulator command line for a NIC.
pub fn render_nic_cmd(
    system: &System,
    simulation: &Simulation,
    env: &Env,
    idx: usize,
    sim: &NicSim,
) -> Result<String, SimError> {
    let nic = system.nic(sim.nic);
    let link = match system
        .pcie_links()
        .iter()
        .find(|l| l.dev == PciePort::Nic(sim.nic))
    {
        Some(link) => link,
        None => return sim_error!("NIC {} is not attached to any host", nic.name),
    };

    let bin = match sim.variant {
        NicVariant::Fast => "nic-fast",
        NicVariant::Bm => "nic-bm",
        NicVariant::Rtl => "nic-rtl",
    };
    let mut cmd = format!(
        "{} {} {} {} {} {} {} {}",
        env.sim_bin(bin).display(),
        env.dev_pci_path(&nic.name).display(),
        env.nic_eth_path(&nic.name).display(),
        env.dev_shm_path(&nic.name).display(),
        sync_flag(simulation),
        sync_period_ns(simulation, link.sync_period_ns),
        link.latency_ns,
        eth_latency_for_nic(system, sim.nic),
    );
    if sim.variant == NicVariant::Rtl {
        cmd.push_str(&format!(" {}", sim.clock_freq_mhz));
    }
    cmd.push_str(&format!(" {}", Nic::mac_for(idx)));
    Ok(cmd)
}

/// Render the device-simulator command line for an accelerator.
pub fn render_accel_cmd(
    system: &System,
    simulation: &Simulation,
    env: &Env,
    sim: &AccelSim,
) -> Result<String, SimError> {
    let accel = system.accel(sim.accel);
    let link = match system
        .pcie_links()
        .iter()
        .find(|l| l.dev == PciePort::Accel(sim.accel))
    {
        Some(link) => link,
        None => return sim_error!("Accelerator {} is not attached to any host", accel.name),
    };

    let period = sync_period_ns(simulation, link.sync_period_ns);
    let cmd = match sim.backend {
        AccelBackend::Behavioral => format!(
            "{} {} {} {} {} {} {} {}",
            env.sim_bin("accel-bm").display(),
            env.dev_pci_path(&accel.name).display(),
            env.dev_shm_path(&accel.name).display(),
            sync_flag(simulation),
            period,
            link.latency_ns,
            accel.op_latency_ns,
            accel.size,
        ),
        AccelBackend::Rtl { clock_freq_mhz } => {
            let mut cmd = format!(
                "{} {} {} {} {} {} {clock_freq_mhz}",
                env.sim_bin("accel-rtl").display(),
                env.dev_pci_path(&accel.name).display(),
                env.dev_shm_path(&accel.name).display(),
                sync_flag(simulation),
                period,
                link.latency_ns,
            );
            if sim.waveform {
                cmd.push_str(&format!(
                    " {}",
                    env.workdir
                        .join(format!("{}.waveform", accel.name))
                        .display()
                ));
            }
            cmd
        }
    };
    Ok(cmd)
}

/// Render the network-simulator command line.
pub fn render_net_cmd(
    system: &System,
    simulation: &Simulation,
    env: &Env,
    sim: &NetSim,
) -> Result<String, SimError> {
    match &sim.backend {
        NetBackend::Switch => {
            // One listening socket per NIC on a switch this simulator
            // executes, in link order.
            let mut eth_latency_ns = cosim_system::DEFAULT_LINK_LATENCY_NS;
            let mut socks = Vec::new();
            for link in system.eth_links() {
                let (nic, switch) = match (link.a, link.b) {
                    (EthEndpoint::Nic(n), EthEndpoint::Switch(s)) => (n, s),
                    (EthEndpoint::Switch(s), EthEndpoint::Nic(n)) => (n, s),
                    _ => continue,
                };
                if !sim.switches.contains(&switch) {
                    continue;
                }
                eth_latency_ns = link.latency_ns;
                socks.push(env.nic_eth_path(&system.nic(nic).name));
            }

            let period = sync_period_ns(simulation, cosim_system::DEFAULT_SYNC_PERIOD_NS);
            let mut cmd = format!(
                "{} -S {period} -E {eth_latency_ns}",
                env.sim_bin("net-switch").display()
            );
            if simulation.sync().is_none() {
                cmd.push_str(" -u");
            }
            for sock in socks {
                cmd.push_str(&format!(" -s {}", sock.display()));
            }
            Ok(cmd)
        }
        NetBackend::Dumbbell(params) => {
            let mut cmd = format!(
                "{} --topo=dumbbell --data-rate={}Mbps --delay={}ms --queue-size={}B --mtu={}",
                env.sim_bin("net-packet").display(),
                params.data_rate_mbps,
                params.delay_ms,
                params.queue_size_bytes,
                params.mtu,
            );
            for (key, value) in &sim.opts {
                cmd.push_str(&format!(" --{key}={value}"));
            }
            for bridge in &sim.bridges {
                let side = side_tag(bridge.side);
                let sync = match bridge.sync {
                    SyncMode::Synchronized => "sync",
                    SyncMode::Disabled => "unsync",
                };
                cmd.push_str(&format!(
                    " --bridge={side}:{}:{}:{}ns:{sync}",
                    bridge.name,
                    env.nic_eth_path(&system.nic(bridge.nic).name).display(),
                    bridge.eth_latency_ns,
                ));
            }
            for endpoint in &sim.traffic {
                let side = side_tag(endpoint.side);
                let app = match &endpoint.app {
                    TrafficApp::Sink { local, stop_s } => {
                        format!("sink:{local}:{stop_s}s")
                    }
                    TrafficApp::BulkSend { remote, stop_s } => {
                        format!("bulk:{remote}:{stop_s}s")
                    }
                };
                cmd.push_str(&format!(
                    " --host={side}:{}:{}:{app}",
                    endpoint.name, endpoint.ip
                ));
            }
            Ok(cmd)
        }
    }
}

fn side_tag(side: Side) -> &'static str {
    match side {
        Side::Left => "left",
        Side::Right => "right",
    }
}

/// Render the command line for any simulator of the experiment.
pub fn render_command(
    system: &System,
    simulation: &Simulation,
    env: &Env,
    sim: SimRef,
) -> Result<String, SimError> {
    match sim {
        SimRef::Host(idx) => render_host_cmd(system, simulation, env, &simulation.host_sims()[idx]),
        SimRef::Nic(idx) => {
            render_nic_cmd(system, simulation, env, idx, &simulation.nic_sims()[idx])
        }
        SimRef::Net(idx) => render_net_cmd(system, simulation, env, &simulation.net_sims()[idx]),
        SimRef::Accel(idx) => {
            render_accel_cmd(system, simulation, env, &simulation.accel_sims()[idx])
        }
    }
}
