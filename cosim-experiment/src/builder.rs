// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Build experiments from a declarative configuration.

use cosim_simulation::Simulation;
use cosim_simulation::accel_sim::{AccelBackend, AccelSim};
use cosim_simulation::host_sim::{HostVariant, check_host_variants};
use cosim_simulation::net_sim::{
    DumbbellParams, NetBackend, NetSim, Side, TrafficApp, TrafficEndpoint,
};
use cosim_simulation::nic_sim::{NicSim, NodeProfile, select_nic};
use cosim_system::accel::AccelDev;
use cosim_system::app::{
    AccelBench, Application, NetClient, NetServer, PingClient, RawCommands, Sleep, Workload,
};
use cosim_system::host::{DiskImage, Host};
use cosim_system::nic::Nic;
use cosim_system::switch::Switch;
use cosim_system::types::{SimError, Time};
use cosim_system::{HostId, NicId, PciePort, System, sim_error};
use log::debug;

use crate::Experiment;
use crate::topo::{add_endpoint_left, add_endpoint_right};
use crate::types::{DeviceSection, ExperimentConfig, NetworkKind, WorkloadSection};

/// Build every experiment a configuration describes: one per NIC variant
/// tag, or a single device experiment.
///
/// Variant tags are resolved and the synchronization-compatibility check
/// runs before any component is constructed, so a bad configuration
/// fails without side effects.
pub fn build_experiments(cfg: &ExperimentConfig) -> Result<Vec<Experiment>, SimError> {
    let mut variants = Vec::new();
    for group in &cfg.hosts {
        let variant = HostVariant::from_tag(&group.variant)?;
        for _ in 0..group.count {
            variants.push(variant);
        }
    }
    if variants.is_empty() {
        return sim_error!("Experiment '{}' defines no hosts", cfg.name);
    }
    check_host_variants(&variants)?;

    if let Some(device) = &cfg.device {
        return Ok(vec![build_device_experiment(cfg, &variants, device)?]);
    }

    if cfg.nics.is_empty() {
        return sim_error!("Experiment '{}' defines neither NICs nor a device", cfg.name);
    }
    if cfg.network == NetworkKind::Dumbbell && cfg.link.is_none() {
        return sim_error!("Dumbbell network needs a 'link' section");
    }
    if cfg.distributed.is_some() && cfg.network == NetworkKind::Dumbbell {
        return sim_error!("Distributed execution requires the switch network");
    }

    let mut experiments = Vec::new();
    for tag in &cfg.nics {
        let (nic_variant, profile) = select_nic(tag)?;
        let name = if cfg.nics.len() == 1 {
            cfg.name.clone()
        } else {
            format!("{}-{tag}", cfg.name)
        };
        debug!("building experiment {name}");
        experiments.push(build_network_experiment(
            cfg,
            &variants,
            &name,
            nic_variant,
            &profile,
        )?);
    }
    Ok(experiments)
}

/// Create a host with its NIC, attached and addressed.
///
/// The counterpart of the basic-hosts helper every network experiment
/// uses: disk images, the NIC node profile and a sequential IP.
fn create_basic_host(
    system: &mut System,
    name: &str,
    disk: &str,
    profile: &NodeProfile,
    memory_bytes: Option<u64>,
    ip_octet: usize,
) -> Result<(HostId, NicId), SimError> {
    let ip = format!("192.168.64.{ip_octet}");

    let mut host = Host::new(name);
    host.ip = Some(ip.clone());
    if let Some(memory_bytes) = memory_bytes {
        host.memory_mb = memory_bytes / (1024 * 1024);
    }
    host.add_disk(DiskImage::Distro(disk.to_string()));
    host.add_disk(DiskImage::LinuxConfig);
    profile.apply_to(&mut host);
    let host_id = system.add_host(host)?;

    let mut nic = Nic::new(&format!("{name}-nic"));
    nic.ip = Some(ip);
    let nic_id = system.add_nic(nic)?;
    system.attach_pcie(host_id, PciePort::Nic(nic_id))?;

    Ok((host_id, nic_id))
}

fn server_workload(section: &WorkloadSection) -> Workload {
    match section {
        WorkloadSection::Netperf { .. } => Workload::NetServer(NetServer {}),
        WorkloadSection::Ping { .. } => Workload::Sleep(Sleep { seconds: None }),
        WorkloadSection::Raw { server_cmds, .. } => Workload::RawCommands(RawCommands {
            cmds: server_cmds.clone(),
        }),
    }
}

fn client_workload(section: &WorkloadSection, server_ip: &str) -> Workload {
    match section {
        WorkloadSection::Netperf { duration_s } => Workload::NetClient(NetClient {
            server_ip: server_ip.to_string(),
            duration_s: *duration_s,
        }),
        WorkloadSection::Ping { count } => Workload::PingClient(PingClient {
            target_ip: server_ip.to_string(),
            count: *count,
        }),
        WorkloadSection::Raw { client_cmds, .. } => Workload::RawCommands(RawCommands {
            cmds: client_cmds.clone(),
        }),
    }
}

fn build_network_experiment(
    cfg: &ExperimentConfig,
    variants: &[HostVariant],
    name: &str,
    nic_variant: cosim_simulation::nic_sim::NicVariant,
    profile: &NodeProfile,
) -> Result<Experiment, SimError> {
    let workload = match &cfg.workload {
        Some(workload) => workload,
        None => return sim_error!("Experiment '{}' needs a 'workload' section", cfg.name),
    };

    let mut system = System::new();
    let disk = cfg.disk_image.as_deref().unwrap_or("base");
    let unsynchronized = !cfg.synchronized;
    let total_hosts = variants.len() * 2;

    // Background traffic endpoints take the low addresses, then servers,
    // then clients.
    let mut next_octet = cfg.traffic_pairs + 1;

    let mut servers = Vec::new();
    for (i, variant) in variants.iter().enumerate() {
        let host_name = format!("ser-{}-{i}", variant.tag());
        let ids = create_basic_host(
            &mut system,
            &host_name,
            disk,
            profile,
            cfg.host_memory,
            next_octet,
        )?;
        next_octet += 1;
        servers.push(ids);
    }

    let mut clients = Vec::new();
    for (i, variant) in variants.iter().enumerate() {
        let host_name = format!("cli-{}-{i}", variant.tag());
        let ids = create_basic_host(
            &mut system,
            &host_name,
            disk,
            profile,
            cfg.host_memory,
            next_octet,
        )?;
        next_octet += 1;
        clients.push(ids);
    }

    for (host_id, _) in &servers {
        let mut app = Application::new(server_workload(workload));
        app.wait = false;
        system.host_mut(*host_id).set_app(app);
    }

    // Each client drives the server of its own pair. The last client
    // waits for the output printed on the other hosts, then cleans up.
    for (i, (host_id, _)) in clients.iter().enumerate() {
        let server_ip = match &system.host(servers[i].0).ip {
            Some(ip) => ip.clone(),
            None => return sim_error!("Server host has no IP"),
        };
        let mut app = Application::new(client_workload(workload, &server_ip));
        let last = i == clients.len() - 1;
        app.wait = last;
        app.is_last = last;
        system.host_mut(*host_id).set_app(app);
    }

    let mut simulation = Simulation::new(name);
    simulation.checkpoint = cfg.checkpoint;
    if cfg.synchronized {
        simulation.enable_synchronization(cfg.sync_period_ns, Time::Nanoseconds);
    }

    let net = match cfg.network {
        NetworkKind::Switch => {
            let switch_id = system.add_switch(Switch::new("switch0"))?;
            for (_, nic_id) in servers.iter().chain(clients.iter()) {
                system.connect_nic(*nic_id, switch_id)?;
            }
            let mut net = NetSim::new(NetBackend::Switch);
            net.add_switch(switch_id);
            net
        }
        NetworkKind::Dumbbell => {
            let link = match cfg.link.as_ref() {
                Some(link) => link,
                None => return sim_error!("Dumbbell network needs a 'link' section"),
            };
            let params = DumbbellParams::for_link(link.rate_mbps, link.latency_ms);
            let mut net = NetSim::new(NetBackend::Dumbbell(params));
            net.opts
                .push(("snd-buf-size".to_string(), "524288".to_string()));
            net.opts
                .push(("rcv-buf-size".to_string(), "524288".to_string()));

            for (i, (_, nic_id)) in servers.iter().enumerate() {
                add_endpoint_left(&mut net, &format!("br-ser-{}", i + 1), *nic_id, unsynchronized);
            }
            for (i, (_, nic_id)) in clients.iter().enumerate() {
                add_endpoint_right(
                    &mut net,
                    &format!("br-cli-{}", i + 1),
                    *nic_id,
                    unsynchronized,
                );
            }

            let stop_s = workload.traffic_stop_s();
            for i in 1..=cfg.traffic_pairs {
                net.add_traffic(TrafficEndpoint {
                    name: format!("sink-{i}"),
                    ip: format!("192.168.64.{i}/24"),
                    app: TrafficApp::Sink {
                        local: "0.0.0.0:5000".to_string(),
                        stop_s,
                    },
                    side: Side::Left,
                });
                net.add_traffic(TrafficEndpoint {
                    name: format!("send-{i}"),
                    ip: format!("192.168.64.{}/24", i + cfg.traffic_pairs + total_hosts),
                    app: TrafficApp::BulkSend {
                        remote: format!("192.168.64.{i}:5000"),
                        stop_s,
                    },
                    side: Side::Right,
                });
            }
            net
        }
    };
    simulation.add_net_sim(net);

    for (i, variant) in variants.iter().enumerate() {
        simulation.bind_host(&system, servers[i].0, *variant);
    }
    for (i, variant) in variants.iter().enumerate() {
        simulation.bind_host(&system, clients[i].0, *variant);
    }
    for (_, nic_id) in servers.iter().chain(clients.iter()) {
        simulation.add_nic_sim(NicSim::new(*nic_id, nic_variant));
    }

    Ok(Experiment {
        name: name.to_string(),
        system,
        simulation,
        servers: servers.iter().map(|(h, _)| *h).collect(),
        clients: clients.iter().map(|(h, _)| *h).collect(),
    })
}

/// Map a device backend tag to its backend configuration.
pub fn select_accel(tag: &str) -> Result<AccelBackend, SimError> {
    match tag {
        "behavioral" => Ok(AccelBackend::Behavioral),
        "rtl" => Ok(AccelBackend::Rtl { clock_freq_mhz: 250 }),
        _ => sim_error!("Unsupported device backend '{tag}'"),
    }
}

fn build_device_experiment(
    cfg: &ExperimentConfig,
    variants: &[HostVariant],
    device: &DeviceSection,
) -> Result<Experiment, SimError> {
    let backend = select_accel(&device.backend)?;

    let mut system = System::new();
    let disk = cfg.disk_image.as_deref().unwrap_or("base");

    let mut hosts = Vec::new();
    for (i, variant) in variants.iter().enumerate() {
        let host_name = if variants.len() == 1 {
            "host".to_string()
        } else {
            format!("host-{i}")
        };
        let mut host = Host::new(&host_name);
        if let Some(memory_bytes) = cfg.host_memory {
            host.memory_mb = memory_bytes / (1024 * 1024);
        }
        host.add_disk(DiskImage::Distro(disk.to_string()));
        host.add_disk(DiskImage::LinuxConfig);

        let mut app = Application::new(Workload::AccelBench(AccelBench {
            driver: device.driver.clone(),
            size: Some(device.size),
            iterations: device.iterations,
        }));
        app.wait = true;
        app.is_last = i == variants.len() - 1;
        host.set_app(app);
        let host_id = system.add_host(host)?;

        let accel_name = if variants.len() == 1 {
            "accel".to_string()
        } else {
            format!("accel-{i}")
        };
        let accel_id = system.add_accel(AccelDev::new(
            &accel_name,
            device.op_latency_ns,
            device.size,
        ))?;
        system.attach_pcie(host_id, PciePort::Accel(accel_id))?;

        hosts.push((host_id, accel_id, *variant));
    }

    let mut simulation = Simulation::new(&cfg.name);
    simulation.checkpoint = cfg.checkpoint;
    if cfg.synchronized {
        simulation.enable_synchronization(cfg.sync_period_ns, Time::Nanoseconds);
    }
    for (host_id, accel_id, variant) in &hosts {
        simulation.bind_host(&system, *host_id, *variant);
        let mut accel_sim = AccelSim::new(*accel_id, backend);
        accel_sim.waveform = device.waveform;
        simulation.add_accel_sim(accel_sim);
    }

    Ok(Experiment {
        name: cfg.name.clone(),
        system,
        simulation,
        servers: Vec::new(),
        clients: hosts.iter().map(|(h, _, _)| *h).collect(),
    })
}
