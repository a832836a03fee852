// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use std::path::Path;

use cosim_instantiation::Instantiation;
use cosim_instantiation::env::Env;
use cosim_simulation::Simulation;
use cosim_simulation::accel_sim::{AccelBackend, AccelSim};
use cosim_simulation::host_sim::HostVariant;
use cosim_simulation::net_sim::{NetBackend, NetSim};
use cosim_simulation::nic_sim::{NicSim, NicVariant};
use cosim_system::accel::AccelDev;
use cosim_system::app::{Application, NetClient, Workload};
use cosim_system::host::{DiskImage, Host};
use cosim_system::nic::Nic;
use cosim_system::switch::Switch;
use cosim_system::types::Time;
use cosim_system::{PciePort, System};

fn test_env() -> Env {
    Env::new(
        Path::new("/tmp/run"),
        Path::new("out"),
        Path::new("/srv/cosim"),
    )
}

#[test]
fn env_path_conventions() {
    let env = test_env();
    assert_eq!(
        env.dev_pci_path("client-nic"),
        Path::new("/tmp/run/dev.pci.client-nic")
    );
    assert_eq!(
        env.dev_shm_path("client-nic"),
        Path::new("/tmp/run/shm/dev.shm.client-nic")
    );
    assert_eq!(
        env.nic_eth_path("client-nic"),
        Path::new("/tmp/run/nic.eth.client-nic")
    );
    assert_eq!(env.output_path("demo", 1), Path::new("out/demo-1.json"));
    assert_eq!(env.sim_bin("net-switch"), Path::new("/srv/cosim/sims/net-switch"));
}

fn wired_setup(sync: bool) -> (System, Simulation) {
    let mut system = System::new();
    let host = system.add_host(Host::new("client")).unwrap();
    system.host_mut(host).add_disk(DiskImage::Distro("base".to_string()));
    let nic = system.add_nic(Nic::new("client-nic")).unwrap();
    system.attach_pcie(host, PciePort::Nic(nic)).unwrap();
    let accel = system.add_accel(AccelDev::new("accel0", 10000, 128)).unwrap();
    system.attach_pcie(host, PciePort::Accel(accel)).unwrap();
    let switch = system.add_switch(Switch::new("switch0")).unwrap();
    system.connect_nic(nic, switch).unwrap();

    let mut app = Application::new(Workload::NetClient(NetClient::new("10.0.0.2")));
    app.wait = true;
    system.host_mut(host).set_app(app);

    let mut simulation = Simulation::new("wired");
    let mut net = NetSim::new(NetBackend::Switch);
    net.add_switch(switch);
    simulation.add_net_sim(net);
    simulation.add_nic_sim(NicSim::new(nic, NicVariant::Rtl));
    simulation.add_accel_sim(AccelSim::new(accel, AccelBackend::Behavioral));
    let variant = if sync {
        HostVariant::Timed
    } else {
        HostVariant::Plain
    };
    simulation.bind_host(&system, host, variant);
    if sync {
        simulation.enable_synchronization(500, Time::Nanoseconds);
    }
    (system, simulation)
}

#[test]
fn plan_orders_networks_before_devices_before_hosts() {
    let (system, simulation) = wired_setup(true);
    let inst = Instantiation::simple(system, simulation);
    let plan = inst.run_plan(&test_env()).unwrap();

    let names: Vec<&str> = plan.commands.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["net.0", "nic.client-nic", "dev.client.accel0", "host.client"]
    );
    assert_eq!(plan.output, "out/wired-1.json");
}

#[test]
fn switch_command_lists_nic_sockets() {
    let (system, simulation) = wired_setup(true);
    let inst = Instantiation::simple(system, simulation);
    let plan = inst.run_plan(&test_env()).unwrap();

    let net = &plan.commands[0];
    assert!(net.cmd.starts_with("/srv/cosim/sims/net-switch"));
    assert!(net.cmd.contains("-s /tmp/run/nic.eth.client-nic"));
    assert!(!net.cmd.contains(" -u"));
}

#[test]
fn unsynchronized_switch_gets_the_free_running_flag() {
    let (system, simulation) = wired_setup(false);
    let inst = Instantiation::simple(system, simulation);
    let plan = inst.run_plan(&test_env()).unwrap();
    assert!(plan.commands[0].cmd.contains(" -u"));
}

#[test]
fn rtl_nic_command_carries_the_clock() {
    let (system, simulation) = wired_setup(true);
    let inst = Instantiation::simple(system, simulation);
    let plan = inst.run_plan(&test_env()).unwrap();

    let nic = &plan.commands[1];
    assert!(nic.cmd.starts_with("/srv/cosim/sims/nic-rtl"));
    assert!(nic.cmd.contains("/tmp/run/dev.pci.client-nic"));
    assert!(nic.cmd.contains("/tmp/run/shm/dev.shm.client-nic"));
    assert!(nic.cmd.contains(" 250 "));
}

#[test]
fn accel_command_carries_model_parameters() {
    let (system, simulation) = wired_setup(true);
    let inst = Instantiation::simple(system, simulation);
    let plan = inst.run_plan(&test_env()).unwrap();

    let accel = &plan.commands[2];
    assert!(accel.cmd.starts_with("/srv/cosim/sims/accel-bm"));
    assert!(accel.cmd.ends_with("10000 128"));
}

#[test]
fn emulator_host_waits_and_mentions_its_devices() {
    let (system, simulation) = wired_setup(true);
    let inst = Instantiation::simple(system, simulation);
    let plan = inst.run_plan(&test_env()).unwrap();

    let host = &plan.commands[3];
    assert!(host.wait);
    assert!(host.cmd.starts_with("/srv/cosim/sims/cosim-emu"));
    assert!(host.cmd.contains("-icount"));
    assert!(host.cmd.contains("socket=/tmp/run/dev.pci.client-nic"));
    assert!(host.cmd.contains("socket=/tmp/run/dev.pci.accel0"));
}

#[test]
fn plan_is_deterministic() {
    let (system, simulation) = wired_setup(true);
    let inst = Instantiation::simple(system, simulation);
    let env = test_env();
    assert_eq!(inst.run_plan(&env).unwrap(), inst.run_plan(&env).unwrap());
}

#[test]
#[should_panic(expected = "has no disk image")]
fn host_without_disk_fails_rendering() {
    let (mut system, simulation) = wired_setup(true);
    let host = system.host_by_name("client").unwrap();
    system.host_mut(host).disks.clear();
    let inst = Instantiation::simple(system, simulation);
    inst.run_plan(&test_env()).unwrap();
}
