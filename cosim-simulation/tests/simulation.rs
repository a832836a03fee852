// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use cosim_simulation::accel_sim::{AccelBackend, AccelSim};
use cosim_simulation::host_sim::HostVariant;
use cosim_simulation::net_sim::{NetBackend, NetSim};
use cosim_simulation::nic_sim::{NicSim, NicVariant};
use cosim_simulation::{SimRef, Simulation};
use cosim_system::accel::AccelDev;
use cosim_system::app::{Application, NetClient, Workload};
use cosim_system::host::Host;
use cosim_system::nic::Nic;
use cosim_system::switch::Switch;
use cosim_system::types::Time;
use cosim_system::{PciePort, System};

fn small_setup() -> (System, Simulation) {
    let mut system = System::new();
    let host = system.add_host(Host::new("client")).unwrap();
    let nic = system.add_nic(Nic::new("client-nic")).unwrap();
    system.attach_pcie(host, PciePort::Nic(nic)).unwrap();
    let accel = system.add_accel(AccelDev::new("accel0", 1000, 64)).unwrap();
    system.attach_pcie(host, PciePort::Accel(accel)).unwrap();
    let switch = system.add_switch(Switch::new("switch0")).unwrap();
    system.connect_nic(nic, switch).unwrap();

    let mut app = Application::new(Workload::NetClient(NetClient::new("10.0.0.2")));
    app.wait = true;
    system.host_mut(host).set_app(app);

    let mut simulation = Simulation::new("small");
    let mut net = NetSim::new(NetBackend::Switch);
    net.add_switch(switch);
    simulation.add_net_sim(net);
    simulation.add_nic_sim(NicSim::new(nic, NicVariant::Bm));
    simulation.add_accel_sim(AccelSim::new(accel, AccelBackend::Behavioral));
    simulation.bind_host(&system, host, HostVariant::Timed);
    (system, simulation)
}

#[test]
fn start_order_is_nets_then_devices_then_hosts() {
    let (_, simulation) = small_setup();
    assert_eq!(
        simulation.all_sims(),
        vec![
            SimRef::Net(0),
            SimRef::Nic(0),
            SimRef::Accel(0),
            SimRef::Host(0)
        ]
    );
}

#[test]
fn full_names_match_the_result_document_keys() {
    let (system, simulation) = small_setup();
    assert_eq!(
        simulation.full_name(&system, SimRef::Host(0)),
        "host.client"
    );
    assert_eq!(
        simulation.full_name(&system, SimRef::Nic(0)),
        "nic.client-nic"
    );
    assert_eq!(simulation.full_name(&system, SimRef::Net(0)), "net.0");
    assert_eq!(
        simulation.full_name(&system, SimRef::Accel(0)),
        "dev.client.accel0"
    );
}

#[test]
fn bound_host_inherits_the_wait_flag() {
    let (_, simulation) = small_setup();
    assert!(simulation.host_sims()[0].wait);
    assert_eq!(simulation.num_waiting(), 1);
}

#[test]
fn sync_period_converts_units() {
    let (_, mut simulation) = small_setup();
    simulation.enable_synchronization(1, Time::Microseconds);
    assert_eq!(simulation.sync().unwrap().period_ns, 1000);
}

#[test]
#[should_panic(expected = "No simulator bound for host index")]
fn missing_host_binding() {
    let (_, simulation) = small_setup();
    simulation.find_host_sim(cosim_system::HostId(7)).unwrap();
}
