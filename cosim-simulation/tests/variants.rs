// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use cosim_simulation::host_sim::{HostBackend, HostVariant};
use cosim_simulation::nic_sim::{NicVariant, select_nic};
use cosim_system::HostId;

#[test]
fn every_host_tag_selects_a_backend() {
    for (tag, variant) in [
        ("plain", HostVariant::Plain),
        ("timed", HostVariant::Timed),
        ("detailed", HostVariant::Detailed),
    ] {
        assert_eq!(HostVariant::from_tag(tag).unwrap(), variant);
        assert_eq!(variant.tag(), tag);
    }
}

#[test]
#[should_panic(expected = "Unsupported host variant 'qemu'")]
fn unknown_host_tag() {
    HostVariant::from_tag("qemu").unwrap();
}

#[test]
fn host_variant_backend_mapping() {
    let sim = HostVariant::Plain.build(HostId(0));
    assert_eq!(sim.backend, HostBackend::Emulator { sync: false });
    assert!(!sim.variant.synchronized());

    let sim = HostVariant::Timed.build(HostId(0));
    assert_eq!(sim.backend, HostBackend::Emulator { sync: true });
    assert!(sim.variant.synchronized());

    let sim = HostVariant::Detailed.build(HostId(0));
    assert!(matches!(sim.backend, HostBackend::CycleAccurate { .. }));
    assert!(sim.variant.synchronized());
}

#[test]
fn every_nic_tag_selects_a_backend_and_profile() {
    let (variant, profile) = select_nic("fast").unwrap();
    assert_eq!(variant, NicVariant::Fast);
    assert_eq!(profile.drivers, vec!["fastnic".to_string()]);
    assert_eq!(profile.memory_mb, 512);

    for tag in ["bm", "rtl"] {
        let (_, profile) = select_nic(tag).unwrap();
        // The custom NIC needs its out-of-tree driver and more guest
        // memory.
        assert_eq!(profile.drivers, vec!["refnic.ko".to_string()]);
        assert_eq!(profile.memory_mb, 2048);
    }
}

#[test]
#[should_panic(expected = "Unsupported NIC variant 'i40e'")]
fn unknown_nic_tag() {
    select_nic("i40e").unwrap();
}

#[test]
fn node_profile_raises_memory_only() {
    let (_, profile) = select_nic("bm").unwrap();
    let mut host = cosim_system::host::Host::new("host");
    host.memory_mb = 4096;
    profile.apply_to(&mut host);
    assert_eq!(host.memory_mb, 4096);
    assert_eq!(host.drivers, vec!["refnic.ko".to_string()]);
}
