// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use std::path::Path;

use cosim_experiment::build_experiments;
use cosim_experiment::topo::{add_endpoint_left, add_endpoint_right};
use cosim_experiment::types::ExperimentConfig;
use cosim_instantiation::env::Env;
use cosim_simulation::net_sim::{DumbbellParams, NetBackend, NetSim};
use cosim_system::NicId;

static DISTRIBUTED: &str = "
name: spread
hosts:
  - variant: timed
    count: 2
nics: [fast]
workload:
  kind: netperf
distributed:
  proxy: tcp
";

#[test]
fn distributed_layout_splits_into_three_fragments() {
    let cfg = ExperimentConfig::from_string(DISTRIBUTED).unwrap();
    let experiments = build_experiments(&cfg).unwrap();
    let inst = experiments[0].instantiate(cfg.distributed.as_ref()).unwrap();

    let names: Vec<&str> = inst.fragments().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["network", "left", "right"]);
    // One proxy pair per host's NIC channel.
    assert_eq!(inst.proxies().len(), 4);

    let env = Env::new(Path::new("/tmp/run"), Path::new("out"), Path::new("/srv"));
    let plan = inst.run_plan(&env).unwrap();
    assert_eq!(plan.commands.len(), 9);
    assert_eq!(plan.commands[0].fragment, "network");
    let client = plan
        .commands
        .iter()
        .find(|c| c.name == "host.cli-timed-1")
        .unwrap();
    assert_eq!(client.fragment, "right");
    assert!(client.wait);
}

#[test]
fn single_fragment_plan_for_simple_runs() {
    let cfg = ExperimentConfig::from_string(
        "
name: pair
hosts:
  - variant: timed
    count: 1
nics: [fast]
workload:
  kind: ping
",
    )
    .unwrap();
    let experiments = build_experiments(&cfg).unwrap();
    let inst = experiments[0].instantiate(None).unwrap();
    assert_eq!(inst.fragments().len(), 1);

    let env = Env::new(Path::new("/tmp/run"), Path::new("out"), Path::new("/srv"));
    let plan = inst.run_plan(&env).unwrap();
    assert!(plan.commands.iter().all(|c| c.fragment == "all"));
    assert_eq!(plan.output, "out/pair-1.json");
}

#[test]
fn endpoint_helpers_do_not_deduplicate_names() {
    let mut net = NetSim::new(NetBackend::Dumbbell(DumbbellParams::for_link(200, 5)));
    add_endpoint_left(&mut net, "br-ser-1", NicId(0), false);
    add_endpoint_left(&mut net, "br-ser-1", NicId(1), false);
    add_endpoint_right(&mut net, "br-cli-1", NicId(2), true);

    // Two distinct endpoints share the name; nothing is merged.
    assert_eq!(net.bridges.len(), 3);
    assert_eq!(net.bridges[0].name, net.bridges[1].name);
    assert_ne!(net.bridges[0].nic, net.bridges[1].nic);
}

#[test]
fn byte_sizes_parse_in_all_spellings() {
    #[derive(serde::Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "cosim_experiment::types::parse_byte_str")]
        bytes: u64,
    }
    let parse = |s: &str| -> u64 {
        let probe: Probe = serde_yaml::from_str(&format!("bytes: {s}")).unwrap();
        probe.bytes
    };
    assert_eq!(parse("1024"), 1024);
    assert_eq!(parse("0x1000"), 4096);
    assert_eq!(parse("'0x1000_0000'"), 0x1000_0000);
    assert_eq!(parse("2KiB"), 2048);
    assert_eq!(parse("1MB"), 1_000_000);
}

#[test]
fn host_memory_accepts_byte_strings() {
    let cfg = ExperimentConfig::from_string(
        "
name: pair
hosts:
  - variant: timed
    count: 1
nics: [fast]
host_memory: 4GiB
workload:
  kind: netperf
",
    )
    .unwrap();
    assert_eq!(cfg.host_memory, Some(4 * 1024 * 1024 * 1024));

    let experiments = build_experiments(&cfg).unwrap();
    let e = &experiments[0];
    let host = e.system.host_by_name("ser-timed-0").unwrap();
    assert_eq!(e.system.host(host).memory_mb, 4096);
}
