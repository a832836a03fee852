// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

use cosim_experiment::build_experiments;
use cosim_experiment::types::ExperimentConfig;

fn build(config: &str) {
    let cfg = ExperimentConfig::from_string(config).unwrap();
    build_experiments(&cfg).unwrap();
}

#[test]
#[should_panic(expected = "Unsupported host variant 'gem5'")]
fn unknown_host_variant() {
    build(
        "
name: bad
hosts:
  - variant: gem5
    count: 1
nics: [fast]
workload:
  kind: netperf
",
    );
}

#[test]
#[should_panic(expected = "Unsupported NIC variant 'verilator'")]
fn unknown_nic_variant() {
    build(
        "
name: bad
hosts:
  - variant: timed
    count: 1
nics: [verilator]
workload:
  kind: netperf
",
    );
}

#[test]
#[should_panic(expected = "Cannot mix unsynchronized")]
fn mixed_sync_modes() {
    build(
        "
name: bad
hosts:
  - variant: plain
    count: 1
  - variant: detailed
    count: 1
nics: [fast]
workload:
  kind: netperf
",
    );
}

#[test]
#[should_panic(expected = "defines no hosts")]
fn no_hosts() {
    build(
        "
name: bad
hosts: []
nics: [fast]
workload:
  kind: netperf
",
    );
}

#[test]
#[should_panic(expected = "neither NICs nor a device")]
fn no_nics_and_no_device() {
    build(
        "
name: bad
hosts:
  - variant: timed
    count: 1
workload:
  kind: netperf
",
    );
}

#[test]
#[should_panic(expected = "needs a 'workload' section")]
fn network_experiment_without_workload() {
    build(
        "
name: bad
hosts:
  - variant: timed
    count: 1
nics: [fast]
",
    );
}

#[test]
#[should_panic(expected = "needs a 'link' section")]
fn dumbbell_without_link() {
    build(
        "
name: bad
hosts:
  - variant: timed
    count: 1
nics: [fast]
network: dumbbell
workload:
  kind: netperf
",
    );
}

#[test]
#[should_panic(expected = "requires the switch network")]
fn distributed_dumbbell() {
    build(
        "
name: bad
hosts:
  - variant: timed
    count: 1
nics: [fast]
network: dumbbell
link:
  rate_mbps: 200
  latency_ms: 5
workload:
  kind: netperf
distributed:
  proxy: tcp
",
    );
}

#[test]
#[should_panic(expected = "Unsupported device backend 'fpga'")]
fn unknown_device_backend() {
    build(
        "
name: bad
hosts:
  - variant: detailed
    count: 1
workload:
  kind: netperf
device:
  backend: fpga
  op_latency_ns: 100
  size: 64
  driver: app/driver
",
    );
}

#[test]
#[should_panic(expected = "serde_yaml::from_str failed")]
fn unknown_key_is_rejected() {
    build(
        "
name: bad
hosts:
  - variant: timed
    count: 1
nics: [fast]
wrkload:
  kind: netperf
",
    );
}

#[test]
#[should_panic(expected = "serde_yaml::from_str failed")]
fn unknown_workload_kind() {
    build(
        "
name: bad
hosts:
  - variant: timed
    count: 1
nics: [fast]
workload:
  kind: iperf
",
    );
}
