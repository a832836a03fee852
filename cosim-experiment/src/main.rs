// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Front-end for building experiments and emitting their run plans.
//!
//! For example, run using:
//!   cargo run --bin cosim-experiment -- --config
//! demos/netperf.yaml --plan-dir plans --workdir /tmp/cosim --repo
//! /srv/cosim

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use cosim_experiment::build_experiments;
use cosim_experiment::types::ExperimentConfig;
use cosim_instantiation::env::Env;

/// Command-line arguments.
#[derive(Parser)]
#[command(about = "Build experiments from a definition file and emit run plans")]
struct Cli {
    /// Experiment definition file.
    #[arg(long, default_value = "experiment.yaml")]
    config: String,

    /// Per-run scratch directory for sockets and generated images.
    #[arg(long, default_value = "/tmp/cosim")]
    workdir: String,

    /// Directory the runner writes result documents into.
    #[arg(long, default_value = "out")]
    outdir: String,

    /// Checkout holding the simulator binaries and prepared images.
    #[arg(long, default_value = ".")]
    repo: String,

    /// Directory the rendered run plans are written into.
    #[arg(long, default_value = "plans")]
    plan_dir: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let cfg = ExperimentConfig::from_file(Path::new(&args.config))?;
    let experiments = build_experiments(&cfg)?;

    let env = Env::new(
        Path::new(&args.workdir),
        Path::new(&args.outdir),
        Path::new(&args.repo),
    );

    fs::create_dir_all(&args.plan_dir)?;
    for experiment in &experiments {
        println!("{experiment}");

        let inst = experiment.instantiate(cfg.distributed.as_ref())?;
        let plan = inst.run_plan(&env)?;

        let plan_path = PathBuf::from(&args.plan_dir).join(format!("{}.plan.json", experiment.name));
        fs::write(&plan_path, serde_json::to_string_pretty(&plan)?)?;
        println!(
            "Wrote plan for {} ({} simulators) to {}",
            experiment.name,
            plan.commands.len(),
            plan_path.display()
        );
    }

    Ok(())
}
