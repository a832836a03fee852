// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Front-end for running check definitions against run output.
//!
//! Exits 0 when every check passes and 1 on the first failure, printing
//! a diagnostic that names the fixture being inspected.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use cosim_check::checks::CheckConfig;
use cosim_check::run_checks;

/// Command-line arguments.
#[derive(Parser)]
#[command(about = "Run correctness/performance checks over simulation result documents")]
struct Cli {
    /// Check definition file.
    #[arg(long, default_value = "checks.yaml")]
    checks: String,

    /// Directory holding the result documents.
    #[arg(long, default_value = "out")]
    outdir: String,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Cli::parse();

    let cfg = match CheckConfig::from_file(Path::new(&args.checks)) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("FAILED: {e}");
            return ExitCode::from(1);
        }
    };

    println!("TEST {}", cfg.test);
    match run_checks(&cfg, Path::new(&args.outdir)) {
        Ok(()) => {
            println!("SUCCESS {}", cfg.test);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("FAILED {}: {e}", cfg.test);
            ExitCode::from(1)
        }
    }
}
