use anyhow::Context;
use clap::Parser;
use http_bridge::bridge::{default_bind_address, HttpBridge};
use log::{info, warn};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod http_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Driver for the simulated hazard sensor")]
struct Args {
    /// Run the patrol workflow to completion and print a summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value_t = 2)]
    vehicles: usize,
    #[arg(long, default_value_t = 40)]
    hazards: usize,
    /// Simulated seconds
    #[arg(long, default_value_t = 300.0)]
    duration: f64,
    /// Fix the field layout and draw stream
    #[arg(long)]
    seed: Option<u64>,
    /// Append the final status as JSON to this file after an offline run
    #[arg(long)]
    report: Option<PathBuf>,
    /// Keep the HTTP bridge alive for incoming events
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long, default_value_t = default_bind_address())]
    bind: SocketAddr,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.vehicles, args.hazards, args.duration, args.seed)
    };

    let runner = Runner::new(workflow_config);
    let mut core = runner.build_core();
    let mut offline_events = Vec::new();

    if args.offline {
        let result = runner.run(&mut core)?;

        println!(
            "Offline run -> detections {}, classifications {}, acks {}, events {}",
            result.detection_count,
            result.classification_count,
            result.config_acks,
            result.events.len()
        );
        for (warning, count) in &result.status.run_warnings {
            warn!("{} (x{})", warning, count);
        }

        if let Some(report_path) = &args.report {
            if let Some(parent) = report_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let report = result.status.to_json().context("encoding status report")?;
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(report_path)
                .with_context(|| format!("opening report {}", report_path.display()))?;
            writeln!(file, "{}", report)?;
            info!("status report appended to {}", report_path.display());
        }
        offline_events = result.events;
    }

    if args.serve {
        let now = core.now();
        let bridge = HttpBridge::new(core);
        if !offline_events.is_empty() {
            bridge.publish(now, &offline_events);
        }
        println!("HTTP bridge running on {} (Ctrl+C to stop)...", args.bind);
        let runtime = TokioBuilder::new_multi_thread()
            .enable_all()
            .build()
            .context("creating runtime for the HTTP bridge")?;
        runtime.block_on(async {
            let shutdown = async {
                if let Err(err) = signal::ctrl_c().await {
                    warn!("failed to listen for Ctrl+C: {}", err);
                }
            };
            bridge.serve(args.bind, shutdown).await
        })?;
    }

    Ok(())
}
