use anyhow::Context;
use clap::Parser;
use generator::gait::build_walk;
use generator::trace::{load_trace, save_trace};
use std::fs;
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Replay driver for the PDR step-detection core")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Replay a recorded JSON trace instead of a synthetic walk
    #[arg(long)]
    trace: Option<PathBuf>,
    /// Steps in the synthetic walk (ignored with --workflow)
    #[arg(long, default_value_t = 20)]
    steps: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Pace the replay by sample timestamps and print live step counts
    #[arg(long, default_value_t = false)]
    live: bool,
    /// Write the run summary as JSON
    #[arg(long)]
    report: Option<PathBuf>,
    /// Save the replayed readings as a JSON trace
    #[arg(long)]
    save_trace: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.steps, args.seed)
    };

    let readings = match args.trace {
        Some(path) => load_trace(path)?,
        None => build_walk(&workflow_config.gait)?,
    };
    if let Some(path) = args.save_trace {
        save_trace(path, &readings)?;
    }

    let runner = Runner::new(workflow_config);
    let sample_count = readings.len();
    let result = if args.live {
        runner.execute_live(readings)?
    } else {
        runner.execute(&readings)?
    };

    let metrics = &result.metrics;
    println!(
        "Replayed {} readings -> steps {}, cycles {}, rejections continuity/periodicity/similarity {}/{}/{}",
        sample_count,
        result.step_count,
        metrics.cycles,
        metrics.continuity_rejections,
        metrics.periodicity_rejections,
        metrics.similarity_rejections
    );

    if let Some(report_path) = args.report {
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let report = serde_json::to_string_pretty(&result).context("serializing run report")?;
        fs::write(&report_path, report)
            .with_context(|| format!("writing report {}", report_path.display()))?;
    }

    Ok(())
}
