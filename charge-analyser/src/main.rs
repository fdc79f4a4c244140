mod loader;
mod output;
mod parameters;
mod processing;
mod pulse_analysis;

use anyhow::{Context, Result};
use clap::Parser;
use loader::load_persisted_batch;
use output::{ChargeReport, save_charges};
use parameters::AnalysisParameters;
use scope_charge_common::{ChannelName, RunNumber, init_tracer};
use std::path::PathBuf;
use tracing::{info, info_span, level_filters::LevelFilter};

// cargo run --bin charge-analyser -- run12.h5 run13.h5 --output run12_charge.json --run-number 12 --margins sodium-source

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Acquisition files (HDF5) to analyse. Charges of same-named channels are combined.
    #[clap(required = true)]
    filenames: Vec<PathBuf>,

    /// Path of the JSON charge report.
    #[clap(short, long)]
    output: PathBuf,

    /// If set, a CSV file of charges is written here for each channel.
    #[clap(long)]
    charge_dir: Option<PathBuf>,

    /// Identifier of the acquisition run, recorded in the report and output file names.
    #[clap(short, long, env)]
    run_number: Option<RunNumber>,

    /// Only analyse these channels, e.g. `--channel channel1 --channel channel2`.
    #[clap(long = "channel")]
    channels: Vec<ChannelName>,

    #[command(flatten)]
    analysis: AnalysisParameters,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let tracer = init_tracer!(LevelFilter::INFO)?;
    info!("Starting {}", tracer.service_name());

    let settings = args.analysis.settings()?;
    let _run = info_span!("run", run_number = ?args.run_number).entered();
    info!("Settings: {settings:?}");

    let mut report = ChargeReport::new(args.run_number, args.analysis.margins, settings);
    for path in &args.filenames {
        let persisted = load_persisted_batch(path, &args.channels)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        let analyses = processing::process(&persisted, &settings)
            .with_context(|| format!("Failed to analyse {}", path.display()))?;
        report.record(path, analyses);
    }
    report.finalise().context("Failed to bin charges")?;

    report
        .write_json(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!("Report written to {}", args.output.display());

    if let Some(dir) = &args.charge_dir {
        save_charges(&report, dir)
            .with_context(|| format!("Failed to write charges to {}", dir.display()))?;
    }
    Ok(())
}
