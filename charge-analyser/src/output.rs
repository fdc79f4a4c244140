use crate::{
    parameters::MarginPreset,
    processing::ChannelAnalysis,
    pulse_analysis::{AnalysisSettings, HistogramError, IntegrationWindow, Real, freedman_diaconis_edges},
};
use chrono::{DateTime, Utc};
use scope_charge_common::{ChannelName, RunNumber};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufWriter, Error, Write},
    path::Path,
};
use tracing::info;

/// What was found for one channel in one input file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct FileSummary {
    pub(crate) path: String,
    pub(crate) waveforms: usize,
    pub(crate) noise_scale: Real,
    pub(crate) window: IntegrationWindow,
    pub(crate) window_ns: (Real, Real),
    /// Number of waveforms whose pulse times placed the window.
    pub(crate) timing_waveforms: usize,
    /// False if no waveform held a significant pulse.
    pub(crate) pulses_found: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub(crate) struct ChannelReport {
    pub(crate) files: Vec<FileSummary>,
    /// Charge of every waveform in picocoulombs, files in input order.
    pub(crate) charges: Vec<Real>,
    pub(crate) bin_edges: Vec<Real>,
    pub(crate) bin_counts: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChargeReport {
    pub(crate) run_number: Option<RunNumber>,
    pub(crate) analysed_at: DateTime<Utc>,
    pub(crate) margin_preset: String,
    pub(crate) settings: AnalysisSettings,
    pub(crate) channels: BTreeMap<ChannelName, ChannelReport>,
}

impl ChargeReport {
    pub(crate) fn new(
        run_number: Option<RunNumber>,
        margin_preset: MarginPreset,
        settings: AnalysisSettings,
    ) -> Self {
        Self {
            run_number,
            analysed_at: Utc::now(),
            margin_preset: margin_preset.to_string(),
            settings,
            channels: Default::default(),
        }
    }

    /// Appends the charges found in one file to those of the same channels.
    pub(crate) fn record(&mut self, path: &Path, analyses: Vec<ChannelAnalysis>) {
        for ChannelAnalysis {
            channel,
            window_times,
            analysis,
        } in analyses
        {
            let report = self.channels.entry(channel).or_default();
            report.files.push(FileSummary {
                path: path.display().to_string(),
                waveforms: analysis.charges.len(),
                noise_scale: analysis.noise_scale,
                window: analysis.window,
                window_ns: window_times,
                timing_waveforms: analysis.pulses.waveforms.len(),
                pulses_found: analysis.pulses.restricted,
            });
            report.charges.extend(analysis.charges);
        }
    }

    /// Bins the charges of every channel.
    pub(crate) fn finalise(&mut self) -> Result<(), HistogramError> {
        for (channel, report) in &mut self.channels {
            let edges = freedman_diaconis_edges(&report.charges)?;
            report.bin_counts = edges.counts(&report.charges);
            report.bin_edges = edges.as_slice().to_vec();
            info!(
                "{channel}: {} charges in {} bins",
                report.charges.len(),
                edges.num_bins()
            );
        }
        Ok(())
    }

    pub(crate) fn write_json(&self, path: &Path) -> Result<(), Error> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        writer.flush()
    }
}

pub(crate) trait SavablePoint {
    fn write_to_file<W: Write>(&self, writer: &mut W) -> Result<(), Error>;
}

impl SavablePoint for (usize, Real) {
    fn write_to_file<W: Write>(&self, writer: &mut W) -> Result<(), Error> {
        writeln!(writer, "{0},{1}", self.0, self.1)
    }
}

pub(crate) trait SaveToFileFilter<I>
where
    I: Iterator,
    I::Item: SavablePoint,
{
    fn save_to_file(self, path: &Path, header: &str) -> Result<(), Error>;
}

impl<I> SaveToFileFilter<I> for I
where
    I: Iterator,
    I::Item: SavablePoint,
{
    fn save_to_file(self, path: &Path, header: &str) -> Result<(), Error> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "{header}")?;
        for item in self {
            item.write_to_file(&mut writer)?;
        }
        writer.flush()
    }
}

/// Writes one `<channel>_charges.csv` per channel into `dir`.
pub(crate) fn save_charges(report: &ChargeReport, dir: &Path) -> Result<(), Error> {
    std::fs::create_dir_all(dir)?;
    for (channel, channel_report) in &report.channels {
        let file_name = match report.run_number {
            Some(run_number) => format!("run{run_number}_{channel}_charges.csv"),
            None => format!("{channel}_charges.csv"),
        };
        channel_report
            .charges
            .iter()
            .copied()
            .enumerate()
            .save_to_file(&dir.join(file_name), "index,charge_pc")?;
    }
    Ok(())
}
