use crate::{
    loader::PersistedBatch,
    pulse_analysis::{
        AnalysisSettings, BatchAnalysis, BatchError, Real, TimeAxis, WaveformBatch, analyse_batch,
    },
};
use rayon::prelude::*;
use scope_charge_common::ChannelName;
use thiserror::Error;
use tracing::{Span, info, warn};

#[derive(Debug, Error, PartialEq)]
pub(crate) enum ProcessingError {
    #[error("{0}")]
    TimeAxis(BatchError),
    #[error("Channel {channel}: {error}")]
    Channel {
        channel: ChannelName,
        error: BatchError,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct ChannelAnalysis {
    pub(crate) channel: ChannelName,
    /// Times of the first and last samples of the integration window, in nanoseconds.
    pub(crate) window_times: (Real, Real),
    pub(crate) analysis: BatchAnalysis,
}

#[tracing::instrument(skip_all, fields(channel = channel, waveforms, noise_scale, restricted))]
fn find_channel_charges(
    channel: &str,
    batch: &WaveformBatch,
    settings: &AnalysisSettings,
) -> ChannelAnalysis {
    let analysis = analyse_batch(batch, settings);
    Span::current()
        .record("waveforms", batch.len())
        .record("noise_scale", analysis.noise_scale)
        .record("restricted", analysis.pulses.restricted);
    if !analysis.pulses.restricted {
        warn!("No significant pulses found, timing uses every waveform");
    }
    let window_times = (
        batch.axis().time_at(analysis.window.start),
        batch.axis().time_at(analysis.window.stop),
    );
    info!(
        "Window {}..{} ({} ns to {} ns)",
        analysis.window.start, analysis.window.stop, window_times.0, window_times.1
    );
    ChannelAnalysis {
        channel: channel.to_owned(),
        window_times,
        analysis,
    }
}

/// Analyses every channel of a persisted batch. Channels are independent so
/// are processed in parallel.
#[tracing::instrument(skip_all, fields(path = %persisted.path.display()))]
pub(crate) fn process(
    persisted: &PersistedBatch,
    settings: &AnalysisSettings,
) -> Result<Vec<ChannelAnalysis>, ProcessingError> {
    let axis =
        TimeAxis::from_acquisition(&persisted.acquisition).map_err(ProcessingError::TimeAxis)?;

    let parent = Span::current();
    persisted
        .channels
        .par_iter()
        .map(|(channel, voltages)| {
            parent.in_scope(|| -> Result<ChannelAnalysis, ProcessingError> {
                let batch = WaveformBatch::new(&axis, voltages.view()).map_err(|error| {
                    ProcessingError::Channel {
                        channel: channel.clone(),
                        error,
                    }
                })?;
                Ok(find_channel_charges(channel, &batch, settings))
            })
        })
        .collect()
}
