use super::{Real, WaveformBatch};
use ndarray::ArrayView1;
use tracing::debug;

/// A waveform contains a pulse if its minimum lies further than this
/// many noise scales below zero.
pub(crate) const PULSE_SIGNIFICANCE: Real = 5.0;

/// Fraction of a waveform's own minimum its leading edge must cross.
pub(crate) const THRESHOLD_FRACTION: Real = 0.4;

/// Arrival times of the pulses of the waveforms used for timing statistics.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PulseTimes {
    /// Arrival time for each waveform listed in `waveforms`, in nanoseconds.
    pub(crate) times: Vec<Real>,
    /// Indices into the batch of the waveforms the times belong to.
    pub(crate) waveforms: Vec<usize>,
    /// False if no waveform contained a significant pulse, in which case
    /// every waveform of the batch was used.
    pub(crate) restricted: bool,
}

fn minimum(waveform: &ArrayView1<Real>) -> Real {
    waveform.iter().copied().fold(Real::INFINITY, Real::min)
}

fn is_pulse(minimum: Real, noise_scale: Real) -> bool {
    minimum < -(PULSE_SIGNIFICANCE * noise_scale)
}

/// Index of the first sample below `THRESHOLD_FRACTION` of the minimum.
/// A waveform which never crosses its threshold yields index zero.
fn threshold_crossing(waveform: &ArrayView1<Real>, minimum: Real) -> usize {
    let threshold = THRESHOLD_FRACTION * minimum;
    waveform
        .iter()
        .position(|&v| v < threshold)
        .unwrap_or_default()
}

#[tracing::instrument(skip_all, level = "debug", fields(waveforms = batch.len()))]
pub(crate) fn detect_pulses(batch: &WaveformBatch, noise_scale: Real) -> PulseTimes {
    let candidates: Vec<_> = batch
        .waveforms()
        .enumerate()
        .map(|(index, waveform)| {
            let minimum = minimum(&waveform);
            (index, waveform, minimum)
        })
        .collect();

    let restricted = candidates
        .iter()
        .any(|(_, _, minimum)| is_pulse(*minimum, noise_scale));
    if !restricted {
        debug!("No waveform exceeds {PULSE_SIGNIFICANCE} x {noise_scale}, using the whole batch");
    }

    let (waveforms, times) = candidates
        .into_iter()
        .filter(|(_, _, minimum)| !restricted || is_pulse(*minimum, noise_scale))
        .map(|(index, waveform, minimum)| {
            let time = batch.axis().time_at(threshold_crossing(&waveform, minimum));
            (index, time)
        })
        .unzip();

    PulseTimes {
        times,
        waveforms,
        restricted,
    }
}
