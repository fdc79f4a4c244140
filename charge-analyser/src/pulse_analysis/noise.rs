use super::{Real, WaveformBatch, statistics::interquartile_range};
use ndarray::s;
use tracing::Span;

pub(crate) const DEFAULT_BASELINE_DURATION_NS: Real = 10.0;

/// Estimates the noise amplitude of a batch as the interquartile range of
/// every sample in the baseline window, pooled across waveforms.
/// Samples whose time is less than `baseline_duration` after the start of
/// the axis form the baseline window. If the duration exceeds the axis the
/// whole waveform is used.
#[tracing::instrument(skip_all, level = "debug", fields(baseline_samples, noise_scale))]
pub(crate) fn estimate_noise(batch: &WaveformBatch, baseline_duration: Real) -> Real {
    let baseline_samples = batch.axis().baseline_samples(baseline_duration);
    let noise_scale = interquartile_range(
        batch
            .voltages()
            .slice(s![.., ..baseline_samples])
            .iter()
            .copied(),
    );
    Span::current()
        .record("baseline_samples", baseline_samples)
        .record("noise_scale", noise_scale);
    noise_scale
}
