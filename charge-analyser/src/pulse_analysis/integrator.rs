use super::{IntegrationWindow, Real, WaveformBatch};
use itertools::Itertools;
use ndarray::{ArrayView1, s};
use scope_charge_common::LOAD_IMPEDANCE_OHMS;

/// Volts times nanoseconds over ohms gives nanocoulombs; charges are reported in picocoulombs.
pub(crate) const PICOCOULOMBS_PER_NANOCOULOMB: Real = 1000.0;

/// Trapezoidal integral of `values` sampled at `times`.
fn trapezoid(values: ArrayView1<Real>, times: ArrayView1<Real>) -> Real {
    values
        .iter()
        .zip(times.iter())
        .tuple_windows()
        .map(|((v0, t0), (v1, t1))| (t1 - t0) * (v0 + v1) / 2.0)
        .sum()
}

/// Charge in picocoulombs carried by each waveform of the batch over `window`.
/// Pulses are negative-going, so the sign is flipped to report positive charge.
#[tracing::instrument(skip_all, level = "debug", fields(start = window.start, stop = window.stop))]
pub(crate) fn integrate(batch: &WaveformBatch, window: &IntegrationWindow) -> Vec<Real> {
    let times = batch
        .axis()
        .view()
        .slice_move(s![window.start..window.stop]);
    batch
        .waveforms()
        .map(|waveform| {
            -trapezoid(waveform.slice(s![window.start..window.stop]), times) / LOAD_IMPEDANCE_OHMS
                * PICOCOULOMBS_PER_NANOCOULOMB
        })
        .collect()
}
