//! This module converts a batch of digitised waveforms into one charge per waveform.
//!
//! The stages run strictly in order, each reading the output of the last:
//! ```text
//! let noise_scale = estimate_noise(&batch, settings.baseline_duration);
//! let pulses = detect_pulses(&batch, noise_scale);
//! let window = select_window(batch.axis(), &pulses.times, &settings.margins);
//! let charges = integrate(&batch, &window);
//! let edges = freedman_diaconis_edges(&charges)?;
//! ```

pub(crate) mod batch;
pub(crate) mod detector;
pub(crate) mod error;
pub(crate) mod histogram;
pub(crate) mod integrator;
pub(crate) mod noise;
pub(crate) mod statistics;
pub(crate) mod time_axis;
pub(crate) mod window;

#[cfg(test)]
pub(crate) mod test_utils;

pub(crate) use batch::WaveformBatch;
pub(crate) use detector::{PulseTimes, detect_pulses};
pub(crate) use error::{BatchError, HistogramError};
pub(crate) use histogram::freedman_diaconis_edges;
pub(crate) use integrator::integrate;
pub(crate) use noise::{DEFAULT_BASELINE_DURATION_NS, estimate_noise};
pub(crate) use time_axis::{AcquisitionParameters, TimeAxis};
pub(crate) use window::{IntegrationWindow, WindowMargins, select_window};

pub(crate) use scope_charge_common::Real;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct AnalysisSettings {
    /// Length of the pulse-free start of each waveform, in nanoseconds.
    pub(crate) baseline_duration: Real,
    pub(crate) margins: WindowMargins,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            baseline_duration: DEFAULT_BASELINE_DURATION_NS,
            margins: WindowMargins::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BatchAnalysis {
    pub(crate) noise_scale: Real,
    pub(crate) pulses: PulseTimes,
    pub(crate) window: IntegrationWindow,
    /// Charge of every waveform in the batch, in picocoulombs, in batch order.
    pub(crate) charges: Vec<Real>,
}

pub(crate) fn analyse_batch(batch: &WaveformBatch, settings: &AnalysisSettings) -> BatchAnalysis {
    let noise_scale = estimate_noise(batch, settings.baseline_duration);
    let pulses = detect_pulses(batch, noise_scale);
    let window = select_window(batch.axis(), &pulses.times, &settings.margins);
    if window.is_empty() {
        warn!("Integration window is empty, all charges will be zero");
    }
    let charges = integrate(batch, &window);
    BatchAnalysis {
        noise_scale,
        pulses,
        window,
        charges,
    }
}
