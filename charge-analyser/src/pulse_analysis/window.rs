use super::{Real, TimeAxis, statistics::median};
use serde::Serialize;
use tracing::warn;

/// How far either side of the typical pulse arrival time to integrate, in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct WindowMargins {
    pub(crate) left: Real,
    pub(crate) right: Real,
}

impl WindowMargins {
    pub(crate) const STANDARD: Self = Self {
        left: 1.0,
        right: 10.0,
    };

    /// Sodium-22 scintillation pulses are much longer than the standard source's.
    pub(crate) const SODIUM_SOURCE: Self = Self {
        left: 10.0,
        right: 100.0,
    };
}

impl Default for WindowMargins {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Range of sample indices over which every waveform of a batch is integrated.
/// The window covers samples `start..stop`, with `start <= stop <= N - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct IntegrationWindow {
    pub(crate) start: usize,
    pub(crate) stop: usize,
}

impl IntegrationWindow {
    pub(crate) fn is_empty(&self) -> bool {
        self.start == self.stop
    }
}

/// Places a window around the median of the pulse times.
#[tracing::instrument(skip_all, level = "debug", fields(pulses = pulse_times.len()), ret)]
pub(crate) fn select_window(
    axis: &TimeAxis,
    pulse_times: &[Real],
    margins: &WindowMargins,
) -> IntegrationWindow {
    let last = axis.len().saturating_sub(1);
    let Some(centre) = median(pulse_times.iter().copied()) else {
        warn!("No pulse times to place the window around");
        return IntegrationWindow { start: 0, stop: 0 };
    };
    let stop = axis.search_sorted(centre + margins.right).min(last);
    let start = axis.search_sorted(centre - margins.left).min(stop);
    IntegrationWindow { start, stop }
}
