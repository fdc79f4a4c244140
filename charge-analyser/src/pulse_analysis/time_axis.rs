use super::{
    Real,
    error::{BatchError, TimeAxisFault},
};
use itertools::Itertools;
use ndarray::ArrayView1;
use scope_charge_common::NANOSECONDS_PER_SECOND;
use serde::Serialize;

/// The three scalars recorded by the digitiser which describe its sample times.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct AcquisitionParameters {
    /// Time of the first sample, in seconds.
    pub(crate) origin: Real,
    /// Time between consecutive samples, in seconds.
    pub(crate) interval: Real,
    pub(crate) points: usize,
}

/// Sample times in nanoseconds, shared by every waveform of a batch.
/// Always non-empty and strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TimeAxis(Vec<Real>);

impl TimeAxis {
    pub(crate) fn from_acquisition(params: &AcquisitionParameters) -> Result<Self, BatchError> {
        if params.points == 0 {
            return Err(TimeAxisFault::NoSamples.into());
        }
        if !(params.interval.is_finite() && params.interval > 0.0) {
            return Err(TimeAxisFault::Interval(params.interval).into());
        }
        Self::from_nanoseconds(
            (0..params.points)
                .map(|i| (params.origin + i as Real * params.interval) * NANOSECONDS_PER_SECOND)
                .collect(),
        )
    }

    pub(crate) fn from_nanoseconds(times: Vec<Real>) -> Result<Self, BatchError> {
        if times.is_empty() {
            return Err(TimeAxisFault::NoSamples.into());
        }
        if let Some(index) = times.iter().position(|t| !t.is_finite()) {
            return Err(TimeAxisFault::NonFinite(index).into());
        }
        if let Some(index) = times.iter().tuple_windows().position(|(a, b)| b <= a) {
            return Err(TimeAxisFault::NotIncreasing(index + 1).into());
        }
        Ok(Self(times))
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn start(&self) -> Real {
        self.0.first().copied().unwrap_or_default()
    }

    pub(crate) fn end(&self) -> Real {
        self.0.last().copied().unwrap_or_default()
    }

    /// Time of the sample at `index`, clamped to the last sample.
    pub(crate) fn time_at(&self, index: usize) -> Real {
        self.0
            .get(index)
            .copied()
            .unwrap_or_else(|| self.end())
    }

    pub(crate) fn view(&self) -> ArrayView1<'_, Real> {
        ArrayView1::from(self.0.as_slice())
    }

    /// Index at which `time` would be inserted to keep the axis sorted,
    /// i.e. the first sample whose time is not less than `time`.
    pub(crate) fn search_sorted(&self, time: Real) -> usize {
        self.0.partition_point(|&t| t < time)
    }

    /// Number of leading samples whose time lies within `duration` of the start.
    pub(crate) fn baseline_samples(&self, duration: Real) -> usize {
        self.search_sorted(self.start() + duration)
    }
}
