use super::{Real, error::BatchError, time_axis::TimeAxis};
use ndarray::{ArrayView1, ArrayView2, Axis};

/// The waveforms captured on one channel during one run, one row per event,
/// together with the time axis they share.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WaveformBatch<'a> {
    axis: &'a TimeAxis,
    voltages: ArrayView2<'a, Real>,
}

impl<'a> WaveformBatch<'a> {
    pub(crate) fn new(
        axis: &'a TimeAxis,
        voltages: ArrayView2<'a, Real>,
    ) -> Result<Self, BatchError> {
        if voltages.nrows() == 0 {
            return Err(BatchError::EmptyBatch);
        }
        if voltages.ncols() != axis.len() {
            return Err(BatchError::SampleCountMismatch {
                expected: axis.len(),
                found: voltages.ncols(),
            });
        }
        Ok(Self { axis, voltages })
    }

    pub(crate) fn axis(&self) -> &'a TimeAxis {
        self.axis
    }

    pub(crate) fn voltages(&self) -> ArrayView2<'a, Real> {
        self.voltages
    }

    pub(crate) fn len(&self) -> usize {
        self.voltages.nrows()
    }

    pub(crate) fn waveforms(&self) -> impl Iterator<Item = ArrayView1<'_, Real>> + '_ {
        self.voltages.axis_iter(Axis(0))
    }
}
