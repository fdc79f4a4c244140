use super::Real;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub(crate) enum TimeAxisFault {
    #[error("no samples")]
    NoSamples,
    #[error("sample interval {0} is not positive and finite")]
    Interval(Real),
    #[error("time at index {0} is not finite")]
    NonFinite(usize),
    #[error("time at index {0} does not increase")]
    NotIncreasing(usize),
}

/// Failures which make a batch unusable. These are reported to the caller
/// rather than being absorbed by the pipeline.
#[derive(Debug, Error, PartialEq)]
pub(crate) enum BatchError {
    #[error("Batch contains no waveforms")]
    EmptyBatch,
    #[error("Waveforms have {found} samples but the time axis has {expected}")]
    SampleCountMismatch { expected: usize, found: usize },
    #[error("Invalid time axis: {0}")]
    InvalidTimeAxis(#[from] TimeAxisFault),
}

#[derive(Debug, Error, PartialEq)]
pub(crate) enum HistogramError {
    #[error("Cannot bin an empty sample")]
    EmptySample,
    #[error("Value at index {index} is not finite ({value})")]
    NonFiniteValue { index: usize, value: Real },
}
