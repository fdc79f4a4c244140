//! Synthetic waveforms for the unit tests.
use super::{Real, TimeAxis};
use ndarray::Array2;
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};

/// Axis of `len` samples spaced one nanosecond apart, starting at zero.
pub(crate) fn unit_axis(len: usize) -> TimeAxis {
    TimeAxis::from_nanoseconds((0..len).map(|i| i as Real).collect()).expect("axis should be valid")
}

/// A pulse which drops to `depth` at sample `onset` and recovers linearly
/// to zero over `decay` samples.
pub(crate) fn sawtooth_pulse(len: usize, onset: usize, depth: Real, decay: usize) -> Vec<Real> {
    (0..len)
        .map(|i| {
            if i < onset || i >= onset + decay {
                0.0
            } else {
                depth * (1.0 - (i - onset) as Real / decay as Real)
            }
        })
        .collect()
}

pub(crate) fn stack(waveforms: &[Vec<Real>]) -> Array2<Real> {
    let cols = waveforms.first().map(Vec::len).unwrap_or_default();
    Array2::from_shape_vec(
        (waveforms.len(), cols),
        waveforms.iter().flatten().copied().collect(),
    )
    .expect("waveforms should have equal length")
}

/// Adds gaussian noise of standard deviation `sigma` to every sample.
pub(crate) fn add_noise(voltages: &mut Array2<Real>, sigma: Real, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, sigma).expect("sigma should be valid");
    voltages.mapv_inplace(|v| v + normal.sample(&mut rng));
}
