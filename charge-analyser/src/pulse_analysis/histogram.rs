use super::{Real, error::HistogramError, statistics::interquartile_range};
use serde::Serialize;
use tracing::debug;

/// Upper limit on the number of bins, reached by widening the bins.
pub(crate) const MAX_BINS: usize = 10_000;

/// Width of the single bin used for a sample with no spread.
pub(crate) const CONSTANT_SAMPLE_BIN_WIDTH: Real = 1.0;

/// Smallest bin width, in units of the float spacing at the sample's magnitude.
/// Keeps neighbouring edges distinct after rounding.
const MIN_WIDTH_IN_EPSILONS: Real = 8.0;

fn min_bin_width(magnitude: Real) -> Real {
    MIN_WIDTH_IN_EPSILONS * Real::EPSILON * magnitude
}

/// Strictly increasing bin boundaries, at least two of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub(crate) struct BinEdges(Vec<Real>);

impl BinEdges {
    pub(crate) fn as_slice(&self) -> &[Real] {
        &self.0
    }

    pub(crate) fn num_bins(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Number of values falling in each bin. Bins are half-open except the last,
    /// which includes its right edge. Values outside the edges are not counted.
    pub(crate) fn counts(&self, values: &[Real]) -> Vec<usize> {
        let mut counts = vec![0; self.num_bins()];
        let (Some(&first), Some(&last)) = (self.0.first(), self.0.last()) else {
            return counts;
        };
        for &value in values {
            if !(first..=last).contains(&value) {
                continue;
            }
            let bin = self
                .0
                .partition_point(|&edge| edge <= value)
                .saturating_sub(1)
                .min(self.num_bins().saturating_sub(1));
            if let Some(count) = counts.get_mut(bin) {
                *count += 1;
            }
        }
        counts
    }
}

fn bounds(values: &[Real]) -> (Real, Real) {
    values
        .iter()
        .fold((Real::INFINITY, Real::NEG_INFINITY), |(min, max), &v| {
            (min.min(v), max.max(v))
        })
}

/// Derives bin edges using the Freedman-Diaconis rule, `2 IQR / n^(1/3)`,
/// starting at the minimum and stepping until the maximum is covered.
///
/// Degenerate samples:
/// - a constant sample has one bin of `CONSTANT_SAMPLE_BIN_WIDTH` centred on its value,
/// - a sample with zero IQR but non-zero range uses Sturges' width `range / (log2 n + 1)`.
///
/// At large magnitudes every width is raised to a few float spacings of the sample.
#[tracing::instrument(skip_all, level = "debug", fields(values = values.len()))]
pub(crate) fn freedman_diaconis_edges(values: &[Real]) -> Result<BinEdges, HistogramError> {
    if values.is_empty() {
        return Err(HistogramError::EmptySample);
    }
    if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(HistogramError::NonFiniteValue { index, value });
    }

    let (min, max) = bounds(values);
    let range = max - min;
    if range == 0.0 {
        debug!("Constant sample, using a single bin");
        let half_width = (CONSTANT_SAMPLE_BIN_WIDTH / 2.0).max(min_bin_width(min.abs()));
        return Ok(BinEdges(vec![min - half_width, min + half_width]));
    }

    let len = values.len() as Real;
    let mut width = 2.0 * interquartile_range(values.iter().copied()) / len.cbrt();
    if width <= 0.0 {
        debug!("Zero interquartile range, using Sturges' rule");
        width = range / (len.log2() + 1.0);
    }
    width = width
        .max(range / MAX_BINS as Real)
        .max(min_bin_width(min.abs().max(max.abs())));

    let num_bins = ((range / width).ceil() as usize).max(1);
    let mut edges: Vec<Real> = (0..=num_bins)
        .map(|i| min + i as Real * width)
        .collect();
    // Guard against rounding leaving the maximum just outside the last bin
    if let Some(last) = edges.last_mut() {
        *last = last.max(max);
    }
    Ok(BinEdges(edges))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use itertools::Itertools;
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, Normal};

    fn assert_covers(edges: &BinEdges, values: &[Real]) {
        let (min, max) = bounds(values);
        let edges = edges.as_slice();
        assert!(edges.iter().tuple_windows().all(|(a, b)| a < b));
        assert!(edges.first().is_some_and(|&first| first <= min));
        assert!(edges.last().is_some_and(|&last| last >= max));
    }

    #[test]
    fn empty_sample() {
        assert_eq!(
            freedman_diaconis_edges(&[]),
            Err(HistogramError::EmptySample)
        );
    }

    #[test]
    fn non_finite_sample() {
        assert_eq!(
            freedman_diaconis_edges(&[1.0, Real::INFINITY]),
            Err(HistogramError::NonFiniteValue {
                index: 1,
                value: Real::INFINITY
            })
        );
    }

    #[test]
    fn constant_sample() {
        let values = [1.0; 5];
        let edges = freedman_diaconis_edges(&values).expect("edges should be computed");
        assert_eq!(edges.as_slice(), &[0.5, 1.5]);
        assert_eq!(edges.counts(&values), vec![5]);
    }

    #[test]
    fn constant_sample_at_large_magnitude() {
        let values = [1e17; 5];
        let edges = freedman_diaconis_edges(&values).expect("edges should be computed");
        assert_eq!(edges.num_bins(), 1);
        assert_covers(&edges, &values);
        assert!(edges.as_slice()[0] < 1e17 && 1e17 < edges.as_slice()[1]);
        assert_eq!(edges.counts(&values), vec![5]);
    }

    #[test]
    fn narrow_spread_at_large_magnitude() {
        let mut values = vec![1e15; 500];
        values.extend([1e15 + 0.125; 499]);
        values.push(1e15 + 100.0);
        let edges = freedman_diaconis_edges(&values).expect("edges should be computed");
        assert!(edges.num_bins() <= MAX_BINS);
        assert_covers(&edges, &values);
        let counts = edges.counts(&values);
        assert_eq!(counts.iter().sum::<usize>(), values.len());
        assert_eq!(counts.first(), Some(&999));
        assert_eq!(counts.last(), Some(&1));
    }

    #[test]
    fn single_value() {
        let edges = freedman_diaconis_edges(&[-3.0]).expect("edges should be computed");
        assert_eq!(edges.num_bins(), 1);
        assert_covers(&edges, &[-3.0]);
    }

    #[test]
    fn zero_iqr_with_outlier() {
        let values = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 9.0];
        let edges = freedman_diaconis_edges(&values).expect("edges should be computed");
        // Sturges: 8 / (3 + 1) = 2
        assert_eq!(edges.num_bins(), 4);
        assert_approx_eq!(edges.as_slice()[1] - edges.as_slice()[0], 2.0);
        assert_covers(&edges, &values);
        assert_eq!(edges.counts(&values), vec![7, 0, 0, 1]);
    }

    #[test]
    fn known_width() {
        // IQR of 1..=8 is 3.5, n^(1/3) = 2, width = 3.5
        let values: Vec<Real> = (1..=8).map(Real::from).collect();
        let edges = freedman_diaconis_edges(&values).expect("edges should be computed");
        assert_eq!(edges.as_slice(), &[1.0, 4.5, 8.0]);
        assert_eq!(edges.counts(&values), vec![4, 4]);
    }

    #[test]
    fn bin_count_is_capped() {
        let mut values = vec![0.0; 100];
        values.extend((0..100).map(|i| 1.0 + i as Real * 1e-9));
        values.push(1e9);
        let edges = freedman_diaconis_edges(&values).expect("edges should be computed");
        assert!(edges.num_bins() <= MAX_BINS);
        assert_covers(&edges, &values);
    }

    #[test]
    fn gaussian_sample() {
        let mut rng = StdRng::seed_from_u64(42);
        let normal = Normal::new(5.0, 2.0).expect("parameters should be valid");
        let values: Vec<Real> = (0..1000).map(|_| normal.sample(&mut rng)).collect();
        let edges = freedman_diaconis_edges(&values).expect("edges should be computed");
        assert_covers(&edges, &values);
        assert_eq!(edges.counts(&values).iter().sum::<usize>(), values.len());
        // 2 * 1.349 * 2 / 10
        let width = edges.as_slice()[1] - edges.as_slice()[0];
        assert!((width - 0.54).abs() < 0.1, "width = {width}");
    }
}
