use super::Real;
use itertools::Itertools;

pub(crate) fn sorted<I: IntoIterator<Item = Real>>(values: I) -> Vec<Real> {
    values.into_iter().sorted_by(Real::total_cmp).collect()
}

/// Percentile `q` (in the range 0 to 100) of an ascending slice, linearly
/// interpolating between the two nearest ranks.
/// Returns `None` if the slice is empty.
pub(crate) fn percentile(sorted: &[Real], q: Real) -> Option<Real> {
    let last = sorted.len().checked_sub(1)?;
    let rank = (q / 100.0).clamp(0.0, 1.0) * last as Real;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(last);
    let low = *sorted.get(lower)?;
    let high = *sorted.get(upper)?;
    Some(low + (high - low) * (rank - lower as Real))
}

/// 75th minus 25th percentile. An empty sample has no spread, so yields zero.
pub(crate) fn interquartile_range<I: IntoIterator<Item = Real>>(values: I) -> Real {
    let values = sorted(values);
    match (percentile(&values, 75.0), percentile(&values, 25.0)) {
        (Some(upper), Some(lower)) => upper - lower,
        _ => 0.0,
    }
}

pub(crate) fn median<I: IntoIterator<Item = Real>>(values: I) -> Option<Real> {
    percentile(&sorted(values), 50.0)
}
