//! Forward-window and whole-series statistics
//!
//! Windows look ahead: the window at sample `k` covers `[k, k + window)`. A
//! window that runs past the end of the series, or that contains a missing
//! sample, yields a missing value rather than a partial result.

use crate::types::Column;

/// Apply `f` to every complete forward window of `values`
pub fn forward_apply<F>(values: &[Option<f64>], window: usize, f: F) -> Column
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let mut buffer = Vec::with_capacity(window);
    (0..values.len())
        .map(|k| {
            let slice = values.get(k..k.checked_add(window)?)?;
            buffer.clear();
            for value in slice {
                buffer.push((*value)?);
            }
            f(&buffer)
        })
        .collect()
}

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator); undefined below two values
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let variance =
        values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Percentile `p` (0-100) with linear interpolation between closest ranks
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Standard deviation of the present samples of a whole column
pub fn series_std(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    sample_std(&present)
}

/// `values[k] - values[k - 1]`; the first sample has no predecessor
pub fn first_difference(values: &[Option<f64>]) -> Column {
    std::iter::once(None)
        .chain(values.windows(2).map(|pair| match (pair[0], pair[1]) {
            (Some(previous), Some(current)) => Some(current - previous),
            _ => None,
        }))
        .take(values.len())
        .collect()
}
