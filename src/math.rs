use num_traits::Float;
use std::cmp::Ordering;

/// Median of the finite values, averaging the two middle elements for even
/// counts. `None` when nothing finite is left.
pub fn median<T: Float>(values: &[T]) -> Option<T> {
    let mut sorted: Vec<T> = values.iter().copied().filter(|x| x.is_finite()).collect();

    if sorted.is_empty() {
        return None;
    }

    sorted.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        let two = T::one() + T::one();
        Some((sorted[mid - 1] + sorted[mid]) / two)
    } else {
        Some(sorted[mid])
    }
}

/// Indices sorted by key, ties kept in index order.
pub fn argsort<T: Float>(values: &[T]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..values.len()).collect();
    idx.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(Ordering::Equal)
    });
    idx
}

/// Index of the first minimum.
pub fn argmin<T: Float>(values: impl IntoIterator<Item = T>) -> Option<(usize, T)> {
    values
        .into_iter()
        .enumerate()
        .fold(None, |best, (i, v)| match best {
            Some((_, b)) if !(v < b) => best,
            _ => Some((i, v)),
        })
}
