//! Down-sampling for history queries

/// Select every `stride`-th element anchored at the newest row, keeping at
/// most `count` results, ascending order preserved.
///
/// `rows` must be ascending by time. Anchoring at the tail guarantees the
/// returned series always ends at the most recent observation, whatever
/// the window length works out to.
pub fn stride_tail<T>(rows: Vec<T>, stride: usize, count: usize) -> Vec<T> {
    let stride = stride.max(1);

    let mut picked: Vec<T> = rows
        .into_iter()
        .rev()
        .step_by(stride)
        .take(count)
        .collect();
    picked.reverse();
    picked
}
