use super::KernelError;
use rayon::prelude::*;

/// lane width used by the flat reductions. the result of a sum does not depend
/// on this beyond floating point accumulation order.
pub const DEFAULT_LANES: usize = 8;

/// sums `length` elements of `data` beginning at `start`.
///
/// # Arguments
///
/// * `data` - values to sum
/// * `start` - offset of the first element
/// * `length` - number of elements
///
/// # Returns
///
/// the sum, or an `InvalidArgument` error if the range falls outside of `data`.
pub fn sum(data: &[f32], start: usize, length: usize) -> Result<f32, KernelError> {
    let end = start
        .checked_add(length)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| KernelError::InvalidArgument {
            argument: String::from("length"),
            message: format!(
                "range [{start}, {start}+{length}) exceeds data of length {}",
                data.len()
            ),
        })?;
    Ok(sum_slice(&data[start..end]))
}

/// sums a whole slice with [`DEFAULT_LANES`] accumulators.
pub fn sum_slice(data: &[f32]) -> f32 {
    sum_lanes::<DEFAULT_LANES>(data)
}

/// sums a slice using `LANES` independent accumulators. each accumulator
/// receives every `LANES`-th element, which is the layout a SIMD register of
/// that width would see; the tail is added sequentially. `LANES` must be
/// positive, which is checked at compile time.
pub fn sum_lanes<const LANES: usize>(data: &[f32]) -> f32 {
    const { assert!(LANES > 0, "sum_lanes needs at least one lane") };
    let mut acc = [0.0f32; LANES];
    let chunks = data.chunks_exact(LANES);
    let remainder = chunks.remainder();
    for chunk in chunks {
        for (a, v) in acc.iter_mut().zip(chunk) {
            *a += *v;
        }
    }
    let tail: f32 = remainder.iter().sum();
    acc.iter().sum::<f32>() + tail
}

/// sums every row of a jagged matrix, rows in parallel.
pub fn sum_rows<R>(rows: &[R]) -> f32
where
    R: AsRef<[f32]> + Sync,
{
    rows.par_iter().map(|row| sum_slice(row.as_ref())).sum()
}

/// returns `sum(lhs[i] * rhs[i])` without storing the products.
pub fn multiply_and_sum(lhs: &[f32], rhs: &[f32]) -> Result<f32, KernelError> {
    if lhs.len() != rhs.len() {
        return Err(KernelError::length_mismatch("rhs", lhs.len(), rhs.len()));
    }
    let mut acc = [0.0f32; DEFAULT_LANES];
    let l_chunks = lhs.chunks_exact(DEFAULT_LANES);
    let r_chunks = rhs.chunks_exact(DEFAULT_LANES);
    let tail: f32 = l_chunks
        .remainder()
        .iter()
        .zip(r_chunks.remainder())
        .map(|(l, r)| l * r)
        .sum();
    for (lc, rc) in l_chunks.zip(r_chunks) {
        for ((a, l), r) in acc.iter_mut().zip(lc).zip(rc) {
            *a += l * r;
        }
    }
    Ok(acc.iter().sum::<f32>() + tail)
}

/// row-wise [`multiply_and_sum`], rows in parallel, totalled.
pub fn multiply_and_sum_rows<L, R>(lhs: &[L], rhs: &[R]) -> Result<f32, KernelError>
where
    L: AsRef<[f32]> + Sync,
    R: AsRef<[f32]> + Sync,
{
    if lhs.len() != rhs.len() {
        return Err(KernelError::length_mismatch("rhs rows", lhs.len(), rhs.len()));
    }
    let row_sums = lhs
        .par_iter()
        .zip(rhs.par_iter())
        .map(|(l, r)| multiply_and_sum(l.as_ref(), r.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(row_sums.iter().sum())
}
