use super::{Comparator, KernelError};
use rayon::prelude::*;

#[inline(always)]
fn flag_value<C: Comparator>(lhs: f32, rhs: f32) -> f32 {
    C::compare(lhs, rhs) as u8 as f32
}

/// sets `dest[i]` to 1.0 where `C(lhs[i], rhs[i])` holds, otherwise 0.0.
///
/// # Arguments
///
/// * `dest` - output flags, overwritten
/// * `lhs` - left operand, same length as `dest`
/// * `rhs` - right operand, same length as `dest`
///
/// # Returns
///
/// an `InvalidArgument` error if any length differs. nothing is written in that case.
pub fn flag<C: Comparator>(dest: &mut [f32], lhs: &[f32], rhs: &[f32]) -> Result<(), KernelError> {
    if lhs.len() != dest.len() {
        return Err(KernelError::length_mismatch("lhs", dest.len(), lhs.len()));
    }
    if rhs.len() != dest.len() {
        return Err(KernelError::length_mismatch("rhs", dest.len(), rhs.len()));
    }
    for ((d, l), r) in dest.iter_mut().zip(lhs).zip(rhs) {
        *d = flag_value::<C>(*l, *r);
    }
    Ok(())
}

/// broadcast form of [`flag`] where the left operand is a scalar.
/// when the scalar absorbs the comparator (AND with 0, OR with non-zero) the
/// destination is filled directly.
pub fn flag_scalar_lhs<C: Comparator>(
    dest: &mut [f32],
    lhs: f32,
    rhs: &[f32],
) -> Result<(), KernelError> {
    if rhs.len() != dest.len() {
        return Err(KernelError::length_mismatch("rhs", dest.len(), rhs.len()));
    }
    if let Some(fill) = C::absorbing(lhs) {
        dest.fill(fill);
        return Ok(());
    }
    for (d, r) in dest.iter_mut().zip(rhs) {
        *d = flag_value::<C>(lhs, *r);
    }
    Ok(())
}

/// broadcast form of [`flag`] where the right operand is a scalar.
pub fn flag_scalar_rhs<C: Comparator>(
    dest: &mut [f32],
    lhs: &[f32],
    rhs: f32,
) -> Result<(), KernelError> {
    if lhs.len() != dest.len() {
        return Err(KernelError::length_mismatch("lhs", dest.len(), lhs.len()));
    }
    if let Some(fill) = C::absorbing(rhs) {
        dest.fill(fill);
        return Ok(());
    }
    for (d, l) in dest.iter_mut().zip(lhs) {
        *d = flag_value::<C>(*l, rhs);
    }
    Ok(())
}

/// row-wise [`flag`]. rows are processed in parallel; row counts and each
/// row's length must match. every length is checked before any row is
/// written, so nothing is written on error.
pub fn flag_rows<C, D, L, R>(dest: &mut [D], lhs: &[L], rhs: &[R]) -> Result<(), KernelError>
where
    C: Comparator,
    D: AsMut<[f32]> + Send,
    L: AsRef<[f32]> + Sync,
    R: AsRef<[f32]> + Sync,
{
    if lhs.len() != dest.len() {
        return Err(KernelError::length_mismatch("lhs rows", dest.len(), lhs.len()));
    }
    if rhs.len() != dest.len() {
        return Err(KernelError::length_mismatch("rhs rows", dest.len(), rhs.len()));
    }
    check_row_lengths("lhs", dest, lhs)?;
    check_row_lengths("rhs", dest, rhs)?;
    dest.par_iter_mut()
        .zip(lhs.par_iter())
        .zip(rhs.par_iter())
        .try_for_each(|((d, l), r)| flag::<C>(d.as_mut(), l.as_ref(), r.as_ref()))
}

/// row-wise [`flag_scalar_lhs`].
pub fn flag_rows_scalar_lhs<C, D, R>(dest: &mut [D], lhs: f32, rhs: &[R]) -> Result<(), KernelError>
where
    C: Comparator,
    D: AsMut<[f32]> + Send,
    R: AsRef<[f32]> + Sync,
{
    if rhs.len() != dest.len() {
        return Err(KernelError::length_mismatch("rhs rows", dest.len(), rhs.len()));
    }
    check_row_lengths("rhs", dest, rhs)?;
    dest.par_iter_mut()
        .zip(rhs.par_iter())
        .try_for_each(|(d, r)| flag_scalar_lhs::<C>(d.as_mut(), lhs, r.as_ref()))
}

/// row-wise [`flag_scalar_rhs`].
pub fn flag_rows_scalar_rhs<C, D, L>(dest: &mut [D], lhs: &[L], rhs: f32) -> Result<(), KernelError>
where
    C: Comparator,
    D: AsMut<[f32]> + Send,
    L: AsRef<[f32]> + Sync,
{
    if lhs.len() != dest.len() {
        return Err(KernelError::length_mismatch("lhs rows", dest.len(), lhs.len()));
    }
    check_row_lengths("lhs", dest, lhs)?;
    dest.par_iter_mut()
        .zip(lhs.par_iter())
        .try_for_each(|(d, l)| flag_scalar_rhs::<C>(d.as_mut(), l.as_ref(), rhs))
}

fn check_row_lengths<D, R>(argument: &str, dest: &mut [D], rows: &[R]) -> Result<(), KernelError>
where
    D: AsMut<[f32]>,
    R: AsRef<[f32]>,
{
    for (index, (d, r)) in dest.iter_mut().zip(rows).enumerate() {
        let (expected, found) = (d.as_mut().len(), r.as_ref().len());
        if expected != found {
            return Err(KernelError::length_mismatch(
                &format!("{argument} row {index}"),
                expected,
                found,
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{And, Equal, GreaterThanOrEqual, LessThan, LessThanOrEqual, NotEqual, Or};

    fn operands() -> (Vec<f32>, Vec<f32>) {
        let a = (0..37).map(|i| (i % 5) as f32).collect::<Vec<_>>();
        let b = (0..37).map(|i| (i % 3) as f32).collect::<Vec<_>>();
        (a, b)
    }

    #[test]
    fn test_flag_equal_matches_elementwise() {
        let (a, b) = operands();
        let mut dest = vec![-1.0; a.len()];
        flag::<Equal>(&mut dest, &a, &b).expect("lengths match");
        for i in 0..a.len() {
            let expected = if a[i] == b[i] { 1.0 } else { 0.0 };
            assert_eq!(dest[i], expected, "index {i}");
        }
    }

    #[test]
    fn test_flag_each_comparator() {
        let a = [1.0, 2.0, 3.0];
        let b = [2.0, 2.0, 2.0];
        let mut dest = [0.0; 3];
        flag::<LessThan>(&mut dest, &a, &b).unwrap();
        assert_eq!(dest, [1.0, 0.0, 0.0]);
        flag::<LessThanOrEqual>(&mut dest, &a, &b).unwrap();
        assert_eq!(dest, [1.0, 1.0, 0.0]);
        flag::<GreaterThanOrEqual>(&mut dest, &a, &b).unwrap();
        assert_eq!(dest, [0.0, 1.0, 1.0]);
        flag::<NotEqual>(&mut dest, &a, &b).unwrap();
        assert_eq!(dest, [1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_flag_length_mismatch_is_error() {
        let mut dest = vec![7.0; 4];
        let result = flag::<Equal>(&mut dest, &[1.0, 2.0, 3.0, 4.0], &[1.0, 2.0, 3.0]);
        match result {
            Err(KernelError::InvalidArgument { argument, .. }) => assert_eq!(argument, "rhs"),
            other => panic!("expected InvalidArgument, found {other:?}"),
        }
        assert_eq!(dest, vec![7.0; 4], "destination must be untouched");
    }

    #[test]
    fn test_scalar_broadcast_matches_array_form() {
        let (a, _) = operands();
        let scalar = vec![2.0; a.len()];
        let mut broadcast = vec![0.0; a.len()];
        let mut expanded = vec![0.0; a.len()];
        flag_scalar_rhs::<Equal>(&mut broadcast, &a, 2.0).unwrap();
        flag::<Equal>(&mut expanded, &a, &scalar).unwrap();
        assert_eq!(broadcast, expanded);
        flag_scalar_lhs::<LessThan>(&mut broadcast, 2.0, &a).unwrap();
        flag::<LessThan>(&mut expanded, &scalar, &a).unwrap();
        assert_eq!(broadcast, expanded);
    }

    #[test]
    fn test_and_with_zero_clears_destination() {
        let mut dest = vec![5.0; 10];
        let data = vec![1.0; 10];
        flag_scalar_lhs::<And>(&mut dest, 0.0, &data).unwrap();
        assert!(dest.iter().all(|v| *v == 0.0));
        flag_scalar_rhs::<Or>(&mut dest, &vec![0.0; 10], 4.0).unwrap();
        assert!(dest.iter().all(|v| *v == 1.0));
    }

    #[test]
    fn test_gate_with_zero_lane() {
        let mut dest = [0.0; 4];
        flag::<And>(&mut dest, &[1.0, 0.0, 2.0, 0.0], &[1.0, 1.0, 0.0, 0.0]).unwrap();
        assert_eq!(dest, [1.0, 0.0, 0.0, 0.0]);
        flag::<Or>(&mut dest, &[1.0, 0.0, 2.0, 0.0], &[1.0, 1.0, 0.0, 0.0]).unwrap();
        assert_eq!(dest, [1.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_rows_match_flat_form() {
        let lhs = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let rhs = vec![vec![1.0, 0.0, 3.0], vec![0.0, 5.0, 0.0]];
        let mut dest = vec![vec![0.0; 3]; 2];
        flag_rows::<Equal, _, _, _>(&mut dest, &lhs, &rhs).unwrap();
        assert_eq!(dest, vec![vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 0.0]]);

        flag_rows_scalar_rhs::<GreaterThanOrEqual, _, _>(&mut dest, &lhs, 3.0).unwrap();
        assert_eq!(dest, vec![vec![0.0, 0.0, 1.0], vec![1.0, 1.0, 1.0]]);

        flag_rows_scalar_lhs::<Equal, _, _>(&mut dest, 0.0, &rhs).unwrap();
        assert_eq!(dest, vec![vec![0.0, 1.0, 0.0], vec![1.0, 0.0, 1.0]]);
    }

    #[test]
    fn test_rows_with_ragged_row_is_error() {
        let lhs = vec![vec![1.0, 2.0], vec![3.0]];
        let rhs = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let mut dest = vec![vec![0.0; 2]; 2];
        match flag_rows::<Equal, _, _, _>(&mut dest, &lhs, &rhs) {
            Err(KernelError::InvalidArgument { argument, .. }) => assert_eq!(argument, "lhs row 1"),
            other => panic!("expected InvalidArgument, found {other:?}"),
        }
        assert_eq!(dest, vec![vec![0.0; 2]; 2], "no row written on error");

        let mut dest = vec![vec![5.0; 2], vec![5.0; 3]];
        assert!(flag_rows_scalar_rhs::<Equal, _, _>(&mut dest, &rhs, 1.0).is_err());
        assert!(flag_rows_scalar_lhs::<Equal, _, _>(&mut dest, 1.0, &rhs).is_err());
        assert_eq!(dest, vec![vec![5.0; 2], vec![5.0; 3]]);
    }
}
