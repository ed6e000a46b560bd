use super::MatrixError;
use crate::kernel::{self, NotEqual};
use itertools::Itertools;
use std::collections::HashMap;

/// a square origin-destination matrix keyed by (sparse) zone numbers.
///
/// zone numbers are arbitrary integers; storage is dense, one row per origin
/// zone in ascending zone order, so the rows can be handed straight to the
/// vector kernel.
#[derive(Clone, Debug, PartialEq)]
pub struct SparseZoneMatrix {
    zones: Vec<i32>,
    index: HashMap<i32, usize>,
    data: Vec<Vec<f32>>,
}

impl SparseZoneMatrix {
    /// creates a zero-filled matrix over the given zone system.
    pub fn new(zones: &[i32]) -> Result<SparseZoneMatrix, MatrixError> {
        let zones = zones.iter().copied().sorted().collect_vec();
        if let Some((dup, _)) = zones.iter().tuple_windows().find(|(a, b)| a == b) {
            return Err(MatrixError::DuplicateZone(*dup));
        }
        let index = zones
            .iter()
            .enumerate()
            .map(|(i, z)| (*z, i))
            .collect::<HashMap<_, _>>();
        let data = vec![vec![0.0; zones.len()]; zones.len()];
        Ok(SparseZoneMatrix { zones, index, data })
    }

    /// builds a matrix from `(origin, destination, value)` entries. the zone
    /// system is the union of every origin and destination seen.
    pub fn from_entries(entries: &[(i32, i32, f32)]) -> Result<SparseZoneMatrix, MatrixError> {
        let zones = entries
            .iter()
            .flat_map(|(o, d, _)| [*o, *d])
            .unique()
            .collect_vec();
        let mut matrix = SparseZoneMatrix::new(&zones)?;
        for (o, d, v) in entries.iter() {
            matrix.set(*o, *d, *v)?;
        }
        Ok(matrix)
    }

    pub fn zones(&self) -> &[i32] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn rows(&self) -> &[Vec<f32>] {
        &self.data
    }

    pub fn get(&self, origin: i32, destination: i32) -> Result<f32, MatrixError> {
        let (o, d) = self.flat_index(origin, destination)?;
        Ok(self.data[o][d])
    }

    pub fn set(&mut self, origin: i32, destination: i32, value: f32) -> Result<(), MatrixError> {
        let (o, d) = self.flat_index(origin, destination)?;
        self.data[o][d] = value;
        Ok(())
    }

    /// total of every cell.
    pub fn sum(&self) -> f32 {
        kernel::sum_rows(&self.data)
    }

    /// total of the cells whose `mask` cell is non-zero.
    pub fn masked_sum(&self, mask: &SparseZoneMatrix) -> Result<f32, MatrixError> {
        self.check_zone_system(mask)?;
        let flags = mask.non_zero_flags()?;
        self.flagged_sum(&flags)
    }

    /// total of `self[o][d] * flags[o][d]`, for flags precomputed by [`Self::non_zero_flags`].
    pub fn flagged_sum(&self, flags: &[Vec<f32>]) -> Result<f32, MatrixError> {
        Ok(kernel::multiply_and_sum_rows(&self.data, flags)?)
    }

    /// a matrix of 0/1 flags marking the non-zero cells of this matrix.
    pub fn non_zero_flags(&self) -> Result<Vec<Vec<f32>>, MatrixError> {
        let mut flags = vec![vec![0.0; self.zones.len()]; self.zones.len()];
        kernel::flag_rows_scalar_rhs::<NotEqual, _, _>(&mut flags, &self.data, 0.0)?;
        Ok(flags)
    }

    /// number of non-zero cells.
    pub fn count_non_zero(&self) -> Result<usize, MatrixError> {
        let flags = self.non_zero_flags()?;
        Ok(kernel::sum_rows(&flags) as usize)
    }

    /// fails unless both matrices share the same zone system.
    pub fn check_zone_system(&self, other: &SparseZoneMatrix) -> Result<(), MatrixError> {
        if self.zones == other.zones {
            Ok(())
        } else {
            Err(MatrixError::ZoneSystemMismatch(format!(
                "{} zones vs {} zones",
                self.zones.len(),
                other.zones.len()
            )))
        }
    }

    fn flat_index(&self, origin: i32, destination: i32) -> Result<(usize, usize), MatrixError> {
        let o = self
            .index
            .get(&origin)
            .ok_or(MatrixError::UnknownZone(origin))?;
        let d = self
            .index
            .get(&destination)
            .ok_or(MatrixError::UnknownZone(destination))?;
        Ok((*o, *d))
    }
}
