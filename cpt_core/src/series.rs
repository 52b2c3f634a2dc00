//! # Depth-Indexed Data
//!
//! Containers for depth-ordered sounding data:
//!
//! - [`DepthTable`] - raw multi-column readings as they come from a reader
//!   (column 0 is depth by convention), with missing cells as `None`
//! - [`DepthSeries`] - a single `(depth, value)` sequence sorted by depth
//!
//! Depths may be irregular (raw sampling) or resampled to a fixed pitch for
//! reporting with [`resample_depths`]. Duplicate depths are kept.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::errors::{require_positive, CptError, CptResult};

/// One column of a [`DepthTable`]; `None` marks a missing reading.
pub type Column = Vec<Option<f64>>;

/// Multi-column table of readings, one row per sample.
///
/// ## JSON Example
///
/// ```json
/// {
///   "column_names": ["depth", "qc", "qst"],
///   "columns": [[0.2, 0.4], [3.1, null], [12.0, 14.5]]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthTable {
    /// Column labels (informational)
    pub column_names: Vec<String>,
    /// Column-major data, all columns the same length
    pub columns: Vec<Column>,
}

impl DepthTable {
    /// Build a table, checking that every column has the same length.
    pub fn new(column_names: Vec<String>, columns: Vec<Column>) -> CptResult<Self> {
        let table = DepthTable { column_names, columns };
        table.validate()?;
        Ok(table)
    }

    /// Build a table from dense columns; non-finite values become missing.
    ///
    /// ```rust
    /// use cpt_core::series::DepthTable;
    ///
    /// let table = DepthTable::from_values(
    ///     &["depth", "qc", "qst"],
    ///     vec![vec![0.2, 0.4], vec![3.1, f64::NAN], vec![12.0, 14.5]],
    /// ).unwrap();
    /// assert_eq!(table.row_count(), 2);
    /// assert_eq!(table.columns[1][1], None);
    /// ```
    pub fn from_values(column_names: &[&str], columns: Vec<Vec<f64>>) -> CptResult<Self> {
        let columns = columns
            .into_iter()
            .map(|col| col.into_iter().map(|v| v.is_finite().then_some(v)).collect())
            .collect();
        DepthTable::new(column_names.iter().map(|s| s.to_string()).collect(), columns)
    }

    /// Check structural consistency (equal column lengths).
    pub fn validate(&self) -> CptResult<()> {
        if let Some(first) = self.columns.first() {
            let n = first.len();
            if let Some((idx, col)) = self.columns.iter().enumerate().find(|(_, c)| c.len() != n) {
                return Err(CptError::invalid_input(
                    format!("columns[{}]", idx),
                    col.len().to_string(),
                    format!("Column length differs from column 0 ({} rows)", n),
                ));
            }
        }
        Ok(())
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Borrow a column by index.
    pub fn column(&self, index: usize) -> CptResult<&[Option<f64>]> {
        self.columns
            .get(index)
            .map(Vec::as_slice)
            .ok_or(CptError::ColumnOutOfRange {
                index,
                column_count: self.column_count(),
            })
    }

    /// Rows with a present depth, stably sorted by ascending depth.
    pub fn sorted_by_depth(&self, depth_column: usize) -> CptResult<DepthTable> {
        let depths = self.column(depth_column)?;
        let mut order: Vec<(usize, f64)> = depths
            .iter()
            .enumerate()
            .filter_map(|(i, d)| d.filter(|v| v.is_finite()).map(|v| (i, v)))
            .collect();
        order.sort_by(|a, b| a.1.total_cmp(&b.1));

        let columns = self
            .columns
            .iter()
            .map(|col| order.iter().map(|&(i, _)| col[i]).collect())
            .collect();
        Ok(DepthTable {
            column_names: self.column_names.clone(),
            columns,
        })
    }

    /// Extract `(depth, value)` pairs where both cells are present.
    pub fn series(&self, depth_column: usize, value_column: usize) -> CptResult<DepthSeries> {
        let depths = self.column(depth_column)?;
        let values = self.column(value_column)?;
        let points = depths
            .iter()
            .zip(values.iter())
            .filter_map(|(d, v)| match (d, v) {
                (Some(depth_m), Some(value)) => Some(DepthPoint {
                    depth_m: *depth_m,
                    value: *value,
                }),
                _ => None,
            })
            .collect();
        Ok(DepthSeries::new(points))
    }

    /// Fill leading gaps backward and trailing/interior gaps forward, per column.
    /// Columns with no value at all are left untouched.
    pub fn fill_gaps(&mut self) {
        for col in &mut self.columns {
            fill_forward_backward(col);
        }
    }

    /// True when any cell of any column is missing
    pub fn has_gaps(&self) -> bool {
        self.columns.iter().any(|c| c.iter().any(Option::is_none))
    }
}

/// Forward-fill then backward-fill a single column.
pub(crate) fn fill_forward_backward(col: &mut [Option<f64>]) {
    let mut last = None;
    for cell in col.iter_mut() {
        match cell {
            Some(v) => last = Some(*v),
            None => *cell = last,
        }
    }
    let mut next = None;
    for cell in col.iter_mut().rev() {
        match cell {
            Some(v) => next = Some(*v),
            None => *cell = next,
        }
    }
}

/// A single depth-indexed sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthPoint {
    /// Depth below ground level (m)
    pub depth_m: f64,
    /// Sample value
    pub value: f64,
}

/// Sequence of samples sorted ascending by depth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepthSeries {
    points: Vec<DepthPoint>,
}

impl DepthSeries {
    /// Build a series; points are stably sorted by depth.
    pub fn new(mut points: Vec<DepthPoint>) -> Self {
        points.sort_by(|a, b| a.depth_m.total_cmp(&b.depth_m));
        DepthSeries { points }
    }

    pub fn points(&self) -> &[DepthPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn depths(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.depth_m).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// Index of the first depth with the minimal distance to `target`.
pub fn nearest_index(depths: &[f64], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, d) in depths.iter().enumerate() {
        let dist = (d - target).abs();
        if best.map_or(true, |(_, b)| dist < b) {
            best = Some((i, dist));
        }
    }
    best.map(|(i, _)| i)
}

/// Median of a slice (mean of the two middle values for even lengths).
/// The slice is reordered in place. Returns NaN for an empty slice.
pub(crate) fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

fn round6(x: f64) -> f64 {
    (x * 1.0e6).round() / 1.0e6
}

/// Pick the report depths for a sounding.
///
/// A regular grid `0, step, 2·step, … final_depth` is laid over the data and
/// each grid point snaps to the nearest recorded depth within `step / 2`
/// (grid points with no close sample are kept as-is). The last report depth
/// is always exactly `final_depth`.
///
/// Data coarser than the requested pitch is never upsampled: the recorded
/// depths are returned unchanged, with `final_depth` appended when missing.
///
/// # Example
///
/// ```rust
/// use cpt_core::series::resample_depths;
///
/// let depths: Vec<f64> = (0..=20).map(|i| i as f64 * 0.05).collect();
/// let grid = resample_depths(&depths, 0.2, 1.0).unwrap();
/// assert_eq!(grid.len(), 6);
/// assert_eq!(*grid.last().unwrap(), 1.0);
/// ```
pub fn resample_depths(depths: &[f64], step_m: f64, final_depth: f64) -> CptResult<Vec<f64>> {
    require_positive("step_m", step_m)?;
    if depths.len() < 2 {
        return Ok(depths.to_vec());
    }

    let mut diffs: Vec<f64> = depths.windows(2).map(|w| w[1] - w[0]).collect();
    let data_step = median(&mut diffs);

    if data_step > step_m * 1.5 {
        warn!(
            "Data pitch ({:.4} m) is coarser than the requested pitch ({:.4} m); keeping recorded depths",
            data_step, step_m
        );
        let mut kept = depths.to_vec();
        if let Some(last) = kept.last() {
            if (last - final_depth).abs() > 1e-6 {
                kept.push(final_depth);
            }
        }
        return Ok(kept);
    }

    // Ties go to even so a half-step final depth does not overshoot
    let n_steps = (final_depth / step_m).round_ties_even().max(0.0) as usize;
    let mut targets: Vec<f64> = (0..=n_steps).map(|i| round6(i as f64 * step_m)).collect();
    if targets.last().map_or(true, |t| (t - final_depth).abs() > 1e-6) {
        targets.push(final_depth);
    }

    let tolerance = step_m / 2.0;
    let mut selected: Vec<f64> = targets
        .iter()
        .map(|&target| match nearest_index(depths, target) {
            Some(i) if (depths[i] - target).abs() <= tolerance => depths[i],
            _ => target,
        })
        .collect();

    if let Some(last) = selected.last_mut() {
        *last = final_depth;
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DepthTable {
        DepthTable::from_values(
            &["depth", "qc", "qst"],
            vec![
                vec![0.4, 0.2, f64::NAN, 0.6],
                vec![4.0, 2.0, 3.0, 6.0],
                vec![40.0, f64::NAN, 30.0, 60.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_mismatched_columns_rejected() {
        let result = DepthTable::new(
            vec!["depth".into(), "qc".into()],
            vec![vec![Some(0.0), Some(0.2)], vec![Some(1.0)]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_column_out_of_range() {
        let err = table().column(5).unwrap_err();
        assert_eq!(err, CptError::ColumnOutOfRange { index: 5, column_count: 3 });
    }

    #[test]
    fn test_sorted_by_depth_drops_missing_depths() {
        let sorted = table().sorted_by_depth(0).unwrap();
        assert_eq!(sorted.row_count(), 3);
        assert_eq!(sorted.columns[0], vec![Some(0.2), Some(0.4), Some(0.6)]);
        assert_eq!(sorted.columns[1], vec![Some(2.0), Some(4.0), Some(6.0)]);
        assert_eq!(sorted.columns[2], vec![None, Some(40.0), Some(60.0)]);
    }

    #[test]
    fn test_series_extraction() {
        let series = table().series(0, 2).unwrap();
        assert_eq!(series.depths(), vec![0.4, 0.6]);
        assert_eq!(series.values(), vec![40.0, 60.0]);
    }

    #[test]
    fn test_duplicate_depths_kept() {
        let points = [(1.0, 3.0), (0.5, 1.0), (1.0, 4.0)]
            .iter()
            .map(|&(depth_m, value)| DepthPoint { depth_m, value })
            .collect();
        let series = DepthSeries::new(points);
        assert_eq!(series.depths(), vec![0.5, 1.0, 1.0]);
        // Stable sort keeps original order among duplicates
        assert_eq!(series.values(), vec![1.0, 3.0, 4.0]);
    }

    #[test]
    fn test_fill_gaps() {
        let mut col = vec![None, Some(1.0), None, Some(3.0), None];
        fill_forward_backward(&mut col);
        assert_eq!(col, vec![Some(1.0), Some(1.0), Some(1.0), Some(3.0), Some(3.0)]);

        let mut empty: Column = vec![None, None];
        fill_forward_backward(&mut empty);
        assert_eq!(empty, vec![None, None]);
    }

    #[test]
    fn test_nearest_prefers_first_on_tie() {
        assert_eq!(nearest_index(&[0.0, 1.0, 2.0], 0.5), Some(0));
        assert_eq!(nearest_index(&[0.0, 1.0, 2.0], 1.6), Some(2));
        assert_eq!(nearest_index(&[], 1.0), None);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&mut [4.0, 1.0, 2.0, 3.0]), 2.5);
        assert!(median(&mut []).is_nan());
    }

    #[test]
    fn test_resample_regular_grid() {
        let depths: Vec<f64> = (0..=25).map(|i| i as f64 * 0.04).collect();
        let grid = resample_depths(&depths, 0.2, 1.0).unwrap();
        assert_eq!(grid.len(), 6);
        for (i, d) in grid.iter().enumerate() {
            assert!((d - i as f64 * 0.2).abs() < 0.02 + 1e-9);
        }
        assert_eq!(grid[5], 1.0);
    }

    #[test]
    fn test_resample_final_depth_beyond_data() {
        let depths = [0.0, 0.1, 0.2, 0.3, 0.4];
        // 0.7 / 0.2 is just under 3.5 in f64, so the grid stops at 0.6
        let grid = resample_depths(&depths, 0.2, 0.7).unwrap();
        assert_eq!(grid, vec![0.0, 0.2, 0.4, 0.6, 0.7]);

        // 0.9 / 0.2 = 4.5 rounds to 4 steps; 0.6 and 0.8 have no sample
        // within 0.1 m and stay on the grid
        let grid = resample_depths(&depths, 0.2, 0.9).unwrap();
        assert_eq!(grid, vec![0.0, 0.2, 0.4, 0.6, 0.8, 0.9]);
    }

    #[test]
    fn test_resample_never_upsamples() {
        let depths = [0.0, 1.0, 2.0, 3.0];
        let grid = resample_depths(&depths, 0.2, 3.5).unwrap();
        assert_eq!(grid, vec![0.0, 1.0, 2.0, 3.0, 3.5]);

        let same = resample_depths(&depths, 0.2, 3.0).unwrap();
        assert_eq!(same, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_resample_short_input() {
        assert_eq!(resample_depths(&[1.2], 0.2, 2.0).unwrap(), vec![1.2]);
        assert!(resample_depths(&[0.0, 0.1], 0.0, 1.0).is_err());
    }
}
