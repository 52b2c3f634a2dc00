//! # Hampel Outlier Filter
//!
//! Removes spurious spikes from depth-ordered CPT columns (typically qc and
//! Qst) by replacing statistical outliers with values interpolated from their
//! neighbours.
//!
//! ## Algorithm
//!
//! For every point `x[i]` of a target column, per pass:
//!
//! ```text
//! window = x[max(0, i-w) ..= min(n-1, i+w)]        (present values only)
//! med    = median(window)
//! MAD    = median(|window - med|)                  (1e-10 when zero)
//! score  = |x[i] - med| / MAD
//! outlier  <=>  score > k
//! ```
//!
//! Points that are missing, or whose window holds fewer than 3 present
//! values, are skipped. Flagged points are blanked and the column is linearly
//! interpolated by position. Passes repeat (at most [`MAX_PASSES`]) until no
//! column yields a new outlier; remaining gaps at the extremities are then
//! filled forward/backward.
//!
//! ## Example
//!
//! ```rust
//! use cpt_core::filter::{hampel_filter, HampelConfig};
//! use cpt_core::series::DepthTable;
//!
//! let depth: Vec<f64> = (0..11).map(|i| i as f64 * 0.1).collect();
//! let mut qc = vec![10.0; 11];
//! qc[5] = 100.0;
//! let table = DepthTable::from_values(&["depth", "qc"], vec![depth, qc]).unwrap();
//!
//! let outcome = hampel_filter(&table, &[1], &HampelConfig::new(4, 1.9)).unwrap();
//! assert_eq!(outcome.total_outliers, 1);
//! assert_eq!(outcome.table.columns[1][5], Some(10.0));
//! ```

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{CptError, CptResult};
use crate::series::{median, Column, DepthTable};

/// Upper bound on filtering passes
pub const MAX_PASSES: usize = 4;

/// Minimum number of present values in a window for a point to be tested
pub const MIN_WINDOW_VALUES: usize = 3;

/// Substitute for a zero MAD
pub const MAD_EPSILON: f64 = 1e-10;

/// Hampel filter parameters.
///
/// There is deliberately no `Default`: the interactive cleaning view and the
/// standalone despiking tool use different thresholds, so every caller names
/// its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HampelConfig {
    /// Half-width of the symmetric window (points on each side)
    pub window_size: usize,
    /// Outlier threshold on the MAD-scaled deviation
    pub k: f64,
    /// Repeat passes until stable (otherwise a single pass)
    #[serde(default = "multi_pass_default")]
    pub multi_pass: bool,
}

fn multi_pass_default() -> bool {
    true
}

impl HampelConfig {
    /// Multi-pass filter with the given window and threshold
    pub fn new(window_size: usize, k: f64) -> Self {
        HampelConfig {
            window_size,
            k,
            multi_pass: true,
        }
    }

    /// Parameters of the interactive cleaning view (w = 4, k = 1.9)
    pub fn cleaning_view() -> Self {
        HampelConfig::new(4, 1.9)
    }

    /// Parameters of the standalone aggressive despiker (w = 5, k = 1.5)
    pub fn aggressive() -> Self {
        HampelConfig::new(5, 1.5)
    }

    /// Single pass only
    pub fn single_pass(mut self) -> Self {
        self.multi_pass = false;
        self
    }

    /// Validate parameters.
    pub fn validate(&self) -> CptResult<()> {
        if self.window_size == 0 {
            return Err(CptError::invalid_input(
                "window_size",
                "0",
                "Window size must be positive",
            ));
        }
        if !self.k.is_finite() || self.k <= 0.0 {
            return Err(CptError::invalid_input(
                "k",
                self.k.to_string(),
                "Threshold k must be positive",
            ));
        }
        Ok(())
    }
}

/// Cleaned table plus filtering statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOutcome {
    /// Table with outliers interpolated and gaps filled
    pub table: DepthTable,
    /// Outliers replaced, keyed by column index (every requested column listed)
    pub outliers_per_column: BTreeMap<usize, usize>,
    /// Sum over all columns and passes
    pub total_outliers: usize,
    /// Passes performed (1..=MAX_PASSES)
    pub passes: usize,
}

/// Flag Hampel outliers in one column. Missing points are never flagged.
pub fn detect_outliers(values: &[Option<f64>], window_size: usize, k: f64) -> Vec<bool> {
    let n = values.len();
    let mut flags = vec![false; n];
    let mut window: Vec<f64> = Vec::with_capacity(2 * window_size + 1);

    for (i, value) in values.iter().enumerate() {
        let Some(x) = *value else { continue };

        let start = i.saturating_sub(window_size);
        let end = (i + window_size + 1).min(n);
        window.clear();
        window.extend(values[start..end].iter().flatten());
        if window.len() < MIN_WINDOW_VALUES {
            continue;
        }

        let med = median(&mut window);
        let mut deviations: Vec<f64> = window.iter().map(|v| (v - med).abs()).collect();
        let mut mad = median(&mut deviations);
        if mad == 0.0 {
            mad = MAD_EPSILON;
        }

        if (x - med).abs() / mad > k {
            flags[i] = true;
        }
    }
    flags
}

/// Linearly interpolate interior gaps by position; trailing gaps take the
/// last present value, leading gaps stay missing.
pub fn interpolate_linear(col: &mut Column) {
    let mut prev: Option<(usize, f64)> = None;
    let mut i = 0;
    while i < col.len() {
        match col[i] {
            Some(v) => {
                prev = Some((i, v));
                i += 1;
            }
            None => {
                let gap_start = i;
                while i < col.len() && col[i].is_none() {
                    i += 1;
                }
                let Some((left_idx, left)) = prev else { continue };
                match col.get(i).copied().flatten() {
                    Some(right) => {
                        let span = (i - left_idx) as f64;
                        for (j, cell) in col.iter_mut().enumerate().take(i).skip(gap_start) {
                            let t = (j - left_idx) as f64 / span;
                            *cell = Some(left + (right - left) * t);
                        }
                    }
                    None => {
                        for cell in &mut col[gap_start..i] {
                            *cell = Some(left);
                        }
                    }
                }
            }
        }
    }
}

/// Run the Hampel filter on the given columns of a table.
///
/// Columns are filtered independently but share the stopping rule: passes
/// stop as soon as no column produced a new outlier.
///
/// # Errors
///
/// - `InvalidInput` for a zero window or a non-positive `k`
/// - `EmptyInput` for a table without rows or an empty column list
/// - `ColumnOutOfRange` for an unknown column index
pub fn hampel_filter(
    table: &DepthTable,
    columns: &[usize],
    config: &HampelConfig,
) -> CptResult<FilterOutcome> {
    config.validate()?;
    table.validate()?;
    if table.row_count() == 0 {
        return Err(CptError::empty_input("table has no rows"));
    }
    if columns.is_empty() {
        return Err(CptError::empty_input("no columns selected for filtering"));
    }
    for &index in columns {
        table.column(index)?;
    }

    let mut result = table.clone();
    let mut outliers_per_column: BTreeMap<usize, usize> =
        columns.iter().map(|&c| (c, 0)).collect();
    let mut total_outliers = 0;
    let mut passes = 0;
    let max_passes = if config.multi_pass { MAX_PASSES } else { 1 };

    for pass in 0..max_passes {
        let mut found_this_pass = 0;

        for &index in columns {
            let col = &mut result.columns[index];
            let flags = detect_outliers(col, config.window_size, config.k);
            let n_outliers = flags.iter().filter(|f| **f).count();
            if n_outliers == 0 {
                continue;
            }

            for (cell, flagged) in col.iter_mut().zip(flags) {
                if flagged {
                    *cell = None;
                }
            }
            interpolate_linear(col);

            debug!("Hampel pass {}: column {} -> {} outliers", pass + 1, index, n_outliers);
            found_this_pass += n_outliers;
            *outliers_per_column.entry(index).or_insert(0) += n_outliers;
            total_outliers += n_outliers;
        }

        passes = pass + 1;
        if found_this_pass == 0 {
            break;
        }
    }

    if result.has_gaps() {
        result.fill_gaps();
    }

    Ok(FilterOutcome {
        table: result,
        outliers_per_column,
        total_outliers,
        passes,
    })
}
