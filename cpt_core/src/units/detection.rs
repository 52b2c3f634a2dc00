//! # Raw Unit Detection
//!
//! Guesses the raw unit of a qc or Qst column from its magnitudes. The
//! configured percentile of the absolute finite values is compared against
//! per-unit ceilings:
//!
//! ```text
//! qc : P ≤ 70   → MPa      P ≤ 7000  → kg      otherwise → MPa (warning)
//! Qst: P ≤ 600  → kN       P ≤ 60000 → kg      otherwise → kN  (warning)
//! ```
//!
//! Detection never fails: an ambiguous column logs a warning and falls back
//! to the modern unit.

use log::warn;
use serde::{Deserialize, Serialize};

use super::conversion::{QcUnit, QstUnit};

/// Ceilings used by [`detect_qc_unit`] and [`detect_qst_unit`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionThresholds {
    /// Largest percentile value still read as MPa
    pub qc_mpa_max: f64,
    /// Largest percentile value still read as legacy kg
    pub qc_kg_max: f64,
    /// Largest percentile value still read as kN
    pub qst_kn_max: f64,
    /// Largest percentile value still read as legacy kg
    pub qst_kg_max: f64,
    /// Percentile (0-100) of |values| compared against the ceilings
    pub percentile: f64,
}

impl Default for DetectionThresholds {
    fn default() -> Self {
        DetectionThresholds {
            qc_mpa_max: 70.0,
            qc_kg_max: 7000.0,
            qst_kn_max: 600.0,
            qst_kg_max: 60000.0,
            percentile: 99.0,
        }
    }
}

/// Percentile of the absolute finite values, with linear interpolation
/// between closest ranks. Returns 0 when no finite value is present.
pub fn percentile_abs(values: &[f64], percentile: f64) -> f64 {
    let mut clean: Vec<f64> = values
        .iter()
        .filter(|v| v.is_finite())
        .map(|v| v.abs())
        .collect();
    if clean.is_empty() {
        return 0.0;
    }
    clean.sort_by(f64::total_cmp);

    let rank = (percentile.clamp(0.0, 100.0) / 100.0) * (clean.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    clean[lower] + (clean[upper] - clean[lower]) * fraction
}

/// Detect the raw unit of a qc column.
pub fn detect_qc_unit(values: &[f64], thresholds: &DetectionThresholds) -> QcUnit {
    let p = percentile_abs(values, thresholds.percentile);

    if p <= thresholds.qc_mpa_max {
        QcUnit::MPa
    } else if p <= thresholds.qc_kg_max {
        QcUnit::Kg
    } else {
        warn!(
            "Ambiguous qc unit: P{:.0} = {:.1} is outside MPa (<= {}) and kg (<= {}); falling back to MPa",
            thresholds.percentile, p, thresholds.qc_mpa_max, thresholds.qc_kg_max
        );
        QcUnit::MPa
    }
}

/// Detect the raw unit of a Qst column.
pub fn detect_qst_unit(values: &[f64], thresholds: &DetectionThresholds) -> QstUnit {
    let p = percentile_abs(values, thresholds.percentile);

    if p <= thresholds.qst_kn_max {
        QstUnit::KN
    } else if p <= thresholds.qst_kg_max {
        QstUnit::Kg
    } else {
        warn!(
            "Ambiguous Qst unit: P{:.0} = {:.1} is outside kN (<= {}) and kg (<= {}); falling back to kN",
            thresholds.percentile, p, thresholds.qst_kn_max, thresholds.qst_kg_max
        );
        QstUnit::KN
    }
}
