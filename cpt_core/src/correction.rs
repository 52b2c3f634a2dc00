//! # Mechanical Correction
//!
//! Turns raw cone and total-resistance readings (internal units) into
//! corrected qc and Qst, compensating for the weight of the rod string, the
//! weight of the outer tubes and the offset of whichever manometer was read.
//!
//! ## Formulas
//!
//! ```text
//! rods(d)  = base_rods + ceil(d)          (d > 0)
//!          = base_rods                    (d <= 0)
//! cap      = 1000 kgf / s                 (small manometer capacity)
//! δ(p)     = δ_small if |p| <= cap else δ_large
//!
//! qc       = (r_tip · s + rods · W_rod + δ(r_tip)) / s
//! r_total  = r_tip + Q_raw / s
//! Qst      = r_total · s − qc · s + rods · W_tube + δ(r_total)
//! Qst      = 0 when r_total == 0, then max(Qst, 0)
//! ```
//!
//! Weights and offsets are stored in kgf and converted with the fixed factor
//! [`CORRECTION_KGF_TO_DAN`] (9.81 / 10). Qst uses the corrected qc so that
//! total force = tip force + friction force still holds after correction.

use serde::{Deserialize, Serialize};

use crate::errors::{require_positive, CptError, CptResult};

/// Kilogram-force to decanewton factor of the correction formulas
pub const CORRECTION_KGF_TO_DAN: f64 = 9.81 / 10.0;

/// Full-scale reading of the small manometer (kgf)
pub const SMALL_MANOMETER_CAPACITY_KGF: f64 = 1000.0;

/// Physical parameters of the penetrometer rig.
///
/// Built once per test configuration and shared read-only by every
/// correction of a sounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApparatusParameters {
    /// Cone tip cross-section (m²)
    pub tip_area_m2: f64,
    /// Weight of one 1 m inner rod (kg)
    pub rod_weight_kg: f64,
    /// Weight of one 1 m outer tube (kg)
    pub tube_weight_kg: f64,
    /// Zero offset of the small manometer (kg)
    pub small_manometer_delta_kg: f64,
    /// Zero offset of the large manometer (kg)
    pub large_manometer_delta_kg: f64,
    /// Rods already in the string before the cone enters the ground
    pub rods_before_ground: u32,
}

impl ApparatusParameters {
    /// Validate parameters: positive tip area, finite weights and offsets.
    pub fn validate(&self) -> CptResult<()> {
        require_positive("tip_area_m2", self.tip_area_m2)?;
        let finite = [
            ("rod_weight_kg", self.rod_weight_kg),
            ("tube_weight_kg", self.tube_weight_kg),
            ("small_manometer_delta_kg", self.small_manometer_delta_kg),
            ("large_manometer_delta_kg", self.large_manometer_delta_kg),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(CptError::invalid_input(field, value.to_string(), "Must be finite"));
            }
        }
        Ok(())
    }

    /// Tip area in cm², as used by the unit conversions
    pub fn tip_area_cm2(&self) -> f64 {
        self.tip_area_m2 * 10_000.0
    }

    /// Small manometer capacity expressed as a tip pressure (DaN/m²)
    pub fn small_manometer_capacity(&self) -> f64 {
        SMALL_MANOMETER_CAPACITY_KGF * CORRECTION_KGF_TO_DAN / self.tip_area_m2
    }

    /// Manometer offset (DaN) applicable to a raw pressure reading (DaN/m²)
    pub fn manometer_delta(&self, raw_pressure: f64) -> f64 {
        let delta_kg = if raw_pressure.abs() <= self.small_manometer_capacity() {
            self.small_manometer_delta_kg
        } else {
            self.large_manometer_delta_kg
        };
        delta_kg * CORRECTION_KGF_TO_DAN
    }
}

/// Number of rods in the string with the cone at `depth_m`.
pub fn rod_count(depth_m: f64, rods_before_ground: u32) -> u32 {
    if depth_m > 0.0 {
        rods_before_ground + depth_m.ceil() as u32
    } else {
        rods_before_ground
    }
}

/// Corrected values at one depth (internal units).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectedReading {
    pub depth_m: f64,
    /// Corrected cone resistance (DaN/m²)
    pub qc_corrected: f64,
    /// Corrected total sleeve force (DaN), never negative
    pub qst_corrected: f64,
    pub rod_count: u32,
}

/// Correct a single reading.
///
/// `raw_tip` is the cone resistance in DaN/m², `raw_qst` the raw friction
/// force in DaN. Parameters are assumed valid (see [`correct_readings`]).
pub fn correct_reading(
    depth_m: f64,
    raw_tip: f64,
    raw_qst: f64,
    params: &ApparatusParameters,
) -> CorrectedReading {
    let s = params.tip_area_m2;
    let rods = rod_count(depth_m, params.rods_before_ground);
    let n = rods as f64;

    let rod_weight = n * params.rod_weight_kg * CORRECTION_KGF_TO_DAN;
    let qc = (raw_tip * s + rod_weight + params.manometer_delta(raw_tip)) / s;

    let raw_total = raw_tip + raw_qst / s;
    let tube_weight = n * params.tube_weight_kg * CORRECTION_KGF_TO_DAN;
    let qst = if raw_total == 0.0 {
        0.0
    } else {
        raw_total * s - qc * s + tube_weight + params.manometer_delta(raw_total)
    };

    CorrectedReading {
        depth_m,
        qc_corrected: qc,
        qst_corrected: qst.max(0.0),
        rod_count: rods,
    }
}

/// Correct a whole sounding from parallel depth / tip / friction slices.
///
/// # Errors
///
/// - `InvalidInput` when the parameters are invalid or the slices differ in length
pub fn correct_readings(
    depths: &[f64],
    raw_tip: &[f64],
    raw_qst: &[f64],
    params: &ApparatusParameters,
) -> CptResult<Vec<CorrectedReading>> {
    params.validate()?;
    if raw_tip.len() != depths.len() || raw_qst.len() != depths.len() {
        return Err(CptError::invalid_input(
            "readings",
            format!("{}/{}/{}", depths.len(), raw_tip.len(), raw_qst.len()),
            "Depth, tip and friction series must have the same length",
        ));
    }

    Ok(depths
        .iter()
        .zip(raw_tip.iter().zip(raw_qst.iter()))
        .map(|(&d, (&tip, &qst))| correct_reading(d, tip, qst, params))
        .collect())
}
