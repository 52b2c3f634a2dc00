//! # Bearing Capacity Engine
//!
//! Admissible foundation pressure under two strip footings from the friction
//! angles at a depth, with one of four methods:
//!
//! - [`BearingMethod::BrinchHansen`]
//! - [`BearingMethod::CaquotKerisel`]
//! - [`BearingMethod::Meyerhof`]
//! - [`BearingMethod::DeBeer`] (INISMa adaptation, the default)
//!
//! The first three compute `q·Nq + γ·B·Nγ` with φ = φu. De Beer computes
//! `q0p·Nq + Vpg·γ·B` from both φu and φ'.
//!
//! ## Units
//!
//! The formulas work in DaN/m² with the legacy gravity [`G_LEGACY`] (10):
//! q'0 in kgf/cm² becomes `q'0 · 1000 · g` DaN/m², densities become unit
//! weights through `g / 10`, and the raw pressure returns to kgf/cm² through
//! `10 / (10 000 · g)`. This is deliberately not the 9.81 of the unit
//! conversions.
//!
//! ## Water table
//!
//! Brinch Hansen, Caquot-Kérisel and Meyerhof use the saturated weight when
//! `depth >= water_table`. De Beer uses the buoyant weight `ρ_sat − 1000`
//! only when `depth > water_table`. The two comparisons differ on purpose so
//! that historical reports are reproduced.
//!
//! ## Example
//!
//! ```rust
//! use cpt_core::bearing::{compute_admissible_pressures, BearingInput, BearingMethod};
//!
//! let input = BearingInput {
//!     method: BearingMethod::DeBeer,
//!     depth_m: 2.0,
//!     q0_kgf_cm2: 0.36,
//!     phi_prime_deg: 32.0,
//!     phi_u_deg: 32.0,
//!     footing_width_1_m: 0.6,
//!     footing_width_2_m: 1.5,
//!     safety_coefficient: 2.0,
//!     dry_density: 1800.0,
//!     saturated_density: 2000.0,
//!     water_table: None,
//!     qc_kgf_cm2: 60.0,
//! };
//! let result = compute_admissible_pressures(&input).unwrap();
//! assert!(result.padm_2 > result.padm_1);
//! ```

pub mod factors;

pub use factors::{bearing_factor_n_gamma, bearing_factor_nq};

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{require_positive, CptError, CptResult};
use crate::units::G_LEGACY;

use factors::{
    de_beer_nq, n_gamma_brinch_hansen, n_gamma_caquot_kerisel, n_gamma_meyerhof, nq_prandtl, vpg,
    MIN_FRICTION_ANGLE_RAD,
};

/// Padm below this (kgf/cm²) is replaced by the fallback value
pub const PADM_FALLBACK_THRESHOLD: f64 = 0.1;

/// Raw pressure (DaN/m²) to kgf/cm² under the legacy gravity
pub const DAN_M2_TO_KGF_CM2: f64 = 10.0 / (10_000.0 * G_LEGACY);

/// Bearing-capacity method.
///
/// Serialized as the legacy label (e.g. `"Caquot Kérisel"`). Unknown labels
/// deserialize to [`BearingMethod::DeBeer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BearingMethod {
    #[default]
    DeBeer,
    BrinchHansen,
    CaquotKerisel,
    Meyerhof,
}

impl BearingMethod {
    pub const ALL: [BearingMethod; 4] = [
        BearingMethod::DeBeer,
        BearingMethod::BrinchHansen,
        BearingMethod::CaquotKerisel,
        BearingMethod::Meyerhof,
    ];

    /// Legacy label, matched verbatim (accents included)
    pub fn label(&self) -> &'static str {
        match self {
            BearingMethod::DeBeer => "De Beer (adapté)",
            BearingMethod::BrinchHansen => "Brinch Hansen",
            BearingMethod::CaquotKerisel => "Caquot Kérisel",
            BearingMethod::Meyerhof => "Meyerhof",
        }
    }

    /// Parse a label; anything unrecognized selects De Beer.
    ///
    /// This mirrors the historical tool, where the De Beer branch was the
    /// catch-all. Use [`BearingMethod::from_label_strict`] to reject unknown
    /// labels instead.
    pub fn from_label(label: &str) -> Self {
        Self::from_label_strict(label).unwrap_or_else(|_| {
            debug!("Unrecognized bearing method '{}', using De Beer", label);
            BearingMethod::DeBeer
        })
    }

    /// Parse a label, failing with `UnknownMethod` when unrecognized.
    pub fn from_label_strict(label: &str) -> CptResult<Self> {
        BearingMethod::ALL
            .into_iter()
            .find(|m| m.label() == label)
            .ok_or_else(|| CptError::UnknownMethod {
                label: label.to_string(),
            })
    }

    /// True for methods whose γ switches at `depth >= water_table`
    fn uses_inclusive_water_table(&self) -> bool {
        !matches!(self, BearingMethod::DeBeer)
    }
}

impl fmt::Display for BearingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BearingMethod {
    type Err = CptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label_strict(s)
    }
}

impl From<String> for BearingMethod {
    fn from(label: String) -> Self {
        BearingMethod::from_label(&label)
    }
}

impl From<BearingMethod> for String {
    fn from(method: BearingMethod) -> Self {
        method.label().to_string()
    }
}

/// Everything needed for the admissible pressures at one depth.
///
/// ## JSON Example
///
/// ```json
/// {
///   "method": "De Beer (adapté)",
///   "depth_m": 2.0,
///   "q0_kgf_cm2": 0.36,
///   "phi_prime_deg": 32.0,
///   "phi_u_deg": 32.0,
///   "footing_width_1_m": 0.6,
///   "footing_width_2_m": 1.5,
///   "safety_coefficient": 2.0,
///   "dry_density": 1800.0,
///   "saturated_density": 2000.0,
///   "water_table": null,
///   "qc_kgf_cm2": 60.0
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BearingInput {
    pub method: BearingMethod,
    /// Founding depth (m)
    pub depth_m: f64,
    /// Effective vertical stress at the founding depth (kgf/cm²)
    pub q0_kgf_cm2: f64,
    pub phi_prime_deg: f64,
    pub phi_u_deg: f64,
    /// Width of the first footing (m)
    pub footing_width_1_m: f64,
    /// Width of the second footing (m)
    pub footing_width_2_m: f64,
    /// Safety coefficient α dividing the raw pressure
    pub safety_coefficient: f64,
    /// Soil density above the water table (kg/m³)
    pub dry_density: f64,
    /// Soil density below the water table (kg/m³)
    pub saturated_density: f64,
    /// Water table depth (m), `None` when absent
    pub water_table: Option<f64>,
    /// Corrected qc (kgf/cm²), used by the fallback rule
    pub qc_kgf_cm2: f64,
}

impl BearingInput {
    /// Validate the inputs that would make the formulas meaningless.
    pub fn validate(&self) -> CptResult<()> {
        require_positive("safety_coefficient", self.safety_coefficient)?;
        require_positive("footing_width_1_m", self.footing_width_1_m)?;
        require_positive("footing_width_2_m", self.footing_width_2_m)?;
        Ok(())
    }

    /// Unit weight for the method's water-table rule (DaN/m³ with g = 10).
    fn unit_weight(&self) -> f64 {
        let g_factor = G_LEGACY / 10.0;
        match self.water_table {
            Some(wt) if self.method.uses_inclusive_water_table() && self.depth_m >= wt => {
                self.saturated_density * g_factor
            }
            Some(wt) if !self.method.uses_inclusive_water_table() && self.depth_m > wt => {
                (self.saturated_density - 1000.0) * g_factor
            }
            _ => self.dry_density * g_factor,
        }
    }
}

/// Admissible pressures for the two footings (kgf/cm²).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BearingPressureResult {
    pub padm_1: f64,
    pub padm_2: f64,
}

/// Raw pressure (DaN/m²) under a footing of width `b`.
///
/// `q` is the overburden in DaN/m² (also used as `qp` for De Beer, which
/// assumes no level change after works).
pub fn raw_pressure(input: &BearingInput, q: f64, b: f64) -> f64 {
    let phi_u = input.phi_u_deg.to_radians();
    let gamma = input.unit_weight();

    match input.method {
        BearingMethod::BrinchHansen => {
            q * nq_prandtl(phi_u) + gamma * b * n_gamma_brinch_hansen(phi_u)
        }
        BearingMethod::CaquotKerisel => {
            q * nq_prandtl(phi_u) + gamma * b * n_gamma_caquot_kerisel(phi_u)
        }
        BearingMethod::Meyerhof => {
            q * nq_prandtl(phi_u) + gamma * b * n_gamma_meyerhof(phi_u)
        }
        BearingMethod::DeBeer => {
            let phi_p = input.phi_prime_deg.to_radians();
            if phi_u < MIN_FRICTION_ANGLE_RAD || phi_p < MIN_FRICTION_ANGLE_RAD {
                return 0.0;
            }
            let (qp, q0p) = (q, q);
            q0p * de_beer_nq(phi_u, phi_p, qp / q0p) + vpg(phi_u) * gamma * b
        }
    }
}

/// Admissible pressures padm₁ and padm₂ at one depth.
///
/// Fallback: padm₁ below 0.1 is replaced by `qc / 10`; padm₂ below 0.1 is
/// then replaced by padm₁ (after its own substitution).
///
/// # Errors
///
/// - `InvalidInput` for a non-positive safety coefficient or footing width
pub fn compute_admissible_pressures(input: &BearingInput) -> CptResult<BearingPressureResult> {
    input.validate()?;

    let q = input.q0_kgf_cm2 * 1000.0 * G_LEGACY;
    let to_report = |p: f64| p * DAN_M2_TO_KGF_CM2 / input.safety_coefficient;

    let mut padm_1 = to_report(raw_pressure(input, q, input.footing_width_1_m));
    let mut padm_2 = to_report(raw_pressure(input, q, input.footing_width_2_m));

    if padm_1 < PADM_FALLBACK_THRESHOLD {
        padm_1 = input.qc_kgf_cm2 / 10.0;
    }
    if padm_2 < PADM_FALLBACK_THRESHOLD {
        padm_2 = padm_1;
    }

    Ok(BearingPressureResult { padm_1, padm_2 })
}
