//! # Unit Types
//!
//! Type-safe wrappers for the units met in CPT processing. They are plain
//! `f64` newtypes that serialize as bare numbers.
//!
//! ## Internal basis
//!
//! All corrections and conversions work in a single internal basis:
//! - Pressure (qc): decanewtons per square metre (DaN/m²)
//! - Force (Qst): decanewtons (DaN)
//!
//! Raw readings arrive either in modern units (MPa / kN) or in legacy
//! kilogram-force units (recorded as "kg"); reports are printed either as
//! MPa / kN or as kgf/cm² / kgf.
//!
//! ## Gravity conventions
//!
//! Two gravity constants coexist and must never be merged:
//! - [`G_STANDARD`] (9.81) defines the kilogram-force used by unit conversion.
//! - [`G_LEGACY`] (10) is the convention baked into the bearing-capacity
//!   formulas of the historical spreadsheet.
//!
//! ## Example
//!
//! ```rust
//! use cpt_core::units::{DaNPerM2, KgfPerCm2, MPa};
//!
//! let qc = MPa(5.0);
//! let internal: DaNPerM2 = qc.into();
//! assert_eq!(internal.0, 500_000.0);
//!
//! let report: KgfPerCm2 = internal.into();
//! assert!((report.0 - 50.968).abs() < 1e-3);
//! ```

pub mod conversion;
pub mod detection;

pub use conversion::{
    internal_qc_to_raw, internal_qst_to_raw, qc_to_internal, qst_to_internal, QcUnit, QstUnit,
};
pub use detection::{detect_qc_unit, detect_qst_unit, percentile_abs, DetectionThresholds};

use serde::{Deserialize, Serialize};

// ============================================================================
// Gravity Conventions
// ============================================================================

/// Gravitational acceleration defining the kilogram-force in unit conversion (m/s²)
pub const G_STANDARD: f64 = 9.81;

/// Gravitational acceleration of the legacy bearing-capacity spreadsheet (m/s²)
pub const G_LEGACY: f64 = 10.0;

/// Kilogram-force to decanewton under the standard convention (0.981)
pub const KGF_TO_DAN: f64 = G_STANDARD / 10.0;

/// Default cone tip area (cm²)
pub const DEFAULT_TIP_AREA_CM2: f64 = 10.0;

/// Square centimetres per square metre
pub const CM2_PER_M2: f64 = 10_000.0;

// ============================================================================
// Pressure Units
// ============================================================================

/// Pressure in decanewtons per square metre (internal basis)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DaNPerM2(pub f64);

/// Pressure in megapascals
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MPa(pub f64);

/// Pressure in kilogram-force per square centimetre
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KgfPerCm2(pub f64);

impl From<MPa> for DaNPerM2 {
    fn from(p: MPa) -> Self {
        // 1 MPa = 1e6 N/m² = 1e5 DaN/m²
        DaNPerM2(p.0 * 1.0e5)
    }
}

impl From<DaNPerM2> for MPa {
    fn from(p: DaNPerM2) -> Self {
        MPa(p.0 / 1.0e5)
    }
}

impl From<DaNPerM2> for KgfPerCm2 {
    fn from(p: DaNPerM2) -> Self {
        KgfPerCm2(p.0 / KGF_TO_DAN / CM2_PER_M2)
    }
}

impl From<KgfPerCm2> for DaNPerM2 {
    fn from(p: KgfPerCm2) -> Self {
        DaNPerM2(p.0 * KGF_TO_DAN * CM2_PER_M2)
    }
}

// ============================================================================
// Force Units
// ============================================================================

/// Force in decanewtons (internal basis)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DaN(pub f64);

/// Force in kilonewtons
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KiloNewtons(pub f64);

/// Force in kilogram-force
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kgf(pub f64);

impl From<KiloNewtons> for DaN {
    fn from(f: KiloNewtons) -> Self {
        DaN(f.0 * 100.0)
    }
}

impl From<DaN> for KiloNewtons {
    fn from(f: DaN) -> Self {
        KiloNewtons(f.0 / 100.0)
    }
}

impl From<Kgf> for DaN {
    fn from(f: Kgf) -> Self {
        DaN(f.0 * KGF_TO_DAN)
    }
}

impl From<DaN> for Kgf {
    fn from(f: DaN) -> Self {
        Kgf(f.0 / KGF_TO_DAN)
    }
}

// ============================================================================
// Display Pairs
// ============================================================================

/// Unit pair used when presenting corrected qc / Qst values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DisplayUnits {
    /// qc in MPa, Qst in kN
    #[default]
    #[serde(rename = "MPa_kN")]
    MpaKn,
    /// qc in kgf/cm², Qst in kgf
    #[serde(rename = "kg_kg")]
    KgKg,
}

impl DisplayUnits {
    /// Column unit caption for qc
    pub fn qc_label(&self) -> &'static str {
        match self {
            DisplayUnits::MpaKn => "[MPa]",
            DisplayUnits::KgKg => "[kg/cm\u{b2}]",
        }
    }

    /// Column unit caption for Qst
    pub fn qst_label(&self) -> &'static str {
        match self {
            DisplayUnits::MpaKn => "[kN]",
            DisplayUnits::KgKg => "[kg]",
        }
    }

    /// Convert an internal qc value (DaN/m²) to this display unit
    pub fn qc_from_internal(&self, qc: DaNPerM2) -> f64 {
        match self {
            DisplayUnits::MpaKn => MPa::from(qc).0,
            DisplayUnits::KgKg => KgfPerCm2::from(qc).0,
        }
    }

    /// Convert an internal Qst value (DaN) to this display unit
    pub fn qst_from_internal(&self, qst: DaN) -> f64 {
        match self {
            DisplayUnits::MpaKn => KiloNewtons::from(qst).0,
            DisplayUnits::KgKg => Kgf::from(qst).0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gravity_constants_stay_distinct() {
        assert_eq!(G_STANDARD, 9.81);
        assert_eq!(G_LEGACY, 10.0);
        assert!((KGF_TO_DAN - 0.981).abs() < 1e-12);
    }

    #[test]
    fn test_mpa_to_internal() {
        let p: DaNPerM2 = MPa(1.0).into();
        assert_eq!(p.0, 100_000.0);
    }

    #[test]
    fn test_kn_to_dan() {
        let f: DaN = KiloNewtons(1.5).into();
        assert_eq!(f.0, 150.0);
    }

    #[test]
    fn test_kgf_per_cm2_roundtrip() {
        let p = DaNPerM2(981.0);
        let report: KgfPerCm2 = p.into();
        // 981 DaN/m² = 1000 kgf/m² = 0.1 kgf/cm²
        assert!((report.0 - 0.1).abs() < 1e-12);
        let back: DaNPerM2 = report.into();
        assert!((back.0 - 981.0).abs() < 1e-9);
    }

    #[test]
    fn test_display_pairs() {
        let qc = DaNPerM2(500_000.0);
        let qst = DaN(200.0);
        assert!((DisplayUnits::MpaKn.qc_from_internal(qc) - 5.0).abs() < 1e-12);
        assert!((DisplayUnits::MpaKn.qst_from_internal(qst) - 2.0).abs() < 1e-12);
        assert!((DisplayUnits::KgKg.qst_from_internal(DaN(0.981)) - 1.0).abs() < 1e-12);
        assert_eq!(DisplayUnits::KgKg.qst_label(), "[kg]");
    }

    #[test]
    fn test_display_units_serialization() {
        let json = serde_json::to_string(&DisplayUnits::KgKg).unwrap();
        assert_eq!(json, "\"kg_kg\"");
        let roundtrip: DisplayUnits = serde_json::from_str("\"MPa_kN\"").unwrap();
        assert_eq!(roundtrip, DisplayUnits::MpaKn);
    }
}
