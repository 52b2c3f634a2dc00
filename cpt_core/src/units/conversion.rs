//! # Raw Unit Conversion
//!
//! Maps raw qc / Qst magnitudes to the internal DaN/m² / DaN basis and back.
//!
//! | Quantity | Raw unit | To internal                        |
//! |----------|----------|------------------------------------|
//! | qc       | MPa      | × 1e5                              |
//! | qc       | kg (kgf) | × 0.981 / tip area (m²)            |
//! | Qst      | kN       | × 100                              |
//! | Qst      | kg (kgf) | × 0.981                            |
//!
//! Legacy "kg" qc readings are forces on the cone tip, hence the division by
//! the tip area. Every inverse is the exact algebraic inverse of its forward
//! conversion.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{DaN, DaNPerM2, KiloNewtons, MPa, CM2_PER_M2, KGF_TO_DAN};
use crate::errors::{require_positive, CptError, CptResult};

/// Raw unit of cone tip resistance readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QcUnit {
    /// Megapascals
    #[default]
    #[serde(rename = "MPa")]
    MPa,
    /// Legacy kilogram-force reading on the tip
    #[serde(rename = "kg")]
    Kg,
}

/// Raw unit of sleeve/total friction readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QstUnit {
    /// Kilonewtons
    #[default]
    #[serde(rename = "kN")]
    KN,
    /// Legacy kilogram-force
    #[serde(rename = "kg")]
    Kg,
}

impl QcUnit {
    pub fn label(&self) -> &'static str {
        match self {
            QcUnit::MPa => "MPa",
            QcUnit::Kg => "kg",
        }
    }
}

impl QstUnit {
    pub fn label(&self) -> &'static str {
        match self {
            QstUnit::KN => "kN",
            QstUnit::Kg => "kg",
        }
    }
}

impl fmt::Display for QcUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for QstUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for QcUnit {
    type Err = CptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MPa" => Ok(QcUnit::MPa),
            "kg" => Ok(QcUnit::Kg),
            other => Err(CptError::unknown_unit("qc", other)),
        }
    }
}

impl FromStr for QstUnit {
    type Err = CptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kN" => Ok(QstUnit::KN),
            "kg" => Ok(QstUnit::Kg),
            other => Err(CptError::unknown_unit("Qst", other)),
        }
    }
}

fn tip_area_m2(tip_area_cm2: f64) -> CptResult<f64> {
    require_positive("tip_area_cm2", tip_area_cm2)?;
    Ok(tip_area_cm2 / CM2_PER_M2)
}

/// Convert raw qc readings to internal DaN/m².
///
/// # Example
///
/// ```rust
/// use cpt_core::units::{qc_to_internal, QcUnit};
///
/// let internal = qc_to_internal(&[5.0], QcUnit::MPa, 10.0).unwrap();
/// assert_eq!(internal, vec![500_000.0]);
///
/// // 100 kgf on a 10 cm² tip
/// let internal = qc_to_internal(&[100.0], QcUnit::Kg, 10.0).unwrap();
/// assert!((internal[0] - 98_100.0).abs() < 1e-6);
/// ```
pub fn qc_to_internal(values: &[f64], unit: QcUnit, tip_area_cm2: f64) -> CptResult<Vec<f64>> {
    let area = tip_area_m2(tip_area_cm2)?;
    Ok(match unit {
        QcUnit::MPa => values.iter().map(|&v| DaNPerM2::from(MPa(v)).0).collect(),
        QcUnit::Kg => values.iter().map(|&v| v * KGF_TO_DAN / area).collect(),
    })
}

/// Convert raw Qst readings to internal DaN.
pub fn qst_to_internal(values: &[f64], unit: QstUnit) -> Vec<f64> {
    match unit {
        QstUnit::KN => values.iter().map(|&v| DaN::from(KiloNewtons(v)).0).collect(),
        QstUnit::Kg => values.iter().map(|&v| v * KGF_TO_DAN).collect(),
    }
}

/// Convert internal qc values (DaN/m²) back to the raw unit.
pub fn internal_qc_to_raw(values: &[f64], unit: QcUnit, tip_area_cm2: f64) -> CptResult<Vec<f64>> {
    let area = tip_area_m2(tip_area_cm2)?;
    Ok(match unit {
        QcUnit::MPa => values.iter().map(|&v| MPa::from(DaNPerM2(v)).0).collect(),
        QcUnit::Kg => values.iter().map(|&v| v * area / KGF_TO_DAN).collect(),
    })
}

/// Convert internal Qst values (DaN) back to the raw unit.
pub fn internal_qst_to_raw(values: &[f64], unit: QstUnit) -> Vec<f64> {
    match unit {
        QstUnit::KN => values.iter().map(|&v| KiloNewtons::from(DaN(v)).0).collect(),
        QstUnit::Kg => values.iter().map(|&v| v / KGF_TO_DAN).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1e-12)
    }

    #[test]
    fn test_qst_conversions() {
        assert_eq!(qst_to_internal(&[2.0], QstUnit::KN), vec![200.0]);
        let kg = qst_to_internal(&[1000.0], QstUnit::Kg);
        assert!((kg[0] - 981.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_tip_area() {
        assert!(qc_to_internal(&[1.0], QcUnit::Kg, 0.0).is_err());
        assert!(internal_qc_to_raw(&[1.0], QcUnit::MPa, -10.0).is_err());
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!("MPa".parse::<QcUnit>().unwrap(), QcUnit::MPa);
        assert_eq!("kg".parse::<QstUnit>().unwrap(), QstUnit::Kg);
        let err = "psi".parse::<QcUnit>().unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_UNIT");
    }

    #[test]
    fn test_unit_serialization() {
        assert_eq!(serde_json::to_string(&QstUnit::KN).unwrap(), "\"kN\"");
        let unit: QcUnit = serde_json::from_str("\"kg\"").unwrap();
        assert_eq!(unit, QcUnit::Kg);
    }

    proptest! {
        #[test]
        fn prop_qc_roundtrip(
            values in prop::collection::vec(-1.0e6f64..1.0e6, 1..50),
            kg in any::<bool>(),
            tip_area_cm2 in 1.0f64..20.0,
        ) {
            let unit = if kg { QcUnit::Kg } else { QcUnit::MPa };
            let internal = qc_to_internal(&values, unit, tip_area_cm2).unwrap();
            let back = internal_qc_to_raw(&internal, unit, tip_area_cm2).unwrap();
            for (original, recovered) in values.iter().zip(back.iter()) {
                prop_assert!(close(*original, *recovered));
            }
        }

        #[test]
        fn prop_qst_roundtrip(
            values in prop::collection::vec(-1.0e6f64..1.0e6, 1..50),
            kg in any::<bool>(),
        ) {
            let unit = if kg { QstUnit::Kg } else { QstUnit::KN };
            let back = internal_qst_to_raw(&qst_to_internal(&values, unit), unit);
            for (original, recovered) in values.iter().zip(back.iter()) {
                prop_assert!(close(*original, *recovered));
            }
        }
    }
}
