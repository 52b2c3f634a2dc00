//! # Effective Vertical Stress
//!
//! Natural effective overburden σ'v0 (q'0) at a given depth, in kgf/cm²:
//!
//! ```text
//! z <= 0               : 0
//! no water table, z<zw : z · ρ_dry / 10 000
//! z >= zw              : (zw · ρ_dry + (z − zw) · (ρ_sat − ρ_w)) / 10 000
//! ```
//!
//! Densities are in kg/m³, so `z · ρ` is in kgf/m² and the division by
//! 10 000 yields kgf/cm² directly.
//!
//! The water table itself comes from field observations; see
//! [`WaterLevelObservations`].

use serde::{Deserialize, Serialize};

use crate::errors::{require_positive, CptError, CptResult};

/// Density of water (kg/m³)
pub const WATER_DENSITY: f64 = 1000.0;

/// Soil column properties used for the overburden computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilProfile {
    /// Density above the water table (kg/m³)
    pub dry_density: f64,
    /// Density below the water table (kg/m³)
    pub saturated_density: f64,
    /// Water table depth below ground (m), `None` when absent
    pub water_table: Option<f64>,
}

impl SoilProfile {
    pub fn new(dry_density: f64, saturated_density: f64, water_table: Option<f64>) -> CptResult<Self> {
        let profile = SoilProfile {
            dry_density,
            saturated_density,
            water_table,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Validate: dry density > 0, saturated ≥ dry, water table ≥ 0.
    pub fn validate(&self) -> CptResult<()> {
        require_positive("dry_density", self.dry_density)?;
        if !(self.saturated_density >= self.dry_density) {
            return Err(CptError::invalid_input(
                "saturated_density",
                self.saturated_density.to_string(),
                "Saturated density must be at least the dry density",
            ));
        }
        if let Some(wt) = self.water_table {
            if !wt.is_finite() || wt < 0.0 {
                return Err(CptError::invalid_input(
                    "water_table",
                    wt.to_string(),
                    "Water table must be a non-negative depth",
                ));
            }
        }
        Ok(())
    }

    /// True when a water table exists and `depth_m` is at or below it
    pub fn is_submerged(&self, depth_m: f64) -> bool {
        self.water_table.is_some_and(|wt| wt >= 0.0 && depth_m >= wt)
    }
}

/// Effective vertical stress σ'v0 at `depth_m` (kgf/cm²).
///
/// # Example
///
/// ```rust
/// use cpt_core::stress::{effective_vertical_stress, SoilProfile};
///
/// let soil = SoilProfile::new(1800.0, 2000.0, Some(1.0)).unwrap();
/// // 1 m of dry soil plus 1 m of buoyant soil
/// let q0 = effective_vertical_stress(2.0, &soil);
/// assert!((q0 - 0.28).abs() < 1e-12);
/// ```
pub fn effective_vertical_stress(depth_m: f64, soil: &SoilProfile) -> f64 {
    if depth_m <= 0.0 {
        return 0.0;
    }

    match soil.water_table {
        Some(wt) if soil.is_submerged(depth_m) => {
            let above = wt * soil.dry_density;
            let below = (depth_m - wt) * (soil.saturated_density - WATER_DENSITY);
            (above + below) / 10_000.0
        }
        _ => depth_m * soil.dry_density / 10_000.0,
    }
}

/// Water level readings noted in the field log of a borehole.
///
/// Readings are free text as typed by the operator (`"1,20"`, `"sec"`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterLevelObservations {
    /// Level read at the end of the test
    pub end_of_test: String,
    /// Level read at the end of the site works
    pub end_of_site: String,
}

impl WaterLevelObservations {
    /// Water table to use: end-of-site has priority over end-of-test.
    /// Blank, unparsable or negative readings are ignored.
    pub fn resolve_water_table(&self) -> Option<f64> {
        parse_level(&self.end_of_site).or_else(|| parse_level(&self.end_of_test))
    }
}

fn parse_level(reading: &str) -> Option<f64> {
    let trimmed = reading.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_water_table() {
        let soil = SoilProfile::new(1800.0, 2000.0, None).unwrap();
        assert_eq!(effective_vertical_stress(0.0, &soil), 0.0);
        assert_eq!(effective_vertical_stress(-1.0, &soil), 0.0);
        assert!((effective_vertical_stress(2.0, &soil) - 0.36).abs() < 1e-12);
    }

    #[test]
    fn test_water_table_boundary_is_inclusive() {
        let soil = SoilProfile::new(1800.0, 2000.0, Some(2.0)).unwrap();
        // At the table: both branches agree
        assert!((effective_vertical_stress(2.0, &soil) - 0.36).abs() < 1e-12);
        // 2 m dry + 1 m buoyant (1000 kg/m³)
        assert!((effective_vertical_stress(3.0, &soil) - 0.46).abs() < 1e-12);
        assert!(soil.is_submerged(2.0));
        assert!(!soil.is_submerged(1.99));
    }

    #[test]
    fn test_negative_water_table_counts_as_dry() {
        let soil = SoilProfile {
            dry_density: 1800.0,
            saturated_density: 2000.0,
            water_table: Some(-1.0),
        };
        assert!(!soil.is_submerged(2.0));
        assert!((effective_vertical_stress(2.0, &soil) - 0.36).abs() < 1e-12);
    }

    #[test]
    fn test_water_table_at_surface() {
        let soil = SoilProfile::new(1800.0, 2100.0, Some(0.0)).unwrap();
        assert!((effective_vertical_stress(1.0, &soil) - 0.11).abs() < 1e-12);
    }

    #[test]
    fn test_profile_validation() {
        assert!(SoilProfile::new(0.0, 2000.0, None).is_err());
        assert!(SoilProfile::new(1800.0, 1700.0, None).is_err());
        assert!(SoilProfile::new(1800.0, 2000.0, Some(-0.5)).is_err());
        assert!(SoilProfile::new(1800.0, 1800.0, Some(0.0)).is_ok());
    }

    #[test]
    fn test_water_level_priority() {
        let obs = WaterLevelObservations {
            end_of_test: "2,50".into(),
            end_of_site: "1.75".into(),
        };
        assert_eq!(obs.resolve_water_table(), Some(1.75));

        let obs = WaterLevelObservations {
            end_of_test: " 2,50 ".into(),
            end_of_site: "sec".into(),
        };
        assert_eq!(obs.resolve_water_table(), Some(2.5));

        let obs = WaterLevelObservations {
            end_of_test: "-1".into(),
            end_of_site: String::new(),
        };
        assert_eq!(obs.resolve_water_table(), None);
        assert_eq!(WaterLevelObservations::default().resolve_water_table(), None);
    }
}
