//! # Report Settings
//!
//! User-editable configuration consumed by the report pipeline: soil
//! densities, bearing method and footings, unit handling, Hampel filter
//! parameters and the penetrometer rigs ("machines").
//!
//! Settings are an immutable snapshot: load once, pass by reference.
//! Every key is optional in the TOML file and falls back to its default.
//!
//! ```toml
//! [soil]
//! dry_density = 1800.0
//! saturated_density = 2000.0
//!
//! [bearing]
//! method = "De Beer (adapté)"
//! footing_width_1_m = 0.6
//! footing_width_2_m = 1.5
//! safety_coefficient = 2.0
//!
//! [units]
//! tip_area_cm2 = 10.0
//! display = "MPa_kN"
//!
//! [[machines]]
//! name = "Gouda 20t"
//! rod_weight_large_kg = 6.5
//! tube_weight_large_kg = 7.2
//! rods_before_ground = 1
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bearing::BearingMethod;
use crate::correction::ApparatusParameters;
use crate::errors::{require_positive, CptError, CptResult};
use crate::filter::HampelConfig;
use crate::stress::SoilProfile;
use crate::units::{DetectionThresholds, DisplayUnits, DEFAULT_TIP_AREA_CM2};

/// Complete settings snapshot for report generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReportSettings {
    /// Penetrometer rigs available to soundings
    pub machines: Vec<Machine>,
    pub soil: SoilSettings,
    pub bearing: BearingSettings,
    pub units: UnitSettings,
    pub filter: FilterSettings,
    pub layout: LayoutSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilSettings {
    /// Density above the water table (kg/m³)
    pub dry_density: f64,
    /// Density below the water table (kg/m³)
    pub saturated_density: f64,
}

impl Default for SoilSettings {
    fn default() -> Self {
        SoilSettings {
            dry_density: 1800.0,
            saturated_density: 2000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BearingSettings {
    pub method: BearingMethod,
    pub footing_width_1_m: f64,
    pub footing_width_2_m: f64,
    /// Safety coefficient α
    pub safety_coefficient: f64,
}

impl Default for BearingSettings {
    fn default() -> Self {
        BearingSettings {
            method: BearingMethod::DeBeer,
            footing_width_1_m: 0.6,
            footing_width_2_m: 1.5,
            safety_coefficient: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitSettings {
    /// Cone tip area (cm²)
    pub tip_area_cm2: f64,
    /// Unit pair for displayed qc / Qst
    pub display: DisplayUnits,
    pub detection: DetectionThresholds,
}

impl Default for UnitSettings {
    fn default() -> Self {
        UnitSettings {
            tip_area_cm2: DEFAULT_TIP_AREA_CM2,
            display: DisplayUnits::default(),
            detection: DetectionThresholds::default(),
        }
    }
}

/// Hampel cleaning applied to raw readings before correction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Off by default: reports use the readings as recorded
    pub enabled: bool,
    pub window_size: usize,
    pub k: f64,
    pub multi_pass: bool,
}

impl Default for FilterSettings {
    fn default() -> Self {
        let view = HampelConfig::cleaning_view();
        FilterSettings {
            enabled: false,
            window_size: view.window_size,
            k: view.k,
            multi_pass: view.multi_pass,
        }
    }
}

impl FilterSettings {
    pub fn hampel(&self) -> HampelConfig {
        HampelConfig {
            window_size: self.window_size,
            k: self.k,
            multi_pass: self.multi_pass,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Report depth pitch (cm)
    pub resample_step_cm: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        LayoutSettings {
            resample_step_cm: 20.0,
        }
    }
}

impl LayoutSettings {
    pub fn resample_step_m(&self) -> f64 {
        self.resample_step_cm / 100.0
    }
}

/// Rod string section fitted on a rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RodSection {
    Small,
    #[default]
    Large,
}

/// A penetrometer rig and its rod/tube weights per section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Machine {
    pub name: String,
    pub capacity_tonnes: f64,
    pub rod_weight_small_kg: f64,
    pub tube_weight_small_kg: f64,
    pub rod_weight_large_kg: f64,
    pub tube_weight_large_kg: f64,
    pub rods_before_ground: u32,
}

impl Default for Machine {
    fn default() -> Self {
        Machine {
            name: "New machine".to_string(),
            capacity_tonnes: 20.0,
            rod_weight_small_kg: 0.0,
            tube_weight_small_kg: 0.0,
            rod_weight_large_kg: 0.0,
            tube_weight_large_kg: 0.0,
            rods_before_ground: 0,
        }
    }
}

impl Machine {
    /// Apparatus parameters for this rig with the given section and
    /// manometer offsets read on site.
    pub fn apparatus(
        &self,
        section: RodSection,
        tip_area_cm2: f64,
        small_manometer_delta_kg: f64,
        large_manometer_delta_kg: f64,
    ) -> ApparatusParameters {
        let (rod_weight_kg, tube_weight_kg) = match section {
            RodSection::Small => (self.rod_weight_small_kg, self.tube_weight_small_kg),
            RodSection::Large => (self.rod_weight_large_kg, self.tube_weight_large_kg),
        };
        ApparatusParameters {
            tip_area_m2: tip_area_cm2 * 1e-4,
            rod_weight_kg,
            tube_weight_kg,
            small_manometer_delta_kg,
            large_manometer_delta_kg,
            rods_before_ground: self.rods_before_ground,
        }
    }
}

impl ReportSettings {
    /// Parse settings from TOML; missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> CptResult<Self> {
        let settings: ReportSettings =
            toml::from_str(content).map_err(|e| CptError::serialization(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate a TOML settings file.
    pub fn load(path: &Path) -> CptResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CptError::file_error("read", path.display().to_string(), e.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> CptResult<String> {
        toml::to_string_pretty(self).map_err(|e| CptError::serialization(e.to_string()))
    }

    /// Check every numeric setting the pipeline relies on.
    pub fn validate(&self) -> CptResult<()> {
        SoilProfile::new(self.soil.dry_density, self.soil.saturated_density, None)?;
        require_positive("safety_coefficient", self.bearing.safety_coefficient)?;
        require_positive("footing_width_1_m", self.bearing.footing_width_1_m)?;
        require_positive("footing_width_2_m", self.bearing.footing_width_2_m)?;
        require_positive("tip_area_cm2", self.units.tip_area_cm2)?;
        require_positive("resample_step_cm", self.layout.resample_step_cm)?;
        self.filter.hampel().validate()?;

        let pct = self.units.detection.percentile;
        if !(0.0..=100.0).contains(&pct) {
            return Err(CptError::invalid_input(
                "percentile",
                pct.to_string(),
                "Percentile must be between 0 and 100",
            ));
        }
        Ok(())
    }

    /// Rig by name (exact match)
    pub fn machine(&self, name: &str) -> Option<&Machine> {
        self.machines.iter().find(|m| m.name == name)
    }

    /// Soil profile for a sounding with the given water table.
    pub fn soil_profile(&self, water_table: Option<f64>) -> CptResult<SoilProfile> {
        SoilProfile::new(self.soil.dry_density, self.soil.saturated_density, water_table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = ReportSettings::default();
        assert_eq!(s.soil.dry_density, 1800.0);
        assert_eq!(s.soil.saturated_density, 2000.0);
        assert_eq!(s.bearing.method, BearingMethod::DeBeer);
        assert_eq!(s.bearing.footing_width_1_m, 0.6);
        assert_eq!(s.bearing.footing_width_2_m, 1.5);
        assert_eq!(s.bearing.safety_coefficient, 2.0);
        assert_eq!(s.units.tip_area_cm2, 10.0);
        assert_eq!(s.units.detection.qst_kg_max, 60_000.0);
        assert_eq!(s.layout.resample_step_m(), 0.2);
        assert_eq!(s.filter.hampel(), HampelConfig::new(4, 1.9));
        assert!(!s.filter.enabled);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        assert_eq!(ReportSettings::from_toml_str("").unwrap(), ReportSettings::default());
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
            [bearing]
            method = "Caquot Kérisel"
            safety_coefficient = 3.0

            [units.detection]
            percentile = 95.0

            [[machines]]
            name = "Gouda 20t"
            rod_weight_large_kg = 6.5
            rods_before_ground = 1
        "#;
        let s = ReportSettings::from_toml_str(toml).unwrap();
        assert_eq!(s.bearing.method, BearingMethod::CaquotKerisel);
        assert_eq!(s.bearing.safety_coefficient, 3.0);
        assert_eq!(s.bearing.footing_width_1_m, 0.6);
        assert_eq!(s.units.detection.percentile, 95.0);
        assert_eq!(s.units.detection.qc_mpa_max, 70.0);

        let machine = s.machine("Gouda 20t").unwrap();
        assert_eq!(machine.rods_before_ground, 1);
        assert_eq!(machine.capacity_tonnes, 20.0);
        assert!(s.machine("Other").is_none());
    }

    #[test]
    fn test_unknown_method_label_falls_back() {
        let s = ReportSettings::from_toml_str("[bearing]\nmethod = \"Terzaghi\"\n").unwrap();
        assert_eq!(s.bearing.method, BearingMethod::DeBeer);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = ReportSettings::from_toml_str("[bearing]\nsafety_coefficient = 0.0\n").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(ReportSettings::from_toml_str("[soil]\nsaturated_density = 1000.0\n").is_err());
        assert!(ReportSettings::from_toml_str("[filter]\nk = -1.0\n").is_err());
        assert!(ReportSettings::from_toml_str("[units.detection]\npercentile = 120.0\n").is_err());
        assert_eq!(
            ReportSettings::from_toml_str("[soil\n").unwrap_err().error_code(),
            "SERIALIZATION_ERROR"
        );
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut s = ReportSettings::default();
        s.bearing.method = BearingMethod::Meyerhof;
        s.machines.push(Machine {
            name: "Rig A".into(),
            rod_weight_large_kg: 6.0,
            ..Machine::default()
        });
        let text = s.to_toml_string().unwrap();
        assert!(text.contains("Meyerhof"));
        assert_eq!(ReportSettings::from_toml_str(&text).unwrap(), s);
    }

    #[test]
    fn test_machine_apparatus_by_section() {
        let machine = Machine {
            name: "Rig".into(),
            rod_weight_small_kg: 3.0,
            tube_weight_small_kg: 4.0,
            rod_weight_large_kg: 6.0,
            tube_weight_large_kg: 7.0,
            rods_before_ground: 2,
            ..Machine::default()
        };
        let small = machine.apparatus(RodSection::Small, 10.0, 1.0, 5.0);
        assert_eq!(small.rod_weight_kg, 3.0);
        assert_eq!(small.tube_weight_kg, 4.0);
        assert!((small.tip_area_m2 - 0.001).abs() < 1e-15);

        let large = machine.apparatus(RodSection::Large, 10.0, 1.0, 5.0);
        assert_eq!(large.rod_weight_kg, 6.0);
        assert_eq!(large.rods_before_ground, 2);
        assert_eq!(large.large_manometer_delta_kg, 5.0);
    }
}
