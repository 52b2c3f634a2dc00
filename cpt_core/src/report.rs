//! # Sounding Report
//!
//! Runs the full per-sounding pipeline and produces the rows of the results
//! table:
//!
//! 1. optional Hampel cleaning of the raw qc / Qst columns
//! 2. sort by depth
//! 3. raw unit detection (unless declared on the sounding)
//! 4. conversion to internal units (missing readings count as 0)
//! 5. mechanical correction
//! 6. conversion to kgf/cm² / kgf for the formulas, and to the configured
//!    display pair for presentation
//! 7. resampling to the report pitch
//! 8. q'0, then per report depth: nearest corrected values, φ' and φu,
//!    padm₁ and padm₂, Nq and Nγ
//!
//! Without a configured machine only depth, elevation and q'0 are filled.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::bearing::{
    bearing_factor_n_gamma, bearing_factor_nq, compute_admissible_pressures, BearingInput,
    BearingMethod,
};
use crate::correction::{correct_readings, ApparatusParameters, CorrectedReading};
use crate::errors::{CptError, CptResult};
use crate::filter::hampel_filter;
use crate::friction_angle::friction_angles;
use crate::series::{nearest_index, resample_depths, DepthSeries, DepthTable};
use crate::settings::{ReportSettings, RodSection};
use crate::stress::{effective_vertical_stress, WaterLevelObservations};
use crate::units::{
    detect_qc_unit, detect_qst_unit, qc_to_internal, qst_to_internal, DaN, DaNPerM2, DisplayUnits,
    Kgf, KgfPerCm2, QcUnit, QstUnit,
};

/// Depth column of a sounding table
pub const DEPTH_COLUMN: usize = 0;
/// Raw cone resistance column
pub const QC_COLUMN: usize = 1;
/// Raw friction column
pub const QST_COLUMN: usize = 2;

/// One CPT sounding as recorded on site.
///
/// ## JSON Example
///
/// ```json
/// {
///   "name": "CPT 1",
///   "readings": {
///     "column_names": ["depth", "qc", "qst"],
///     "columns": [[0.2, 0.4], [2.5, 3.1], [0.4, 0.6]]
///   },
///   "qc_unit": "MPa",
///   "machine": "Gouda 20t",
///   "section": "Large",
///   "small_manometer_delta_kg": 2.0,
///   "large_manometer_delta_kg": 10.0,
///   "start_elevation_m": 101.35,
///   "water_levels": { "end_of_test": "1,20" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sounding {
    pub name: String,
    /// Raw readings: depth (m), qc, Qst
    pub readings: DepthTable,
    /// Declared raw qc unit; detected when absent
    #[serde(default)]
    pub qc_unit: Option<QcUnit>,
    /// Declared raw Qst unit; detected when absent
    #[serde(default)]
    pub qst_unit: Option<QstUnit>,
    /// Rig name, looked up in the settings
    #[serde(default)]
    pub machine: Option<String>,
    #[serde(default)]
    pub section: RodSection,
    #[serde(default)]
    pub small_manometer_delta_kg: f64,
    #[serde(default)]
    pub large_manometer_delta_kg: f64,
    /// Ground elevation at the sounding (m)
    #[serde(default)]
    pub start_elevation_m: f64,
    /// Last report depth; the deepest reading when absent
    #[serde(default)]
    pub rounded_depth_m: Option<f64>,
    #[serde(default)]
    pub water_levels: WaterLevelObservations,
}

impl Sounding {
    /// Sounding with readings only (no machine, no observations).
    pub fn new(name: impl Into<String>, readings: DepthTable) -> Self {
        Sounding {
            name: name.into(),
            readings,
            qc_unit: None,
            qst_unit: None,
            machine: None,
            section: RodSection::default(),
            small_manometer_delta_kg: 0.0,
            large_manometer_delta_kg: 0.0,
            start_elevation_m: 0.0,
            rounded_depth_m: None,
            water_levels: WaterLevelObservations::default(),
        }
    }

    /// Apparatus parameters from the configured machine, if any.
    pub fn apparatus(&self, settings: &ReportSettings) -> Option<ApparatusParameters> {
        let name = self.machine.as_deref().map(str::trim).filter(|n| !n.is_empty())?;
        match settings.machine(name) {
            Some(machine) => Some(machine.apparatus(
                self.section,
                settings.units.tip_area_cm2,
                self.small_manometer_delta_kg,
                self.large_manometer_delta_kg,
            )),
            None => {
                warn!("Machine '{}' not found in settings for sounding '{}'", name, self.name);
                None
            }
        }
    }
}

/// One line of the results table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub depth_m: f64,
    /// Start elevation minus depth (m)
    pub elevation_m: f64,
    /// Corrected cone resistance (kgf/cm²)
    pub qc_kgf_cm2: Option<f64>,
    /// Corrected cone resistance in the report's display unit
    pub qc_display: Option<f64>,
    /// Effective vertical stress (kgf/cm²)
    pub q0_kgf_cm2: f64,
    /// Corrected friction force (kgf)
    pub qst_kgf: Option<f64>,
    /// Corrected friction force in the report's display unit
    pub qst_display: Option<f64>,
    pub phi_prime_deg: Option<f64>,
    pub phi_u_deg: Option<f64>,
    /// Admissible pressure under footing 1 (kgf/cm²)
    pub padm_1: Option<f64>,
    /// Admissible pressure under footing 2 (kgf/cm²)
    pub padm_2: Option<f64>,
    pub nq: Option<f64>,
    pub n_gamma: Option<f64>,
}

/// Report of one sounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundingReport {
    pub name: String,
    pub method: BearingMethod,
    /// Unit pair of `qc_display` / `qst_display`
    pub display: DisplayUnits,
    /// Raw units used for conversion (absent without a machine)
    pub qc_unit: Option<QcUnit>,
    pub qst_unit: Option<QstUnit>,
    pub water_table: Option<f64>,
    /// Readings replaced by the Hampel filter
    pub outliers_replaced: usize,
    /// qc after cleaning and sorting, in raw units
    pub cleaned_qc: DepthSeries,
    /// Qst after cleaning and sorting, in raw units
    pub cleaned_qst: DepthSeries,
    /// Corrected readings at the recorded depths (internal units)
    pub corrected: Vec<CorrectedReading>,
    pub rows: Vec<ReportRow>,
}

/// Column titles and unit captions of the results table.
pub fn report_headers(settings: &ReportSettings) -> Vec<(String, String)> {
    let b1 = (settings.bearing.footing_width_1_m * 100.0).round() as i64;
    let b2 = (settings.bearing.footing_width_2_m * 100.0).round() as i64;
    let display = settings.units.display;
    let kg_cm2 = "[kg/cm\u{b2}]";
    [
        ("Prof.", "[m]".to_string()),
        ("Cote", "[m]".to_string()),
        ("qc", display.qc_label().to_string()),
        ("q'0", kg_cm2.to_string()),
        ("Qst", display.qst_label().to_string()),
        ("\u{3c6}'", "[\u{b0}]".to_string()),
        ("\u{3c6}u", "[\u{b0}]".to_string()),
        ("Padm, 1", format!("{} B={}cm", kg_cm2, b1)),
        ("Padm, 2", format!("{} B={}cm", kg_cm2, b2)),
        ("Nq", "[/]".to_string()),
        ("N\u{3b3}", "[/]".to_string()),
    ]
    .into_iter()
    .map(|(title, unit)| (title.to_string(), unit))
    .collect()
}

/// Safety coefficient as printed in captions: "2" or "1,5".
pub fn format_safety_coefficient(alpha: f64) -> String {
    if alpha.fract() == 0.0 {
        format!("{}", alpha as i64)
    } else {
        format!("{:.1}", alpha).replace('.', ",")
    }
}

struct CorrectedSeries {
    depths: Vec<f64>,
    qc_kgf_cm2: Vec<f64>,
    qst_kgf: Vec<f64>,
    qc_display: Vec<f64>,
    qst_display: Vec<f64>,
    readings: Vec<CorrectedReading>,
    qc_unit: QcUnit,
    qst_unit: QstUnit,
}

fn present(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

fn corrected_series(
    table: &DepthTable,
    sounding: &Sounding,
    params: &ApparatusParameters,
    settings: &ReportSettings,
) -> CptResult<CorrectedSeries> {
    let depths = present(table.column(DEPTH_COLUMN)?);
    let qc_col = table.column(QC_COLUMN)?;
    let qst_col = table.column(QST_COLUMN)?;

    let thresholds = &settings.units.detection;
    let qc_unit = sounding
        .qc_unit
        .unwrap_or_else(|| detect_qc_unit(&present(qc_col), thresholds));
    let qst_unit = sounding
        .qst_unit
        .unwrap_or_else(|| detect_qst_unit(&present(qst_col), thresholds));

    let qc_raw: Vec<f64> = qc_col.iter().map(|v| v.unwrap_or(0.0)).collect();
    let qst_raw: Vec<f64> = qst_col.iter().map(|v| v.unwrap_or(0.0)).collect();

    let qc_internal = qc_to_internal(&qc_raw, qc_unit, settings.units.tip_area_cm2)?;
    let qst_internal = qst_to_internal(&qst_raw, qst_unit);
    let readings = correct_readings(&depths, &qc_internal, &qst_internal, params)?;

    // The bearing formulas always take kgf/cm² and kgf
    let display = settings.units.display;
    Ok(CorrectedSeries {
        qc_kgf_cm2: readings
            .iter()
            .map(|r| KgfPerCm2::from(DaNPerM2(r.qc_corrected)).0)
            .collect(),
        qst_kgf: readings.iter().map(|r| Kgf::from(DaN(r.qst_corrected)).0).collect(),
        qc_display: readings
            .iter()
            .map(|r| display.qc_from_internal(DaNPerM2(r.qc_corrected)))
            .collect(),
        qst_display: readings
            .iter()
            .map(|r| display.qst_from_internal(DaN(r.qst_corrected)))
            .collect(),
        depths,
        readings,
        qc_unit,
        qst_unit,
    })
}

/// Build the report of one sounding.
///
/// # Errors
///
/// - `ColumnOutOfRange` when the readings have fewer than three columns
/// - `EmptyInput` when no reading has a depth
/// - `InvalidInput` for invalid settings or apparatus parameters
pub fn build_report(sounding: &Sounding, settings: &ReportSettings) -> CptResult<SoundingReport> {
    settings.validate()?;
    sounding.readings.validate()?;
    sounding.readings.column(QST_COLUMN)?;

    let mut outliers_replaced = 0;
    let cleaned;
    let source = if settings.filter.enabled {
        let outcome = hampel_filter(&sounding.readings, &[QC_COLUMN, QST_COLUMN], &settings.filter.hampel())?;
        outliers_replaced = outcome.total_outliers;
        info!(
            "{}: Hampel filter replaced {} readings in {} passes",
            sounding.name, outcome.total_outliers, outcome.passes
        );
        cleaned = outcome.table;
        &cleaned
    } else {
        &sounding.readings
    };

    let table = source.sorted_by_depth(DEPTH_COLUMN)?;
    if table.row_count() == 0 {
        return Err(CptError::empty_input(format!("sounding '{}' has no depth readings", sounding.name)));
    }
    let depths = present(table.column(DEPTH_COLUMN)?);
    let cleaned_qc = table.series(DEPTH_COLUMN, QC_COLUMN)?;
    let cleaned_qst = table.series(DEPTH_COLUMN, QST_COLUMN)?;

    let corrected = match sounding.apparatus(settings) {
        Some(params) => Some(corrected_series(&table, sounding, &params, settings)?),
        None => {
            info!("{}: no machine configured, qc/Qst columns left empty", sounding.name);
            None
        }
    };

    let final_depth = sounding
        .rounded_depth_m
        .or_else(|| depths.last().copied())
        .unwrap_or(0.0);
    let report_depths = resample_depths(&depths, settings.layout.resample_step_m(), final_depth)?;

    let water_table = sounding.water_levels.resolve_water_table();
    let soil = settings.soil_profile(water_table)?;
    let method = settings.bearing.method;

    let mut rows = Vec::with_capacity(report_depths.len());
    for &depth_m in &report_depths {
        let q0 = effective_vertical_stress(depth_m, &soil);
        let mut row = ReportRow {
            depth_m,
            elevation_m: sounding.start_elevation_m - depth_m,
            qc_kgf_cm2: None,
            qc_display: None,
            q0_kgf_cm2: q0,
            qst_kgf: None,
            qst_display: None,
            phi_prime_deg: None,
            phi_u_deg: None,
            padm_1: None,
            padm_2: None,
            nq: None,
            n_gamma: None,
        };

        let nearest = corrected
            .as_ref()
            .and_then(|c| nearest_index(&c.depths, depth_m).map(|i| (c, i)));
        if let Some((series, idx)) = nearest {
            let qc = series.qc_kgf_cm2[idx];
            row.qc_kgf_cm2 = Some(qc);
            row.qst_kgf = Some(series.qst_kgf[idx]);
            row.qc_display = Some(series.qc_display[idx]);
            row.qst_display = Some(series.qst_display[idx]);

            if let Some(angles) = friction_angles(qc, q0) {
                row.phi_prime_deg = Some(angles.phi_prime_deg);
                row.phi_u_deg = Some(angles.phi_u_deg);

                if q0 > 0.0 {
                    let pressures = compute_admissible_pressures(&BearingInput {
                        method,
                        depth_m,
                        q0_kgf_cm2: q0,
                        phi_prime_deg: angles.phi_prime_deg,
                        phi_u_deg: angles.phi_u_deg,
                        footing_width_1_m: settings.bearing.footing_width_1_m,
                        footing_width_2_m: settings.bearing.footing_width_2_m,
                        safety_coefficient: settings.bearing.safety_coefficient,
                        dry_density: soil.dry_density,
                        saturated_density: soil.saturated_density,
                        water_table,
                        qc_kgf_cm2: qc,
                    })?;
                    row.padm_1 = Some(pressures.padm_1);
                    row.padm_2 = Some(pressures.padm_2);
                }

                row.nq = Some(bearing_factor_nq(method, angles.phi_u_deg, angles.phi_prime_deg));
                row.n_gamma = Some(bearing_factor_n_gamma(method, angles.phi_u_deg));
            }
        }
        rows.push(row);
    }

    info!("{}: {} report rows ({})", sounding.name, rows.len(), method);

    Ok(SoundingReport {
        name: sounding.name.clone(),
        method,
        display: settings.units.display,
        qc_unit: corrected.as_ref().map(|c| c.qc_unit),
        qst_unit: corrected.as_ref().map(|c| c.qst_unit),
        water_table,
        outliers_replaced,
        cleaned_qc,
        cleaned_qst,
        corrected: corrected.map(|c| c.readings).unwrap_or_default(),
        rows,
    })
}
