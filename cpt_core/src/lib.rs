//! # cpt_core - CPT Processing and Bearing Capacity Engine
//!
//! `cpt_core` turns raw Cone Penetration Test soundings into the results table
//! of a geotechnical report: cleaned readings, corrected qc and Qst, friction
//! angles and admissible foundation pressures. All inputs and outputs are
//! JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: pure functions over immutable inputs and settings
//! - **Historical parity**: coefficients, gravity conventions and fallback
//!   rules reproduce the legacy spreadsheet exactly
//! - **Rich Errors**: structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use cpt_core::bearing::{compute_admissible_pressures, BearingInput, BearingMethod};
//! use cpt_core::friction_angle::friction_angles;
//! use cpt_core::stress::{effective_vertical_stress, SoilProfile};
//!
//! let soil = SoilProfile::new(1800.0, 2000.0, None).unwrap();
//! let q0 = effective_vertical_stress(2.0, &soil);
//! let angles = friction_angles(80.0, q0).unwrap();
//!
//! let padm = compute_admissible_pressures(&BearingInput {
//!     method: BearingMethod::DeBeer,
//!     depth_m: 2.0,
//!     q0_kgf_cm2: q0,
//!     phi_prime_deg: angles.phi_prime_deg,
//!     phi_u_deg: angles.phi_u_deg,
//!     footing_width_1_m: 0.6,
//!     footing_width_2_m: 1.5,
//!     safety_coefficient: 2.0,
//!     dry_density: soil.dry_density,
//!     saturated_density: soil.saturated_density,
//!     water_table: soil.water_table,
//!     qc_kgf_cm2: 80.0,
//! }).unwrap();
//! assert!(padm.padm_1 > 0.0);
//! ```
//!
//! ## Modules
//!
//! - [`units`] - unit newtypes, raw unit conversion and detection
//! - [`series`] - depth-indexed tables and series, resampling
//! - [`filter`] - Hampel outlier filter
//! - [`correction`] - rod weight and manometer corrections
//! - [`stress`] - effective vertical stress, water table resolution
//! - [`friction_angle`] - friction angle by bisection
//! - [`bearing`] - bearing-capacity methods and admissible pressures
//! - [`settings`] - report settings (TOML)
//! - [`report`] - per-sounding pipeline
//! - [`job`] / [`file_io`] - job container and atomic JSON files
//! - [`batch`] - reporting every sounding of a job
//! - [`errors`] - structured error types

pub mod batch;
pub mod bearing;
pub mod correction;
pub mod errors;
pub mod file_io;
pub mod filter;
pub mod friction_angle;
pub mod job;
pub mod report;
pub mod series;
pub mod settings;
pub mod stress;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use bearing::{compute_admissible_pressures, BearingInput, BearingMethod, BearingPressureResult};
pub use correction::{correct_readings, ApparatusParameters, CorrectedReading};
pub use errors::{CptError, CptResult};
pub use file_io::{load_job, save_job};
pub use filter::{hampel_filter, FilterOutcome, HampelConfig};
pub use friction_angle::{friction_angles, FrictionAngles};
pub use job::{Job, JobMetadata};
pub use report::{build_report, ReportRow, Sounding, SoundingReport};
pub use series::{DepthSeries, DepthTable};
pub use settings::ReportSettings;
