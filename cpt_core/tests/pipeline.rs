//! End-to-end tests: job → reports, through files and settings.

use std::path::PathBuf;

use cpt_core::batch::{partition, report_job};
use cpt_core::bearing::{compute_admissible_pressures, BearingInput, BearingMethod};
use cpt_core::file_io::{load_job, save_job, JOB_EXTENSION};
use cpt_core::report::{build_report, Sounding};
use cpt_core::settings::{Machine, ReportSettings};
use cpt_core::stress::{effective_vertical_stress, SoilProfile};
use cpt_core::units::{QcUnit, QstUnit};
use cpt_core::{DepthTable, Job};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("cpt_core_it_{}_{}.{}", name, std::process::id(), JOB_EXTENSION))
}

fn rig() -> Machine {
    Machine {
        name: "Gouda 20t".to_string(),
        rod_weight_small_kg: 3.0,
        tube_weight_small_kg: 4.0,
        rod_weight_large_kg: 5.0,
        tube_weight_large_kg: 6.0,
        rods_before_ground: 1,
        ..Machine::default()
    }
}

fn sounding(name: &str) -> Sounding {
    let depths: Vec<f64> = (1..=40).map(|i| i as f64 * 0.1).collect();
    let qc: Vec<f64> = depths.iter().map(|d| 1.0 + 2.0 * d).collect();
    let qst: Vec<f64> = depths.iter().map(|d| 0.2 + 0.5 * d).collect();
    let mut s = Sounding::new(
        name,
        DepthTable::from_values(&["depth", "qc", "qst"], vec![depths, qc, qst]).unwrap(),
    );
    s.machine = Some("Gouda 20t".to_string());
    s.start_elevation_m = 52.4;
    s.water_levels.end_of_test = "1,80".to_string();
    s
}

fn job() -> Job {
    let mut job = Job::new("24-117", "City", "Quai 3");
    job.settings.machines.push(rig());
    job.add_sounding(sounding("CPT 2"));
    job.add_sounding(sounding("CPT 1"));
    job
}

#[test]
fn test_job_reports_every_sounding() {
    let (reports, failures) = partition(report_job(&job()));
    assert!(failures.is_empty());
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].name, "CPT 1");

    let report = &reports[0];
    assert_eq!(report.qc_unit, Some(QcUnit::MPa));
    assert_eq!(report.qst_unit, Some(QstUnit::KN));
    assert_eq!(report.water_table, Some(1.8));
    assert_eq!(report.method, BearingMethod::DeBeer);
    // 0.0 .. 4.0 every 20 cm
    assert_eq!(report.rows.len(), 21);
    assert_eq!(report.rows.last().unwrap().depth_m, 4.0);

    for pair in report.rows.windows(2) {
        assert!(pair[1].depth_m > pair[0].depth_m);
        assert!(pair[1].q0_kgf_cm2 > pair[0].q0_kgf_cm2);
    }
}

#[test]
fn test_rows_match_direct_computation() {
    let job = job();
    let sounding = job.soundings_by_name()[0].1.clone();
    let report = build_report(&sounding, &job.settings).unwrap();
    let row = report.rows.iter().find(|r| (r.depth_m - 3.0).abs() < 1e-9).unwrap();

    let soil = SoilProfile::new(1800.0, 2000.0, Some(1.8)).unwrap();
    let q0 = effective_vertical_stress(3.0, &soil);
    assert!((row.q0_kgf_cm2 - q0).abs() < 1e-12);
    assert!((row.elevation_m - 49.4).abs() < 1e-9);

    let expected = compute_admissible_pressures(&BearingInput {
        method: BearingMethod::DeBeer,
        depth_m: 3.0,
        q0_kgf_cm2: q0,
        phi_prime_deg: row.phi_prime_deg.unwrap(),
        phi_u_deg: row.phi_u_deg.unwrap(),
        footing_width_1_m: 0.6,
        footing_width_2_m: 1.5,
        safety_coefficient: 2.0,
        dry_density: 1800.0,
        saturated_density: 2000.0,
        water_table: Some(1.8),
        qc_kgf_cm2: row.qc_kgf_cm2.unwrap(),
    })
    .unwrap();
    assert_eq!(row.padm_1, Some(expected.padm_1));
    assert_eq!(row.padm_2, Some(expected.padm_2));
}

#[test]
fn test_methods_give_distinct_pressures() {
    let base = job();
    let sounding = base.soundings_by_name()[0].1.clone();
    let mut padm = Vec::new();
    for method in BearingMethod::ALL {
        let mut settings = base.settings.clone();
        settings.bearing.method = method;
        let report = build_report(&sounding, &settings).unwrap();
        assert_eq!(report.method, method);
        padm.push(report.rows.last().unwrap().padm_1.unwrap());
    }
    assert!(padm.iter().all(|p| *p > 0.0));
    for i in 0..padm.len() {
        for j in i + 1..padm.len() {
            assert_ne!(padm[i], padm[j]);
        }
    }
}

#[test]
fn test_saved_job_reports_identically() {
    let path = temp_path("roundtrip");
    let original = job();
    save_job(&original, &path).unwrap();
    let loaded = load_job(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    let (before, _) = partition(report_job(&original));
    let (after, _) = partition(report_job(&loaded));
    assert_eq!(before, after);
}

#[test]
fn test_settings_from_toml_drive_the_report() {
    let toml = r#"
        [[machines]]
        name = "Gouda 20t"
        rod_weight_large_kg = 5.0
        tube_weight_large_kg = 6.0
        rods_before_ground = 1

        [bearing]
        method = "Meyerhof"
        safety_coefficient = 3.0

        [layout]
        resample_step_cm = 50.0
    "#;
    let settings = ReportSettings::from_toml_str(toml).unwrap();
    let report = build_report(&sounding("CPT 1"), &settings).unwrap();
    assert_eq!(report.method, BearingMethod::Meyerhof);
    assert_eq!(report.rows.len(), 9);

    let mut two = settings.clone();
    two.bearing.safety_coefficient = 2.0;
    let relaxed = build_report(&sounding("CPT 1"), &two).unwrap();
    let strict_p = report.rows.last().unwrap().padm_1.unwrap();
    let relaxed_p = relaxed.rows.last().unwrap().padm_1.unwrap();
    assert!(relaxed_p > strict_p);
}

#[test]
fn test_report_serializes_to_json() {
    let (reports, _) = partition(report_job(&job()));
    let json = serde_json::to_string(&reports[0]).unwrap();
    assert!(json.contains("\"method\":\"De Beer (adapté)\""));
    let back: cpt_core::SoundingReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, reports[0]);
}
