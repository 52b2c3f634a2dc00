//! # CPT Report CLI
//!
//! Command-line front end of `cpt_core`: reports the soundings of a job
//! file, prints default settings and runs a self-contained demo.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info, warn};

use cpt_core::batch::{partition, report_job};
use cpt_core::bearing::BearingMethod;
use cpt_core::file_io::{load_job, save_job, JOB_EXTENSION};
use cpt_core::report::{format_safety_coefficient, report_headers, Sounding, SoundingReport};
use cpt_core::settings::{Machine, ReportSettings};
use cpt_core::{CptError, DepthTable, Job};

#[derive(Parser)]
#[command(name = "cpt")]
#[command(author, version, about = "CPT processing and bearing capacity reports")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report every sounding of a job file
    Report {
        /// Job file (.cptjob)
        job: PathBuf,

        /// TOML settings overriding the settings stored in the job
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Bearing method label ("De Beer (adapté)", "Brinch Hansen", "Caquot Kérisel", "Meyerhof")
        #[arg(short, long)]
        method: Option<String>,

        /// Print the reports as JSON instead of tables
        #[arg(long)]
        json: bool,

        /// Fail when any sounding cannot be reported (invalid soundings
        /// are otherwise skipped)
        #[arg(long)]
        strict: bool,
    },

    /// Create an empty job file
    Init {
        /// Output path; the .cptjob extension is added when missing
        path: PathBuf,

        #[arg(long, default_value = "")]
        job_number: String,

        #[arg(long, default_value = "")]
        client: String,

        #[arg(long, default_value = "")]
        site: String,
    },

    /// Print the default settings as TOML
    Settings,

    /// Report a synthetic sounding
    Demo {
        /// Bearing method label
        #[arg(short, long, default_value = "De Beer (adapté)")]
        method: String,
    },
}

fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

fn parse_method(label: &str) -> Result<BearingMethod> {
    BearingMethod::from_label_strict(label).with_context(|| format!("Invalid bearing method '{}'", label))
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

fn print_report(report: &SoundingReport, settings: &ReportSettings) {
    println!();
    println!(
        "{} - {} (\u{3b1} = {})",
        report.name,
        report.method,
        format_safety_coefficient(settings.bearing.safety_coefficient)
    );
    match (report.qc_unit, report.qst_unit) {
        (Some(qc), Some(qst)) => println!("Raw units: qc {}, Qst {}", qc, qst),
        _ => println!("No machine configured: qc and Qst not corrected"),
    }
    if let Some(wt) = report.water_table {
        println!("Water table: {:.2} m", wt);
    }
    if report.outliers_replaced > 0 {
        println!("Readings replaced by the filter: {}", report.outliers_replaced);
    }

    let headers = report_headers(settings);
    let widths: Vec<usize> = headers
        .iter()
        .map(|(title, unit)| title.chars().count().max(unit.chars().count()).max(8))
        .collect();
    let line = |cells: Vec<String>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:>w$}", c, w = *w))
            .collect::<Vec<_>>()
            .join(" ")
    };

    println!("{}", line(headers.iter().map(|(t, _)| t.clone()).collect()));
    println!("{}", line(headers.iter().map(|(_, u)| u.clone()).collect()));
    for row in &report.rows {
        println!(
            "{}",
            line(vec![
                format!("{:.2}", row.depth_m),
                format!("{:.2}", row.elevation_m),
                cell(row.qc_display),
                format!("{:.2}", row.q0_kgf_cm2),
                cell(row.qst_display),
                cell(row.phi_prime_deg),
                cell(row.phi_u_deg),
                cell(row.padm_1),
                cell(row.padm_2),
                cell(row.nq),
                cell(row.n_gamma),
            ])
        );
    }
}

fn output_reports(reports: &[SoundingReport], settings: &ReportSettings, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(reports).context("Failed to serialize reports")?;
        println!("{}", text);
    } else {
        for report in reports {
            print_report(report, settings);
        }
    }
    Ok(())
}

/// Log failed soundings. Validation failures are skipped unless `strict`;
/// any other failure aborts the run.
fn check_failures(failures: &[(String, CptError)], strict: bool) -> Result<()> {
    let mut fatal = 0;
    for (name, err) in failures {
        if err.is_validation() && !strict {
            warn!("Sounding '{}' skipped [{}]: {}", name, err.error_code(), err);
        } else {
            error!("Sounding '{}' failed [{}]: {}", name, err.error_code(), err);
            fatal += 1;
        }
    }
    if fatal > 0 {
        bail!("{} of {} failed soundings cannot be skipped", fatal, failures.len());
    }
    Ok(())
}

fn run_report(
    path: &Path,
    settings_path: Option<&Path>,
    method: Option<&str>,
    json: bool,
    strict: bool,
) -> Result<()> {
    let mut job = load_job(path).with_context(|| format!("Failed to load job {}", path.display()))?;

    if let Some(settings_path) = settings_path {
        job.settings = ReportSettings::load(settings_path)
            .with_context(|| format!("Failed to load settings {}", settings_path.display()))?;
    }
    if let Some(label) = method {
        job.settings.bearing.method = parse_method(label)?;
    }

    info!(
        "Job '{}' ({}): {} soundings",
        job.meta.job_number,
        job.meta.site,
        job.sounding_count()
    );

    let (reports, failures) = partition(report_job(&job));
    check_failures(&failures, strict)?;

    output_reports(&reports, &job.settings, json)
}

fn run_init(path: &Path, job_number: String, client: String, site: String) -> Result<()> {
    let path = if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(JOB_EXTENSION)
    };
    if path.exists() {
        bail!("{} already exists", path.display());
    }

    let job = Job::new(job_number, client, site);
    save_job(&job, &path).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(())
}

fn run_settings() -> Result<()> {
    let text = ReportSettings::default()
        .to_toml_string()
        .context("Failed to serialize default settings")?;
    print!("{}", text);
    Ok(())
}

fn demo_job(method: BearingMethod) -> Result<Job> {
    let mut job = Job::new("DEMO", "Demo client", "Demo site");
    job.settings.bearing.method = method;
    job.settings.machines.push(Machine {
        name: "Demo rig".to_string(),
        rod_weight_small_kg: 3.5,
        tube_weight_small_kg: 4.0,
        rod_weight_large_kg: 5.0,
        tube_weight_large_kg: 6.5,
        rods_before_ground: 1,
        ..Machine::default()
    });

    // Loose fill over a dense sand with a stiff layer near 3 m
    let depths: Vec<f64> = (1..=30).map(|i| i as f64 * 0.2).collect();
    let qc: Vec<f64> = depths
        .iter()
        .map(|d| {
            let stiff = if (2.8..3.4).contains(d) { 6.0 } else { 0.0 };
            if *d < 1.2 {
                1.5 + d
            } else {
                4.0 + 2.5 * d + stiff
            }
        })
        .collect();
    let qst: Vec<f64> = depths.iter().map(|d| 0.3 + 0.8 * d).collect();
    let table = DepthTable::from_values(&["depth", "qc", "qst"], vec![depths, qc, qst])
        .context("Failed to build demo readings")?;

    let mut sounding = Sounding::new("CPT demo", table);
    sounding.machine = Some("Demo rig".to_string());
    sounding.start_elevation_m = 100.0;
    sounding.water_levels.end_of_test = "2,40".to_string();
    job.add_sounding(sounding);
    Ok(job)
}

fn run_demo(label: &str) -> Result<()> {
    let method = parse_method(label)?;
    let job = demo_job(method)?;
    let (reports, failures) = partition(report_job(&job));
    if let Some((name, err)) = failures.first() {
        bail!("Demo sounding '{}' failed: {}", name, err);
    }
    if reports.is_empty() {
        warn!("Demo produced no report");
    }
    output_reports(&reports, &job.settings, false)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Report {
            job,
            settings,
            method,
            json,
            strict,
        } => run_report(&job, settings.as_deref(), method.as_deref(), json, strict),
        Commands::Init {
            path,
            job_number,
            client,
            site,
        } => run_init(&path, job_number, client, site),
        Commands::Settings => run_settings(),
        Commands::Demo { method } => run_demo(&method),
    }
}
