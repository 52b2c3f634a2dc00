//! # Batch Reporting
//!
//! Reports every sounding of a job. Soundings are independent, so with the
//! `parallel` feature they are processed on the rayon pool; each one yields
//! its own result and the caller decides whether a failure skips the
//! sounding or aborts the batch.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use uuid::Uuid;

use crate::errors::{CptError, CptResult};
use crate::job::Job;
use crate::report::{build_report, SoundingReport};

/// Outcome of one sounding within a batch.
#[derive(Debug)]
pub struct BatchItem {
    pub id: Uuid,
    pub name: String,
    pub result: CptResult<SoundingReport>,
}

/// Report all soundings of a job, ordered by sounding name.
pub fn report_job(job: &Job) -> Vec<BatchItem> {
    let soundings = job.soundings_by_name();
    let settings = &job.settings;

    #[cfg(feature = "parallel")]
    let items: Vec<BatchItem> = soundings
        .into_par_iter()
        .map(|(id, sounding)| BatchItem {
            id: *id,
            name: sounding.name.clone(),
            result: build_report(sounding, settings),
        })
        .collect();

    #[cfg(not(feature = "parallel"))]
    let items: Vec<BatchItem> = soundings
        .into_iter()
        .map(|(id, sounding)| BatchItem {
            id: *id,
            name: sounding.name.clone(),
            result: build_report(sounding, settings),
        })
        .collect();

    items
}

/// Split batch items into successful reports and failures.
pub fn partition(items: Vec<BatchItem>) -> (Vec<SoundingReport>, Vec<(String, CptError)>) {
    let mut reports = Vec::new();
    let mut failures = Vec::new();
    for item in items {
        match item.result {
            Ok(report) => reports.push(report),
            Err(e) => failures.push((item.name, e)),
        }
    }
    (reports, failures)
}
