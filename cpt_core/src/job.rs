//! # Job Data Structures
//!
//! A `Job` (dossier) groups the soundings of one site investigation with the
//! settings used to report them. Jobs serialize to human-readable JSON.
//!
//! ```text
//! Job
//! ├── meta: JobMetadata (schema version, job number, client, site, timestamps)
//! ├── settings: ReportSettings
//! └── soundings: HashMap<Uuid, Sounding>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use cpt_core::job::Job;
//! use cpt_core::report::Sounding;
//! use cpt_core::series::DepthTable;
//!
//! let mut job = Job::new("24-117", "City of Namur", "Rue des Tanneries");
//! let table = DepthTable::from_values(
//!     &["depth", "qc", "qst"],
//!     vec![vec![0.2, 0.4], vec![1.5, 2.0], vec![0.2, 0.3]],
//! ).unwrap();
//! let id = job.add_sounding(Sounding::new("CPT 1", table));
//! assert!(job.soundings.contains_key(&id));
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::report::Sounding;
use crate::settings::ReportSettings;

/// Current schema version of job files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root container of a site investigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub meta: JobMetadata,

    /// Settings snapshot used for every sounding of the job
    #[serde(default)]
    pub settings: ReportSettings,

    /// Soundings keyed by UUID
    #[serde(default)]
    pub soundings: HashMap<Uuid, Sounding>,
}

impl Job {
    /// Create an empty job with default settings.
    pub fn new(job_number: impl Into<String>, client: impl Into<String>, site: impl Into<String>) -> Self {
        let now = Utc::now();
        Job {
            meta: JobMetadata {
                version: SCHEMA_VERSION.to_string(),
                job_number: job_number.into(),
                client: client.into(),
                site: site.into(),
                created: now,
                modified: now,
            },
            settings: ReportSettings::default(),
            soundings: HashMap::new(),
        }
    }

    /// Add a sounding; returns its new UUID.
    pub fn add_sounding(&mut self, sounding: Sounding) -> Uuid {
        let id = Uuid::new_v4();
        self.soundings.insert(id, sounding);
        self.touch();
        id
    }

    pub fn remove_sounding(&mut self, id: &Uuid) -> Option<Sounding> {
        let sounding = self.soundings.remove(id);
        if sounding.is_some() {
            self.touch();
        }
        sounding
    }

    pub fn get_sounding(&self, id: &Uuid) -> Option<&Sounding> {
        self.soundings.get(id)
    }

    /// Soundings sorted by name, for stable report ordering
    pub fn soundings_by_name(&self) -> Vec<(&Uuid, &Sounding)> {
        let mut list: Vec<_> = self.soundings.iter().collect();
        list.sort_by(|a, b| a.1.name.cmp(&b.1.name).then(a.0.cmp(b.0)));
        list
    }

    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn sounding_count(&self) -> usize {
        self.soundings.len()
    }
}

impl Default for Job {
    fn default() -> Self {
        Job::new("", "", "")
    }
}

/// Job header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,
    /// Job (dossier) number
    pub job_number: String,
    pub client: String,
    /// Site address or designation
    pub site: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::DepthTable;

    fn sounding(name: &str) -> Sounding {
        let table = DepthTable::from_values(&["depth", "qc", "qst"], vec![vec![0.2], vec![1.0], vec![0.1]])
            .unwrap();
        Sounding::new(name, table)
    }

    #[test]
    fn test_new_job() {
        let job = Job::new("24-117", "Client", "Site");
        assert_eq!(job.meta.version, SCHEMA_VERSION);
        assert_eq!(job.meta.job_number, "24-117");
        assert_eq!(job.sounding_count(), 0);
        assert_eq!(job.meta.created, job.meta.modified);
    }

    #[test]
    fn test_add_and_remove() {
        let mut job = Job::default();
        let id = job.add_sounding(sounding("CPT 1"));
        assert_eq!(job.get_sounding(&id).unwrap().name, "CPT 1");
        assert!(job.meta.modified >= job.meta.created);

        assert!(job.remove_sounding(&id).is_some());
        assert!(job.remove_sounding(&id).is_none());
        assert_eq!(job.sounding_count(), 0);
    }

    #[test]
    fn test_soundings_by_name() {
        let mut job = Job::default();
        job.add_sounding(sounding("CPT 3"));
        job.add_sounding(sounding("CPT 1"));
        job.add_sounding(sounding("CPT 2"));
        let names: Vec<_> = job.soundings_by_name().iter().map(|(_, s)| s.name.clone()).collect();
        assert_eq!(names, vec!["CPT 1", "CPT 2", "CPT 3"]);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut job = Job::new("J", "C", "S");
        let id = job.add_sounding(sounding("CPT 1"));
        let json = serde_json::to_string_pretty(&job).unwrap();
        let loaded: Job = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.get_sounding(&id), job.get_sounding(&id));
        assert_eq!(loaded.settings, job.settings);
    }
}
