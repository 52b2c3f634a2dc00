//! # File I/O
//!
//! Job file operations:
//! - **Atomic saves**: write to `.tmp`, fsync, rename
//! - **Version validation**: refuse files from an incompatible schema
//!
//! Jobs are stored as pretty-printed JSON (`.cptjob`).
//!
//! ## Example
//!
//! ```rust,no_run
//! use cpt_core::file_io::{load_job, save_job};
//! use cpt_core::job::Job;
//! use std::path::Path;
//!
//! let job = Job::new("24-117", "Client", "Site");
//! save_job(&job, Path::new("site.cptjob"))?;
//! let loaded = load_job(Path::new("site.cptjob"))?;
//! # Ok::<(), cpt_core::errors::CptError>(())
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::errors::{CptError, CptResult};
use crate::job::{Job, SCHEMA_VERSION};

/// Extension of job files
pub const JOB_EXTENSION: &str = "cptjob";

fn tmp_path_for(path: &Path) -> PathBuf {
    let extension = path
        .extension()
        .map(|e| format!("{}.tmp", e.to_string_lossy()))
        .unwrap_or_else(|| "tmp".to_string());
    path.with_extension(extension)
}

/// Save a job with atomic write semantics.
///
/// The JSON goes to a sibling `.tmp` file which is synced and then renamed
/// over the target, so an interrupted save never leaves a truncated job.
pub fn save_job(job: &Job, path: &Path) -> CptResult<()> {
    let json = serde_json::to_string_pretty(job).map_err(|e| CptError::serialization(e.to_string()))?;

    let tmp_path = tmp_path_for(path);
    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CptError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        CptError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CptError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;
    drop(tmp_file);

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CptError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

/// Load a job and check its schema version.
///
/// # Errors
///
/// - `FileError` on I/O failure
/// - `SerializationError` for invalid JSON
/// - `VersionMismatch` for an incompatible schema version
pub fn load_job(path: &Path) -> CptResult<Job> {
    let mut file = File::open(path)
        .map_err(|e| CptError::file_error("open", path.display().to_string(), e.to_string()))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| CptError::file_error("read", path.display().to_string(), e.to_string()))?;

    let job: Job = serde_json::from_str(&contents)
        .map_err(|e| CptError::serialization(format!("Invalid JSON in {}: {}", path.display(), e)))?;

    validate_version(&job.meta.version)?;
    Ok(job)
}

/// Check a file schema version against [`SCHEMA_VERSION`].
///
/// Major versions must match; while in 0.x a file with a newer minor version
/// is rejected.
pub fn validate_version(file_version: &str) -> CptResult<()> {
    let mismatch = || CptError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let parse = |v: &str| -> Option<Vec<u32>> { v.split('.').map(|p| p.trim().parse().ok()).collect() };
    let file_parts = parse(file_version).ok_or_else(mismatch)?;
    let current_parts = parse(SCHEMA_VERSION).ok_or_else(mismatch)?;

    match (file_parts.as_slice(), current_parts.as_slice()) {
        ([file_major, rest @ ..], [current_major, current_rest @ ..]) => {
            if file_major != current_major {
                return Err(mismatch());
            }
            if *current_major == 0 {
                if let (Some(file_minor), Some(current_minor)) = (rest.first(), current_rest.first()) {
                    if file_minor > current_minor {
                        return Err(mismatch());
                    }
                }
            }
            Ok(())
        }
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Sounding;
    use crate::series::DepthTable;
    use std::env::temp_dir;

    fn temp_job_path(name: &str) -> PathBuf {
        temp_dir().join(format!("cpt_core_test_{}_{}.{}", name, std::process::id(), JOB_EXTENSION))
    }

    #[test]
    fn test_tmp_path() {
        assert_eq!(tmp_path_for(Path::new("/a/site.cptjob")), Path::new("/a/site.cptjob.tmp"));
        assert_eq!(tmp_path_for(Path::new("/a/site")), Path::new("/a/site.tmp"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_job_path("roundtrip");
        let mut job = Job::new("24-117", "Client", "Site");
        let table = DepthTable::from_values(&["depth", "qc", "qst"], vec![vec![0.2], vec![1.0], vec![0.1]])
            .unwrap();
        let id = job.add_sounding(Sounding::new("CPT 1", table));

        save_job(&job, &path).unwrap();
        assert!(!tmp_path_for(&path).exists());

        let loaded = load_job(&path).unwrap();
        assert_eq!(loaded.meta.job_number, "24-117");
        assert_eq!(loaded.get_sounding(&id), job.get_sounding(&id));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_errors() {
        let missing = temp_job_path("missing");
        assert_eq!(load_job(&missing).unwrap_err().error_code(), "FILE_ERROR");

        let garbage = temp_job_path("garbage");
        fs::write(&garbage, "{ not json").unwrap();
        assert_eq!(load_job(&garbage).unwrap_err().error_code(), "SERIALIZATION_ERROR");
        let _ = fs::remove_file(&garbage);
    }

    #[test]
    fn test_newer_schema_rejected_on_load() {
        let path = temp_job_path("newer");
        let mut job = Job::default();
        job.meta.version = "0.9.0".to_string();
        save_job(&job, &path).unwrap();
        assert_eq!(load_job(&path).unwrap_err().error_code(), "VERSION_MISMATCH");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("0.0.3").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("").is_err());
        assert!(validate_version("v0.1").is_err());
    }
}
